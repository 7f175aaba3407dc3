// Portfolio service
// Create/update/delete/refresh flows against the backend, committing each
// accepted result into the in-memory store, plus the automation trigger.

use chrono::{DateTime, Utc};

use crate::automation::{AutomationPayload, WebhookClient};
use crate::error::PortfolioError;
use crate::repository::ServiceRepository;
use crate::store::ServiceStore;
use crate::types::{clamp_revenue, NewService, Role, Service, User};

fn ensure_editor(role: Role) -> Result<(), PortfolioError> {
    if role.can_edit() {
        Ok(())
    } else {
        Err(PortfolioError::ReadOnly)
    }
}

/// Replace the store contents with a full fetch. On failure the store is
/// left as it was.
pub async fn refresh(
    store: &mut ServiceStore,
    repo: &dyn ServiceRepository,
) -> Result<usize, PortfolioError> {
    let services = repo.get_services().await?;
    store.replace_all(services);
    log::info!("Loaded {} services", store.len());
    Ok(store.len())
}

/// Check required fields and fill defaults: trims every text field, sets
/// the creator to the current user's name when blank.
pub fn prepare_new_service(
    mut draft: NewService,
    current_user: Option<&User>,
) -> Result<NewService, PortfolioError> {
    for field in [
        &mut draft.service,
        &mut draft.need,
        &mut draft.target_audience,
        &mut draft.cluster,
        &mut draft.business_model,
    ] {
        *field = field.trim().to_string();
    }

    let missing: Vec<&str> = [
        ("service", &draft.service),
        ("need", &draft.need),
        ("targetAudience", &draft.target_audience),
        ("cluster", &draft.cluster),
        ("businessModel", &draft.business_model),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(PortfolioError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    draft.creator_name = draft
        .creator_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .or_else(|| current_user.map(|u| u.name.clone()));

    Ok(draft)
}

pub async fn add_service(
    store: &mut ServiceStore,
    repo: &dyn ServiceRepository,
    draft: NewService,
    current_user: Option<&User>,
) -> Result<Service, PortfolioError> {
    ensure_editor(current_user.map(|u| u.role).unwrap_or_default())?;
    let draft = prepare_new_service(draft, current_user)?;
    let created = repo.add_service(&draft).await?;
    store.insert(created.clone())?;
    log::info!("Added service {} ({})", created.id, created.service);
    Ok(created)
}

/// Single-record update outside the edit session, e.g. from a detail view.
/// The revenue estimate is clamped to `>= 0` before it is sent.
pub async fn update_service(
    store: &mut ServiceStore,
    repo: &dyn ServiceRepository,
    service: &Service,
    role: Role,
) -> Result<Service, PortfolioError> {
    ensure_editor(role)?;
    if store.get(service.id).is_none() {
        return Err(PortfolioError::NotFound(service.id));
    }
    let mut outgoing = service.clone();
    outgoing.revenue_estimate = clamp_revenue(outgoing.revenue_estimate);
    let saved = repo.update_service(&outgoing).await?;
    store.replace(saved.clone())?;
    Ok(saved)
}

pub async fn delete_service(
    store: &mut ServiceStore,
    repo: &dyn ServiceRepository,
    id: i64,
    role: Role,
) -> Result<Service, PortfolioError> {
    ensure_editor(role)?;
    if store.get(id).is_none() {
        return Err(PortfolioError::NotFound(id));
    }
    let deleted_id = repo.delete_service(id).await?;
    if deleted_id != id {
        log::warn!("Backend confirmed deletion of {} for request {}", deleted_id, id);
    }
    let removed = store.remove(id)?;
    log::info!("Deleted service {}", id);
    Ok(removed)
}

/// Post an idea to the automation webhook. Unconfigured automation is a
/// configuration error the caller can show in place of the action.
pub async fn trigger_automation(
    webhook: Option<&WebhookClient>,
    service: &Service,
    message: Option<&str>,
    requested_by: Option<&User>,
    now: DateTime<Utc>,
) -> Result<AutomationPayload, PortfolioError> {
    let webhook = webhook.ok_or_else(|| {
        PortfolioError::Configuration(
            "Automation webhook is not configured. Set automation.webhookUrl in ~/.ideaboard/config.json."
                .to_string(),
        )
    })?;
    let payload = AutomationPayload::new(
        service,
        message,
        requested_by.map(|u| u.name.as_str()),
        now,
    );
    webhook.send(&payload).await?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Scores, ServiceStatus};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend holding rows in memory and assigning sequential ids.
    #[derive(Default)]
    struct MemoryRepo {
        rows: Mutex<Vec<Service>>,
        fail_reads: bool,
    }

    #[async_trait]
    impl ServiceRepository for MemoryRepo {
        async fn get_services(&self) -> Result<Vec<Service>, PortfolioError> {
            if self.fail_reads {
                return Err(PortfolioError::Network("offline".into()));
            }
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn add_service(&self, draft: &NewService) -> Result<Service, PortfolioError> {
            let mut rows = self.rows.lock().unwrap();
            let service = Service {
                id: rows.len() as i64 + 1,
                service: draft.service.clone(),
                need: draft.need.clone(),
                target_audience: draft.target_audience.clone(),
                cluster: draft.cluster.clone(),
                business_model: draft.business_model.clone(),
                status: draft.status,
                creator_name: draft.creator_name.clone(),
                creation_date: Some(Utc::now()),
                scores: Scores::default(),
                revenue_estimate: 0.0,
            };
            rows.push(service.clone());
            Ok(service)
        }

        async fn update_service(&self, service: &Service) -> Result<Service, PortfolioError> {
            let mut rows = self.rows.lock().unwrap();
            let slot = rows
                .iter_mut()
                .find(|r| r.id == service.id)
                .ok_or(PortfolioError::Api("Serviço não encontrado".into()))?;
            *slot = service.clone();
            Ok(service.clone())
        }

        async fn delete_service(&self, id: i64) -> Result<i64, PortfolioError> {
            self.rows.lock().unwrap().retain(|r| r.id != id);
            Ok(id)
        }
    }

    fn draft() -> NewService {
        NewService {
            service: "  Energia solar por assinatura ".into(),
            need: "Reduzir conta de luz".into(),
            target_audience: "Residências".into(),
            cluster: "Energia & Sustentabilidade".into(),
            business_model: "Assinatura/Recorrência".into(),
            status: ServiceStatus::default(),
            creator_name: None,
        }
    }

    fn user(role: Role) -> User {
        User {
            id: None,
            name: "Carla".into(),
            email: "carla@empresa.com".into(),
            role,
        }
    }

    #[test]
    fn prepare_reports_every_missing_field() {
        let mut incomplete = draft();
        incomplete.need = " ".into();
        incomplete.cluster.clear();
        let err = prepare_new_service(incomplete, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            PortfolioError::Validation("Missing required fields: need, cluster".into()).to_string()
        );
    }

    #[tokio::test]
    async fn add_defaults_creator_and_status() {
        let repo = MemoryRepo::default();
        let mut store = ServiceStore::new();
        let editor = user(Role::Editor);

        let created = add_service(&mut store, &repo, draft(), Some(&editor))
            .await
            .unwrap();

        assert_eq!(created.service, "Energia solar por assinatura");
        assert_eq!(created.creator_name.as_deref(), Some("Carla"));
        assert_eq!(created.status, ServiceStatus::Evaluation);
        assert_eq!(created.total(), 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn viewers_cannot_mutate() {
        let repo = MemoryRepo::default();
        let mut store = ServiceStore::new();
        let viewer = user(Role::Viewer);

        let err = add_service(&mut store, &repo, draft(), Some(&viewer))
            .await
            .unwrap_err();
        assert!(matches!(err, PortfolioError::ReadOnly));
        assert!(repo.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_unknown_ids_are_not_found() {
        let repo = MemoryRepo::default();
        let mut store = ServiceStore::new();
        let created = add_service(&mut store, &repo, draft(), None).await.unwrap();

        let mut ghost = created.clone();
        ghost.id = 404;
        assert!(matches!(
            update_service(&mut store, &repo, &ghost, Role::Editor).await,
            Err(PortfolioError::NotFound(404))
        ));
        assert!(matches!(
            delete_service(&mut store, &repo, 404, Role::Editor).await,
            Err(PortfolioError::NotFound(404))
        ));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_then_refresh_reflects_backend() {
        let repo = MemoryRepo::default();
        let mut store = ServiceStore::new();
        let mut created = add_service(&mut store, &repo, draft(), None).await.unwrap();

        created.status = ServiceStatus::Approved;
        update_service(&mut store, &repo, &created, Role::Editor)
            .await
            .unwrap();

        let mut fresh = ServiceStore::new();
        assert_eq!(refresh(&mut fresh, &repo).await.unwrap(), 1);
        assert_eq!(fresh.all()[0].status, ServiceStatus::Approved);

        delete_service(&mut store, &repo, created.id, Role::Editor)
            .await
            .unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn update_clamps_negative_revenue() {
        let repo = MemoryRepo::default();
        let mut store = ServiceStore::new();
        let mut created = add_service(&mut store, &repo, draft(), None).await.unwrap();

        created.revenue_estimate = -100.0;
        let saved = update_service(&mut store, &repo, &created, Role::Editor)
            .await
            .unwrap();

        assert_eq!(saved.revenue_estimate, 0.0);
        assert_eq!(store.get(created.id).unwrap().revenue_estimate, 0.0);
        assert_eq!(repo.rows.lock().unwrap()[0].revenue_estimate, 0.0);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_existing_records() {
        let ok = MemoryRepo::default();
        let mut store = ServiceStore::new();
        add_service(&mut store, &ok, draft(), None).await.unwrap();

        let failing = MemoryRepo {
            fail_reads: true,
            ..Default::default()
        };
        let err = refresh(&mut store, &failing).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn automation_requires_configured_webhook() {
        let service = Service {
            id: 1,
            service: "X".into(),
            need: String::new(),
            target_audience: String::new(),
            cluster: String::new(),
            business_model: String::new(),
            status: ServiceStatus::Evaluation,
            creator_name: None,
            creation_date: None,
            scores: Scores::default(),
            revenue_estimate: 0.0,
        };
        let err = trigger_automation(None, &service, Some("go"), None, Utc::now())
            .await
            .unwrap_err();
        assert!(err.requires_user_action());
    }
}
