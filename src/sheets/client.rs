//! HTTP client for the spreadsheet web app.
//!
//! Every call is a `POST` of `{"action": ..., "payload": ...}` sent as
//! `text/plain` (the web app rejects CORS preflights, so JSON content types
//! are avoided). Updates send the flat sheet row, one column per criterion.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::SheetsConfig;
use crate::error::PortfolioError;
use crate::repository::{AuthProvider, ServiceRepository};
use crate::types::{AuthSession, NewService, Service, ServiceStatus};

const CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// Actions understood by the web app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GetServices,
    AddService,
    UpdateService,
    DeleteService,
    LoginUser,
    RegisterUser,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::GetServices => "getServices",
            Action::AddService => "addService",
            Action::UpdateService => "updateService",
            Action::DeleteService => "deleteService",
            Action::LoginUser => "loginUser",
            Action::RegisterUser => "registerUser",
        }
    }
}

/// Response wrapper returned for every action.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: Option<bool>,
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode an envelope body, turning `success: false` into an API error.
pub(crate) fn parse_envelope<T: DeserializeOwned>(
    action: Action,
    body: &str,
) -> Result<T, PortfolioError> {
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| {
        PortfolioError::Parse(format!("Invalid {} response: {}", action.as_str(), e))
    })?;

    if envelope.success == Some(false) {
        return Err(PortfolioError::Api(
            envelope
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| "Unknown API error".to_string()),
        ));
    }

    envelope.data.ok_or_else(|| {
        PortfolioError::Parse(format!("Missing 'data' in {} response", action.as_str()))
    })
}

/// A record as one spreadsheet row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRow<'a> {
    pub id: i64,
    pub service: &'a str,
    pub need: &'a str,
    pub cluster: &'a str,
    pub business_model: &'a str,
    pub target_audience: &'a str,
    pub status: ServiceStatus,
    pub creator_name: &'a str,
    pub creation_date: String,
    #[serde(rename = "score_alinhamento")]
    pub score_alignment: u8,
    #[serde(rename = "score_valor_cliente")]
    pub score_customer_value: u8,
    #[serde(rename = "score_impacto_fin")]
    pub score_financial_impact: u8,
    #[serde(rename = "score_viabilidade")]
    pub score_feasibility: u8,
    #[serde(rename = "score_vantagem_comp")]
    pub score_competitive_edge: u8,
    #[serde(rename = "revenue_estimate")]
    pub revenue_estimate: f64,
}

impl<'a> From<&'a Service> for SheetRow<'a> {
    fn from(s: &'a Service) -> Self {
        let [alignment, customer_value, financial_impact, feasibility, competitive_edge] =
            s.scores.as_array();
        Self {
            id: s.id,
            service: &s.service,
            need: &s.need,
            cluster: &s.cluster,
            business_model: &s.business_model,
            target_audience: &s.target_audience,
            status: s.status,
            creator_name: s.creator_name.as_deref().unwrap_or(""),
            creation_date: s
                .creation_date
                .map(|d| d.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
                .unwrap_or_default(),
            score_alignment: alignment,
            score_customer_value: customer_value,
            score_financial_impact: financial_impact,
            score_feasibility: feasibility,
            score_competitive_edge: competitive_edge,
            revenue_estimate: s.revenue_estimate,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeletedId {
    id: i64,
}

pub struct SheetsClient {
    client: reqwest::Client,
    endpoint: url::Url,
    timeout_secs: u64,
}

impl SheetsClient {
    /// Build a client for a configured endpoint. Fails with a configuration
    /// error when the endpoint is unset or invalid.
    pub fn new(config: &SheetsConfig) -> Result<Self, PortfolioError> {
        let endpoint = config.endpoint_url()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| PortfolioError::Configuration(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self {
            client,
            endpoint,
            timeout_secs: config.timeout_secs.max(1),
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        action: Action,
        payload: serde_json::Value,
    ) -> Result<T, PortfolioError> {
        let body = serde_json::json!({ "action": action.as_str(), "payload": payload });
        log::debug!("Sheets request: {}", action.as_str());

        let resp = self
            .client
            .post(self.endpoint.clone())
            .header("Content-Type", CONTENT_TYPE)
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| self.transport_error(action, e))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| self.transport_error(action, e))?;

        if !status.is_success() {
            log::warn!("Sheets {} failed with HTTP {}", action.as_str(), status);
            return Err(PortfolioError::Api(format!("HTTP {}: {}", status, text)));
        }

        let result = parse_envelope(action, &text);
        match &result {
            Ok(_) => log::info!("Sheets {} succeeded", action.as_str()),
            Err(e) => log::warn!("Sheets {} failed: {}", action.as_str(), e),
        }
        result
    }

    fn transport_error(&self, action: Action, e: reqwest::Error) -> PortfolioError {
        log::warn!("Sheets {} transport error: {}", action.as_str(), e);
        if e.is_timeout() {
            PortfolioError::Timeout(self.timeout_secs)
        } else {
            PortfolioError::from(e)
        }
    }
}

#[async_trait]
impl ServiceRepository for SheetsClient {
    async fn get_services(&self) -> Result<Vec<Service>, PortfolioError> {
        self.request(Action::GetServices, serde_json::Value::Null)
            .await
    }

    async fn add_service(&self, draft: &NewService) -> Result<Service, PortfolioError> {
        self.request(Action::AddService, serde_json::json!({ "service": draft }))
            .await
    }

    async fn update_service(&self, service: &Service) -> Result<Service, PortfolioError> {
        let row = SheetRow::from(service);
        self.request(Action::UpdateService, serde_json::json!({ "service": row }))
            .await
    }

    async fn delete_service(&self, id: i64) -> Result<i64, PortfolioError> {
        let deleted: DeletedId = self
            .request(Action::DeleteService, serde_json::json!({ "id": id }))
            .await?;
        Ok(deleted.id)
    }
}

#[async_trait]
impl AuthProvider for SheetsClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, PortfolioError> {
        self.request(
            Action::LoginUser,
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, PortfolioError> {
        self.request(
            Action::RegisterUser,
            serde_json::json!({ "name": name, "email": email, "password": password }),
        )
        .await
    }
}
