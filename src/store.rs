//! In-memory record collection, the single owner of every known idea.
//!
//! Only three things write to it: a completed full fetch, a successful
//! create/update/delete, and a save batch committing accepted records.
//! Projections (metrics, ranking, export) borrow the slice and never mutate.

use std::collections::HashSet;

use crate::error::PortfolioError;
use crate::types::{clamp_revenue, Service};

#[derive(Debug, Default, Clone)]
pub struct ServiceStore {
    services: Vec<Service>,
}

impl ServiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a fetched collection. Later duplicates of an id are dropped.
    pub fn from_services(services: Vec<Service>) -> Self {
        let mut store = Self::new();
        store.replace_all(services);
        store
    }

    /// Replace the whole collection after a full fetch.
    pub fn replace_all(&mut self, services: Vec<Service>) {
        let mut seen = HashSet::with_capacity(services.len());
        let before = services.len();
        self.services = services
            .into_iter()
            .filter(|s| seen.insert(s.id))
            .collect();
        if self.services.len() != before {
            log::warn!(
                "Dropped {} records with duplicate ids from fetch",
                before - self.services.len()
            );
        }
    }

    pub fn all(&self) -> &[Service] {
        &self.services
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Append a newly created record. Revenue is clamped to `>= 0`.
    pub fn insert(&mut self, mut service: Service) -> Result<(), PortfolioError> {
        service.revenue_estimate = clamp_revenue(service.revenue_estimate);
        if self.get(service.id).is_some() {
            return Err(PortfolioError::Duplicate(service.id));
        }
        self.services.push(service);
        Ok(())
    }

    /// Replace the baseline for an existing id, keeping its position.
    /// Revenue is clamped to `>= 0`.
    pub fn replace(&mut self, mut service: Service) -> Result<(), PortfolioError> {
        service.revenue_estimate = clamp_revenue(service.revenue_estimate);
        let slot = self
            .services
            .iter_mut()
            .find(|s| s.id == service.id)
            .ok_or(PortfolioError::NotFound(service.id))?;
        *slot = service;
        Ok(())
    }

    pub fn remove(&mut self, id: i64) -> Result<Service, PortfolioError> {
        let index = self
            .services
            .iter()
            .position(|s| s.id == id)
            .ok_or(PortfolioError::NotFound(id))?;
        Ok(self.services.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Scores, ServiceStatus};

    fn service(id: i64, name: &str) -> Service {
        Service {
            id,
            service: name.to_string(),
            need: String::new(),
            target_audience: String::new(),
            cluster: "Mobilidade".to_string(),
            business_model: "Locação".to_string(),
            status: ServiceStatus::Evaluation,
            creator_name: None,
            creation_date: None,
            scores: Scores::default(),
            revenue_estimate: 0.0,
        }
    }

    #[test]
    fn fetch_drops_duplicate_ids() {
        let store =
            ServiceStore::from_services(vec![service(1, "a"), service(2, "b"), service(1, "c")]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().service, "a");
    }

    #[test]
    fn insert_rejects_existing_id() {
        let mut store = ServiceStore::from_services(vec![service(1, "a")]);
        assert!(matches!(
            store.insert(service(1, "b")),
            Err(PortfolioError::Duplicate(1))
        ));
        store.insert(service(2, "b")).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn replace_keeps_position() {
        let mut store = ServiceStore::from_services(vec![service(1, "a"), service(2, "b")]);
        store.replace(service(1, "renamed")).unwrap();
        assert_eq!(store.all()[0].service, "renamed");
        assert!(matches!(
            store.replace(service(9, "x")),
            Err(PortfolioError::NotFound(9))
        ));
    }

    #[test]
    fn writes_clamp_negative_revenue() {
        let mut negative = service(1, "a");
        negative.revenue_estimate = -100.0;
        let mut store = ServiceStore::new();
        store.insert(negative.clone()).unwrap();
        assert_eq!(store.get(1).unwrap().revenue_estimate, 0.0);

        negative.revenue_estimate = f64::NAN;
        store.replace(negative).unwrap();
        assert_eq!(store.get(1).unwrap().revenue_estimate, 0.0);
    }

    #[test]
    fn remove_unknown_id_is_not_found() {
        let mut store = ServiceStore::from_services(vec![service(1, "a")]);
        assert_eq!(store.remove(1).unwrap().id, 1);
        assert!(store.is_empty());
        assert!(matches!(store.remove(1), Err(PortfolioError::NotFound(1))));
    }
}
