//! Collaborator seams: the record store and the auth service.
//!
//! The spreadsheet-backed HTTP client implements both; tests substitute
//! in-memory fakes.

use async_trait::async_trait;

use crate::error::PortfolioError;
use crate::types::{AuthSession, NewService, Service};

/// CRUD operations offered by the persistence backend.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn get_services(&self) -> Result<Vec<Service>, PortfolioError>;

    /// The backend assigns id, creation date, zero scores and zero revenue.
    async fn add_service(&self, draft: &NewService) -> Result<Service, PortfolioError>;

    /// Full-record replace by id.
    async fn update_service(&self, service: &Service) -> Result<Service, PortfolioError>;

    /// Returns the deleted id.
    async fn delete_service(&self, id: i64) -> Result<i64, PortfolioError>;
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, PortfolioError>;

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, PortfolioError>;
}
