pub mod auth;
pub mod automation;
pub mod board;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod helpers;
pub mod metrics;
pub mod ranking;
pub mod repository;
pub mod scoring;
pub mod search;
pub mod services;
pub mod session;
pub mod sheets;
pub mod store;
pub mod types;

pub use error::{PortfolioError, UserFacingError};
