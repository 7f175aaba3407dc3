//! Spreadsheet-backed persistence and auth API.
//!
//! A single web-app endpoint accepts `{action, payload}` posts and answers
//! with a `{success, data, error}` envelope. See [`client::SheetsClient`].

pub mod client;

use serde::{Deserialize, Serialize};

use crate::error::PortfolioError;

pub use client::SheetsClient;

/// Value shipped in fresh config templates until an operator fills it in.
pub const ENDPOINT_PLACEHOLDER: &str = "YOUR_GOOGLE_APPS_SCRIPT_WEB_APP_URL_HERE";

/// Persistence endpoint settings stored in ~/.ideaboard/config.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SheetsConfig {
    pub fn is_configured(&self) -> bool {
        self.endpoint_url().is_ok()
    }

    /// The endpoint as a validated URL, or a configuration error when it is
    /// unset, still the placeholder, or malformed.
    pub fn endpoint_url(&self) -> Result<url::Url, PortfolioError> {
        let raw = self
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.contains(ENDPOINT_PLACEHOLDER))
            .ok_or_else(|| {
                PortfolioError::Configuration(
                    "The backend endpoint is not configured. Set sheets.endpoint in ~/.ideaboard/config.json."
                        .to_string(),
                )
            })?;
        url::Url::parse(raw).map_err(|e| {
            PortfolioError::Configuration(format!("Invalid backend endpoint '{}': {}", raw, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_and_placeholder_endpoints_are_unconfigured() {
        assert!(!SheetsConfig::default().is_configured());

        let placeholder = SheetsConfig {
            endpoint: Some(ENDPOINT_PLACEHOLDER.to_string()),
            ..Default::default()
        };
        assert!(matches!(
            placeholder.endpoint_url(),
            Err(PortfolioError::Configuration(_))
        ));

        let malformed = SheetsConfig {
            endpoint: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(!malformed.is_configured());
    }

    #[test]
    fn valid_endpoint_parses() {
        let config = SheetsConfig {
            endpoint: Some(" https://script.google.com/macros/s/abc/exec ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.endpoint_url().unwrap().host_str(),
            Some("script.google.com")
        );
    }

    #[test]
    fn timeout_defaults_when_missing() {
        let config: SheetsConfig = serde_json::from_str(r#"{"endpoint":"https://x.test"}"#).unwrap();
        assert_eq!(config.timeout_secs, 30);
    }
}
