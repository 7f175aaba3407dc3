//! Webhook trigger for external automation flows (Make, Zapier, n8n).
//!
//! One `POST` with a JSON snapshot of the idea. Failures are reported to the
//! caller and never retried.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PortfolioError;
use crate::scoring::Tier;
use crate::types::Service;

pub const WEBHOOK_PLACEHOLDER: &str = "YOUR_WEBHOOK_URL_HERE";

const WEBHOOK_TIMEOUT_SECS: u64 = 30;

/// Automation settings stored in ~/.ideaboard/config.json.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl AutomationConfig {
    /// The webhook URL when automation is enabled and a real URL is set.
    pub fn webhook(&self) -> Option<url::Url> {
        if !self.enabled {
            return None;
        }
        let raw = self
            .webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != WEBHOOK_PLACEHOLDER)?;
        match url::Url::parse(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("Ignoring invalid webhook URL '{}': {}", raw, e);
                None
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook().is_some()
    }
}

/// Body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationPayload {
    pub service: Service,
    pub total_score: u8,
    pub classification: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl AutomationPayload {
    pub fn new(
        service: &Service,
        message: Option<&str>,
        requested_by: Option<&str>,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            total_score: service.total(),
            classification: service.tier(),
            service: service.clone(),
            message: message
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from),
            requested_by: requested_by.map(String::from),
            sent_at,
        }
    }
}

pub struct WebhookClient {
    client: reqwest::Client,
    url: url::Url,
}

impl WebhookClient {
    /// `None` when automation is disabled or unconfigured.
    pub fn from_config(config: &AutomationConfig) -> Result<Option<Self>, PortfolioError> {
        let Some(url) = config.webhook() else {
            return Ok(None);
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
            .build()
            .map_err(|e| PortfolioError::Configuration(format!("HTTP client setup failed: {}", e)))?;
        Ok(Some(Self { client, url }))
    }

    pub async fn send(&self, payload: &AutomationPayload) -> Result<(), PortfolioError> {
        let resp = self
            .client
            .post(self.url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PortfolioError::Timeout(WEBHOOK_TIMEOUT_SECS)
                } else {
                    PortfolioError::from(e)
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            log::warn!("Webhook for service {} failed: HTTP {}", payload.service.id, status);
            return Err(PortfolioError::Api(format!("Webhook error {}: {}", status, text)));
        }

        log::info!("Webhook triggered for service {}", payload.service.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Scores, ServiceStatus};
    use chrono::TimeZone;

    fn config(enabled: bool, url: Option<&str>) -> AutomationConfig {
        AutomationConfig {
            enabled,
            webhook_url: url.map(String::from),
        }
    }

    #[test]
    fn disabled_or_placeholder_is_unconfigured() {
        assert!(!config(false, Some("https://hook.test/x")).is_configured());
        assert!(!config(true, None).is_configured());
        assert!(!config(true, Some(WEBHOOK_PLACEHOLDER)).is_configured());
        assert!(!config(true, Some("nope")).is_configured());
        assert!(config(true, Some("https://hook.test/x")).is_configured());
    }

    #[test]
    fn unconfigured_webhook_builds_no_client() {
        assert!(WebhookClient::from_config(&config(true, None))
            .unwrap()
            .is_none());
    }

    #[test]
    fn payload_carries_score_and_tier() {
        let service = Service {
            id: 3,
            service: "Manutenção preditiva".into(),
            need: String::new(),
            target_audience: String::new(),
            cluster: "Casa Inteligente".into(),
            business_model: "Assinatura".into(),
            status: ServiceStatus::Evaluation,
            creator_name: None,
            creation_date: None,
            scores: Scores::new([5, 5, 4, 4, 3]),
            revenue_estimate: 0.0,
        };
        let sent_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let payload = AutomationPayload::new(&service, Some("  "), Some("Ana"), sent_at);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["totalScore"], 21);
        assert_eq!(json["classification"], "Altíssima");
        assert_eq!(json["requestedBy"], "Ana");
        assert_eq!(json["service"]["id"], 3);
        assert!(json.get("message").is_none());
    }
}
