//! Application configuration loaded from ~/.ideaboard/config.json.
//!
//! Every field has a default, so a partial file (or none at all) still
//! yields a usable config. Collaborators whose endpoint is missing report a
//! configuration error only when they are used.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::automation::AutomationConfig;
use crate::catalog::{BusinessModelCategory, BusinessModelMapper};
use crate::error::PortfolioError;
use crate::metrics::{
    OverviewOptions, DEFAULT_NEW_IDEAS_WINDOW_DAYS, DEFAULT_STAGNANT_AFTER_DAYS, DEFAULT_TOP_N,
};
use crate::ranking::DEFAULT_PAGE_SIZE;
use crate::sheets::SheetsConfig;

/// Upper bound for the day windows, one hundred years.
pub const MAX_WINDOW_DAYS: i64 = 36_500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_new_ideas_window_days")]
    pub new_ideas_window_days: i64,
    #[serde(default = "default_stagnant_after_days")]
    pub stagnant_after_days: i64,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_new_ideas_window_days() -> i64 {
    DEFAULT_NEW_IDEAS_WINDOW_DAYS
}

fn default_stagnant_after_days() -> i64 {
    DEFAULT_STAGNANT_AFTER_DAYS
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            top_n: default_top_n(),
            new_ideas_window_days: default_new_ideas_window_days(),
            stagnant_after_days: default_stagnant_after_days(),
        }
    }
}

fn default_business_model() -> String {
    BusinessModelMapper::default().fallback().short_title().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub automation: AutomationConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    /// Category for business models the mapping table does not know.
    #[serde(default = "default_business_model")]
    pub default_business_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sheets: SheetsConfig::default(),
            automation: AutomationConfig::default(),
            ranking: RankingConfig::default(),
            default_business_model: default_business_model(),
        }
    }
}

impl AppConfig {
    pub fn business_model_mapper(&self) -> Result<BusinessModelMapper, PortfolioError> {
        BusinessModelCategory::from_label(&self.default_business_model)
            .map(BusinessModelMapper::with_fallback)
            .ok_or_else(|| {
                PortfolioError::Configuration(format!(
                    "Unknown defaultBusinessModel '{}'",
                    self.default_business_model
                ))
            })
    }

    pub fn overview_options(&self) -> Result<OverviewOptions, PortfolioError> {
        Ok(OverviewOptions {
            new_ideas_window_days: self.ranking.new_ideas_window_days,
            stagnant_after_days: self.ranking.stagnant_after_days,
            top_n: self.ranking.top_n,
            mapper: self.business_model_mapper()?,
        })
    }

    fn validate(&self) -> Result<(), PortfolioError> {
        if self.ranking.page_size == 0 {
            return Err(PortfolioError::Configuration(
                "ranking.pageSize must be at least 1".to_string(),
            ));
        }
        for (name, days) in [
            ("newIdeasWindowDays", self.ranking.new_ideas_window_days),
            ("stagnantAfterDays", self.ranking.stagnant_after_days),
        ] {
            if !(0..=MAX_WINDOW_DAYS).contains(&days) {
                return Err(PortfolioError::Configuration(format!(
                    "ranking.{} must be between 0 and {}, got {}",
                    name, MAX_WINDOW_DAYS, days
                )));
            }
        }
        self.business_model_mapper()?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf, PortfolioError> {
    let home = dirs::home_dir()
        .ok_or_else(|| PortfolioError::Configuration("Could not find home directory".to_string()))?;
    Ok(home.join(".ideaboard").join("config.json"))
}

/// Load ~/.ideaboard/config.json, falling back to defaults when absent.
pub fn load_config() -> Result<AppConfig, PortfolioError> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, PortfolioError> {
    if !path.exists() {
        log::info!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        PortfolioError::Configuration(format!("Failed to read config {}: {}", path.display(), e))
    })?;
    let config: AppConfig = serde_json::from_str(&content).map_err(|e| {
        PortfolioError::Configuration(format!("Failed to parse config {}: {}", path.display(), e))
    })?;
    config.validate()?;
    Ok(config)
}
