//! Static catalogs the portfolio is scored and grouped against.
//!
//! Clusters ship as embedded JSON, criteria and business-model categories
//! are fixed tables. None of them are editable at runtime.

pub mod business_models;
pub mod criteria;

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

pub use business_models::{map_business_model, BusinessModelCategory, BusinessModelMapper};
pub use criteria::{Criterion, CRITERIA};

const CLUSTERS_JSON: &str = include_str!("clusters.json");

/// A strategic cluster from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    /// Name stored on idea records.
    pub short_title: String,
    pub title: String,
    #[serde(default)]
    pub value_proposition: String,
    #[serde(default)]
    pub needs: Vec<String>,
}

/// All catalog clusters in display order.
pub fn clusters() -> &'static [Cluster] {
    static CLUSTERS: OnceLock<Vec<Cluster>> = OnceLock::new();
    CLUSTERS.get_or_init(|| match serde_json::from_str(CLUSTERS_JSON) {
        Ok(clusters) => clusters,
        Err(e) => {
            log::error!("Embedded cluster catalog is invalid: {}", e);
            Vec::new()
        }
    })
}

/// Look up a catalog cluster by the name stored on records.
pub fn find_cluster(short_title: &str) -> Option<&'static Cluster> {
    clusters().iter().find(|c| c.short_title == short_title)
}
