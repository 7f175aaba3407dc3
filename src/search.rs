//! Lookups used by the command menu and the chart drill-downs.

use crate::catalog::{BusinessModelCategory, BusinessModelMapper};
use crate::helpers::{contains_ignore_case, locale_cmp};
use crate::types::Service;

pub const QUICK_SEARCH_LIMIT: usize = 10;

/// Ideas whose name contains `query`, case-insensitively, in collection
/// order. A blank query matches nothing.
pub fn quick_search<'a>(services: &'a [Service], query: &str) -> Vec<&'a Service> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    services
        .iter()
        .filter(|s| contains_ignore_case(&s.service, query))
        .take(QUICK_SEARCH_LIMIT)
        .collect()
}

/// Ideas in one cluster (exact name).
pub fn services_in_cluster<'a>(services: &'a [Service], cluster: &str) -> Vec<&'a Service> {
    services.iter().filter(|s| s.cluster == cluster).collect()
}

/// Ideas whose raw business model maps to `category`.
pub fn services_in_category<'a>(
    services: &'a [Service],
    category: BusinessModelCategory,
    mapper: &BusinessModelMapper,
) -> Vec<&'a Service> {
    services
        .iter()
        .filter(|s| mapper.map(&s.business_model) == category)
        .collect()
}

/// Distinct non-blank cluster names present on records, locale-sorted.
pub fn observed_clusters(services: &[Service]) -> Vec<String> {
    let mut clusters: Vec<String> = services
        .iter()
        .map(|s| s.cluster.trim())
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect();
    clusters.sort_by(|a, b| locale_cmp(a, b));
    clusters.dedup();
    clusters
}
