//! Ranking table pipeline: annotate → filter → sort → paginate.
//!
//! [`run_pipeline`] is a pure function of the collection and the three
//! specs. [`RankingView`] holds the specs between UI events and enforces the
//! navigation rules: a filter change resets to page 1, re-selecting the
//! active sort key flips its direction, and a page beyond the end of the
//! result is pulled back to the last valid page.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;

use crate::catalog::criteria::criterion_index;
use crate::error::PortfolioError;
use crate::helpers::locale_cmp;
use crate::scoring::Tier;
use crate::types::{Service, ServiceStatus, CRITERIA_COUNT};

pub const DEFAULT_PAGE_SIZE: usize = 10;

// ---------------------------------------------------------------------------
// Specs
// ---------------------------------------------------------------------------

/// Active filters. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceFilter {
    pub cluster: Option<String>,
    pub tier: Option<Tier>,
    pub status: Option<ServiceStatus>,
}

impl ServiceFilter {
    pub fn is_empty(&self) -> bool {
        self.cluster.is_none() && self.tier.is_none() && self.status.is_none()
    }

    /// AND of every active predicate.
    pub fn matches(&self, row: &RankedService) -> bool {
        self.cluster
            .as_deref()
            .map_or(true, |c| row.service.cluster == c)
            && self.tier.map_or(true, |t| row.tier == t)
            && self.status.map_or(true, |s| row.service.status == s)
    }
}

/// A single filter dimension change, as issued by a dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Cluster(Option<String>),
    Tier(Option<Tier>),
    Status(Option<ServiceStatus>),
}

impl FilterChange {
    /// Parse a dropdown value for `field`; `"all"` or empty clears it.
    pub fn parse(field: &str, value: &str) -> Result<Self, PortfolioError> {
        let value = value.trim();
        let cleared = value.is_empty() || value.eq_ignore_ascii_case("all");
        match field {
            "cluster" => Ok(FilterChange::Cluster(
                (!cleared).then(|| value.to_string()),
            )),
            "classification" | "tier" => Ok(FilterChange::Tier(if cleared {
                None
            } else {
                Some(value.parse()?)
            })),
            "status" => Ok(FilterChange::Status(if cleared {
                None
            } else {
                Some(value.parse()?)
            })),
            other => Err(PortfolioError::Validation(format!(
                "unknown filter '{}'",
                other
            ))),
        }
    }

    fn apply(self, filter: &mut ServiceFilter) {
        match self {
            FilterChange::Cluster(c) => filter.cluster = c,
            FilterChange::Tier(t) => filter.tier = t,
            FilterChange::Status(s) => filter.status = s,
        }
    }
}

/// Column a ranking can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Id,
    Service,
    Need,
    TargetAudience,
    Cluster,
    BusinessModel,
    Status,
    CreatorName,
    CreationDate,
    Score(usize),
    RevenueEstimate,
    Total,
}

impl SortKey {
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            SortKey::Service
                | SortKey::Need
                | SortKey::TargetAudience
                | SortKey::Cluster
                | SortKey::BusinessModel
                | SortKey::Status
                | SortKey::CreatorName
        )
    }

    fn compare(&self, a: &RankedService, b: &RankedService) -> Ordering {
        let (x, y) = (&a.service, &b.service);
        match self {
            SortKey::Id => x.id.cmp(&y.id),
            SortKey::Service => locale_cmp(&x.service, &y.service),
            SortKey::Need => locale_cmp(&x.need, &y.need),
            SortKey::TargetAudience => locale_cmp(&x.target_audience, &y.target_audience),
            SortKey::Cluster => locale_cmp(&x.cluster, &y.cluster),
            SortKey::BusinessModel => locale_cmp(&x.business_model, &y.business_model),
            SortKey::Status => locale_cmp(x.status.as_str(), y.status.as_str()),
            SortKey::CreatorName => locale_cmp(
                x.creator_name.as_deref().unwrap_or_default(),
                y.creator_name.as_deref().unwrap_or_default(),
            ),
            SortKey::CreationDate => x.creation_date.cmp(&y.creation_date),
            SortKey::Score(index) => x
                .scores
                .get(*index)
                .unwrap_or(0)
                .cmp(&y.scores.get(*index).unwrap_or(0)),
            SortKey::RevenueEstimate => x.revenue_estimate.total_cmp(&y.revenue_estimate),
            SortKey::Total => a.total.cmp(&b.total),
        }
    }
}

/// Accepts record field names, `score_<n>`, or a criterion id.
impl FromStr for SortKey {
    type Err = PortfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "id" => SortKey::Id,
            "service" => SortKey::Service,
            "need" => SortKey::Need,
            "targetAudience" => SortKey::TargetAudience,
            "cluster" => SortKey::Cluster,
            "businessModel" => SortKey::BusinessModel,
            "status" => SortKey::Status,
            "creatorName" => SortKey::CreatorName,
            "creationDate" => SortKey::CreationDate,
            "revenueEstimate" => SortKey::RevenueEstimate,
            "total" => SortKey::Total,
            other => {
                let index = other
                    .strip_prefix("score_")
                    .and_then(|n| n.parse::<usize>().ok())
                    .or_else(|| criterion_index(other));
                match index {
                    Some(i) if i < CRITERIA_COUNT => SortKey::Score(i),
                    _ => {
                        return Err(PortfolioError::Validation(format!(
                            "unknown sort key '{}'",
                            other
                        )))
                    }
                }
            }
        };
        Ok(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: SortKey::Total,
            direction: SortDirection::Descending,
        }
    }
}

impl SortSpec {
    /// Next spec after a header click: the active key flips from descending
    /// to ascending; anything else (a new key, or ascending) sorts descending.
    pub fn toggled(self, key: SortKey) -> Self {
        let direction = if self.key == key && self.direction == SortDirection::Descending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        };
        Self { key, direction }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub page_size: usize,
    /// 1-based.
    pub page_number: usize,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_number: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// A record annotated with its derived score fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedService {
    #[serde(flatten)]
    pub service: Service,
    pub total: u8,
    pub tier: Tier,
}

impl RankedService {
    pub fn new(service: Service) -> Self {
        let total = service.total();
        Self {
            tier: crate::scoring::classify(total),
            total,
            service,
        }
    }
}

/// One displayable page of the ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingPage {
    pub rows: Vec<RankedService>,
    /// Effective page after reclamping, 1-based.
    pub page_number: usize,
    /// At least 1, even when nothing matches.
    pub total_pages: usize,
    pub total_matches: usize,
    /// Zero-based position of the first row in the filtered result.
    pub start_index: usize,
}

/// Page count for `matches` rows, never below 1.
pub fn page_count(matches: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    matches.div_ceil(page_size).max(1)
}

/// Clamp a requested page into `1..=page_count`.
pub fn clamp_page(page_number: usize, matches: usize, page_size: usize) -> usize {
    page_number.clamp(1, page_count(matches, page_size))
}

/// Annotate and filter, then sort stably by `sort`.
pub fn filter_and_sort(
    services: &[Service],
    filter: &ServiceFilter,
    sort: &SortSpec,
) -> Vec<RankedService> {
    let mut rows: Vec<RankedService> = services
        .iter()
        .cloned()
        .map(RankedService::new)
        .filter(|row| filter.matches(row))
        .collect();

    rows.sort_by(|a, b| {
        let ord = sort.key.compare(a, b);
        match sort.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    rows
}

pub fn run_pipeline(
    services: &[Service],
    filter: &ServiceFilter,
    sort: &SortSpec,
    page: &PageSpec,
) -> RankingPage {
    let rows = filter_and_sort(services, filter, sort);
    let page_size = page.page_size.max(1);
    let total_matches = rows.len();
    let total_pages = page_count(total_matches, page_size);
    let page_number = clamp_page(page.page_number, total_matches, page_size);
    let start_index = (page_number - 1) * page_size;

    RankingPage {
        rows: rows.into_iter().skip(start_index).take(page_size).collect(),
        page_number,
        total_pages,
        total_matches,
        start_index,
    }
}

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// Filter/sort/page state of the ranking table between UI events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingView {
    filter: ServiceFilter,
    sort: SortSpec,
    page: PageSpec,
}

impl Default for RankingView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl RankingView {
    pub fn new(page_size: usize) -> Self {
        Self {
            filter: ServiceFilter::default(),
            sort: SortSpec::default(),
            page: PageSpec {
                page_size: page_size.max(1),
                page_number: 1,
            },
        }
    }

    pub fn filter(&self) -> &ServiceFilter {
        &self.filter
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn page(&self) -> PageSpec {
        self.page
    }

    /// Apply a filter change; pagination always returns to page 1.
    pub fn apply_filter(&mut self, change: FilterChange) {
        change.apply(&mut self.filter);
        self.page.page_number = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filter = ServiceFilter::default();
        self.page.page_number = 1;
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort = self.sort.toggled(key);
    }

    pub fn go_to_page(&mut self, page_number: usize) {
        self.page.page_number = page_number.max(1);
    }

    /// Run the pipeline and store the reclamped page number, so a shrinking
    /// result never strands the view past its last page.
    pub fn render(&mut self, services: &[Service]) -> RankingPage {
        let page = run_pipeline(services, &self.filter, &self.sort, &self.page);
        if page.page_number != self.page.page_number {
            log::debug!(
                "Ranking page {} out of range, reclamped to {}",
                self.page.page_number,
                page.page_number
            );
            self.page.page_number = page.page_number;
        }
        page
    }
}
