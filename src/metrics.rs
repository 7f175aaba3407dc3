// Portfolio metrics: every figure on the overview dashboard.
// All functions are pure projections over the record slice; nothing is cached.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::catalog::{BusinessModelMapper, Cluster};
use crate::scoring::{Tier, MAX_TOTAL_SCORE};
use crate::types::{Service, ServiceStatus};

pub const DEFAULT_NEW_IDEAS_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_STAGNANT_AFTER_DAYS: i64 = 60;
pub const DEFAULT_TOP_N: usize = 5;

/// One bar/slice of a distribution chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterAverage {
    pub cluster: String,
    pub ideas: usize,
    pub average_score: f64,
}

/// Radar-chart point: average total for one catalog cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePoint {
    pub subject: String,
    pub score: f64,
    pub full_mark: u8,
}

/// Knobs for [`build_overview`].
#[derive(Debug, Clone, Copy)]
pub struct OverviewOptions {
    pub new_ideas_window_days: i64,
    pub stagnant_after_days: i64,
    pub top_n: usize,
    pub mapper: BusinessModelMapper,
}

impl Default for OverviewOptions {
    fn default() -> Self {
        Self {
            new_ideas_window_days: DEFAULT_NEW_IDEAS_WINDOW_DAYS,
            stagnant_after_days: DEFAULT_STAGNANT_AFTER_DAYS,
            top_n: DEFAULT_TOP_N,
            mapper: BusinessModelMapper::default(),
        }
    }
}

/// Everything the overview dashboard renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioOverview {
    pub total_ideas: usize,
    pub average_score: f64,
    pub potential_revenue: f64,
    pub new_ideas: usize,
    pub approval_rate: f64,
    pub stagnant_ideas: usize,
    pub tier_distribution: Vec<LabelCount>,
    pub cluster_distribution: Vec<LabelCount>,
    pub business_model_distribution: Vec<LabelCount>,
    pub average_score_by_cluster: Vec<ClusterAverage>,
    pub portfolio_balance: Vec<BalancePoint>,
    pub top_ideas: Vec<Service>,
}

pub fn build_overview(
    services: &[Service],
    catalog: &[Cluster],
    now: DateTime<Utc>,
    options: &OverviewOptions,
) -> PortfolioOverview {
    PortfolioOverview {
        total_ideas: total_ideas(services),
        average_score: average_score(services),
        potential_revenue: potential_revenue(services),
        new_ideas: new_ideas_within(services, now, options.new_ideas_window_days),
        approval_rate: approval_rate(services),
        stagnant_ideas: stagnant_ideas(services, now, options.stagnant_after_days),
        tier_distribution: tier_distribution(services),
        cluster_distribution: cluster_distribution(services),
        business_model_distribution: business_model_distribution(services, &options.mapper),
        average_score_by_cluster: average_score_by_cluster(services),
        portfolio_balance: portfolio_balance(services, catalog),
        top_ideas: top_n(services, options.top_n),
    }
}

pub fn total_ideas(services: &[Service]) -> usize {
    services.len()
}

/// Sum of revenue estimates over approved ideas.
pub fn potential_revenue(services: &[Service]) -> f64 {
    services
        .iter()
        .filter(|s| s.status == ServiceStatus::Approved)
        .map(|s| s.revenue_estimate)
        .sum()
}

/// `now` minus `days`, or `None` when the window reaches past the
/// representable date range.
fn window_start(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(days).and_then(|window| now.checked_sub_signed(window))
}

/// Ideas created within the last `days` days. Undated records never count.
/// A window wider than the calendar covers every dated idea.
pub fn new_ideas_within(services: &[Service], now: DateTime<Utc>, days: i64) -> usize {
    let cutoff = window_start(now, days);
    services
        .iter()
        .filter(|s| {
            s.creation_date
                .is_some_and(|created| cutoff.map_or(true, |cutoff| created > cutoff))
        })
        .count()
}

/// Ideas still in evaluation that were created more than `days` days ago.
/// Zero when the window reaches past the representable date range.
pub fn stagnant_ideas(services: &[Service], now: DateTime<Utc>, days: i64) -> usize {
    let Some(cutoff) = window_start(now, days) else {
        return 0;
    };
    services
        .iter()
        .filter(|s| s.status == ServiceStatus::Evaluation)
        .filter(|s| s.creation_date.is_some_and(|created| created < cutoff))
        .count()
}

/// Approved share of ideas that left evaluation, as a percentage.
/// Zero when nothing has left evaluation yet.
pub fn approval_rate(services: &[Service]) -> f64 {
    let terminal = services.iter().filter(|s| s.status.is_terminal()).count();
    if terminal == 0 {
        return 0.0;
    }
    let approved = services
        .iter()
        .filter(|s| s.status == ServiceStatus::Approved)
        .count();
    approved as f64 / terminal as f64 * 100.0
}

/// Mean total score; zero for an empty portfolio.
pub fn average_score(services: &[Service]) -> f64 {
    mean_total(services.iter())
}

fn mean_total<'a>(services: impl Iterator<Item = &'a Service>) -> f64 {
    let (sum, count) = services.fold((0u64, 0usize), |(sum, count), s| {
        (sum + s.total() as u64, count + 1)
    });
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// Group and count by `key`, highest count first. Equal counts keep the
/// order in which each label first appears in `services`.
pub fn distribution_by<F>(services: &[Service], key: F) -> Vec<LabelCount>
where
    F: Fn(&Service) -> String,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for service in services {
        let label = key(service);
        let count = counts.entry(label.clone()).or_insert(0);
        if *count == 0 {
            order.push(label);
        }
        *count += 1;
    }

    let mut result: Vec<LabelCount> = order
        .into_iter()
        .map(|label| {
            let count = counts.get(&label).copied().unwrap_or(0);
            LabelCount { label, count }
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

pub fn cluster_distribution(services: &[Service]) -> Vec<LabelCount> {
    distribution_by(services, |s| s.cluster.clone())
}

pub fn business_model_distribution(
    services: &[Service],
    mapper: &BusinessModelMapper,
) -> Vec<LabelCount> {
    distribution_by(services, |s| mapper.map(&s.business_model).to_string())
}

/// Count per priority tier, highest count first. Tiers with no ideas are
/// omitted; equal counts list the higher tier first.
pub fn tier_distribution(services: &[Service]) -> Vec<LabelCount> {
    let mut result: Vec<LabelCount> = Tier::ALL
        .iter()
        .map(|tier| LabelCount {
            label: tier.label().to_string(),
            count: services.iter().filter(|s| s.tier() == *tier).count(),
        })
        .filter(|entry| entry.count > 0)
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

/// Mean total score for every cluster present on records, in order of
/// first appearance.
pub fn average_score_by_cluster(services: &[Service]) -> Vec<ClusterAverage> {
    let mut order: Vec<&str> = Vec::new();
    for service in services {
        if !order.contains(&service.cluster.as_str()) {
            order.push(&service.cluster);
        }
    }

    order
        .into_iter()
        .map(|cluster| {
            let members: Vec<&Service> =
                services.iter().filter(|s| s.cluster == cluster).collect();
            ClusterAverage {
                cluster: cluster.to_string(),
                ideas: members.len(),
                average_score: mean_total(members.into_iter()),
            }
        })
        .collect()
}

/// Mean total score for each catalog cluster, zero where a cluster has no ideas.
pub fn portfolio_balance(services: &[Service], catalog: &[Cluster]) -> Vec<BalancePoint> {
    catalog
        .iter()
        .map(|cluster| BalancePoint {
            subject: cluster.short_title.clone(),
            score: mean_total(services.iter().filter(|s| s.cluster == cluster.short_title)),
            full_mark: MAX_TOTAL_SCORE,
        })
        .collect()
}

/// The `n` highest-scoring ideas. Ties keep collection order.
pub fn top_n(services: &[Service], n: usize) -> Vec<Service> {
    let mut ranked: Vec<&Service> = services.iter().collect();
    ranked.sort_by(|a, b| b.total().cmp(&a.total()));
    ranked.into_iter().take(n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::clusters;
    use crate::types::Scores;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 30, 12, 0, 0).unwrap()
    }

    fn service(id: i64, cluster: &str, scores: [i64; 5], status: ServiceStatus) -> Service {
        Service {
            id,
            service: format!("Ideia {}", id),
            need: String::new(),
            target_audience: String::new(),
            cluster: cluster.to_string(),
            business_model: "Pacote de Serviço".to_string(),
            status,
            creator_name: None,
            creation_date: None,
            scores: Scores::new(scores),
            revenue_estimate: 0.0,
        }
    }

    fn created(mut s: Service, days_ago: i64) -> Service {
        s.creation_date = Some(now() - Duration::days(days_ago));
        s
    }

    fn three_ideas() -> Vec<Service> {
        vec![
            service(1, "Mobilidade", [5, 5, 5, 4, 3], ServiceStatus::Evaluation), // 22
            service(2, "Entretenimento", [3, 3, 3, 3, 3], ServiceStatus::Evaluation), // 15
            service(3, "Mobilidade", [2, 2, 2, 2, 1], ServiceStatus::Evaluation), // 9
        ]
    }

    #[test]
    fn top_n_and_tier_distribution_end_to_end() {
        let services = three_ideas();

        let top: Vec<u8> = top_n(&services, 2).iter().map(|s| s.total()).collect();
        assert_eq!(top, vec![22, 15]);

        let tiers = tier_distribution(&services);
        assert_eq!(
            tiers,
            vec![
                LabelCount { label: "Altíssima".into(), count: 1 },
                LabelCount { label: "Média".into(), count: 1 },
                LabelCount { label: "Baixa".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn top_n_ties_keep_collection_order() {
        let services = vec![
            service(1, "A", [1, 1, 1, 1, 1], ServiceStatus::Evaluation),
            service(2, "A", [3, 3, 3, 3, 3], ServiceStatus::Evaluation),
            service(3, "A", [3, 3, 3, 3, 3], ServiceStatus::Evaluation),
            service(4, "A", [3, 3, 3, 3, 3], ServiceStatus::Evaluation),
        ];
        let ids: Vec<i64> = top_n(&services, 3).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert_eq!(top_n(&services, 10).len(), 4);
    }

    #[test]
    fn approval_rate_without_terminal_ideas_is_zero() {
        assert_eq!(approval_rate(&[]), 0.0);
        assert_eq!(approval_rate(&three_ideas()), 0.0);
    }

    #[test]
    fn approval_rate_counts_only_terminal_ideas() {
        let services = vec![
            service(1, "A", [0; 5], ServiceStatus::Approved),
            service(2, "A", [0; 5], ServiceStatus::Cancelled),
            service(3, "A", [0; 5], ServiceStatus::Finished),
            service(4, "A", [0; 5], ServiceStatus::Approved),
            service(5, "A", [0; 5], ServiceStatus::Evaluation),
        ];
        assert_eq!(approval_rate(&services), 50.0);
    }

    #[test]
    fn potential_revenue_sums_approved_only() {
        let mut approved = service(1, "A", [0; 5], ServiceStatus::Approved);
        approved.revenue_estimate = 12_000.0;
        let mut cancelled = service(2, "A", [0; 5], ServiceStatus::Cancelled);
        cancelled.revenue_estimate = 99_000.0;
        assert_eq!(potential_revenue(&[approved, cancelled]), 12_000.0);
    }

    #[test]
    fn average_score_of_empty_portfolio_is_zero() {
        assert_eq!(average_score(&[]), 0.0);
        let avg = average_score(&three_ideas());
        assert!((avg - 46.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn time_windows_use_creation_date() {
        let services = vec![
            created(service(1, "A", [0; 5], ServiceStatus::Evaluation), 5),
            created(service(2, "A", [0; 5], ServiceStatus::Evaluation), 45),
            created(service(3, "A", [0; 5], ServiceStatus::Evaluation), 90),
            created(service(4, "A", [0; 5], ServiceStatus::Approved), 120),
            service(5, "A", [0; 5], ServiceStatus::Evaluation),
        ];
        assert_eq!(new_ideas_within(&services, now(), 30), 1);
        assert_eq!(new_ideas_within(&services, now(), 60), 2);
        assert_eq!(stagnant_ideas(&services, now(), 60), 1);
    }

    #[test]
    fn oversized_windows_do_not_overflow() {
        let services = vec![
            created(service(1, "A", [0; 5], ServiceStatus::Evaluation), 5),
            created(service(2, "A", [0; 5], ServiceStatus::Evaluation), 900),
            service(3, "A", [0; 5], ServiceStatus::Evaluation),
        ];
        assert_eq!(new_ideas_within(&services, now(), 1_000_000_000), 2);
        assert_eq!(new_ideas_within(&services, now(), i64::MAX), 2);
        assert_eq!(stagnant_ideas(&services, now(), 1_000_000_000), 0);

        let options = OverviewOptions {
            new_ideas_window_days: 1_000_000_000,
            stagnant_after_days: 1_000_000_000,
            ..Default::default()
        };
        let overview = build_overview(&services, clusters(), now(), &options);
        assert_eq!(overview.new_ideas, 2);
        assert_eq!(overview.stagnant_ideas, 0);
    }

    #[test]
    fn cluster_distribution_orders_by_count() {
        let dist = cluster_distribution(&three_ideas());
        assert_eq!(dist[0], LabelCount { label: "Mobilidade".into(), count: 2 });
        assert_eq!(dist[1], LabelCount { label: "Entretenimento".into(), count: 1 });
    }

    #[test]
    fn business_models_resolve_before_counting() {
        let mut services = three_ideas();
        services[0].business_model = "Aluguel".into();
        services[1].business_model = "Locação".into();
        services[2].business_model = "algo desconhecido".into();
        let dist = business_model_distribution(&services, &BusinessModelMapper::default());
        assert_eq!(dist[0], LabelCount { label: "Locação".into(), count: 2 });
        assert_eq!(dist[1], LabelCount { label: "Pacote de Serviço".into(), count: 1 });
    }

    #[test]
    fn averages_by_cluster() {
        let averages = average_score_by_cluster(&three_ideas());
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].cluster, "Mobilidade");
        assert_eq!(averages[0].ideas, 2);
        assert!((averages[0].average_score - 15.5).abs() < 1e-9);
        assert_eq!(averages[1].average_score, 15.0);
    }

    #[test]
    fn balance_covers_every_catalog_cluster() {
        let balance = portfolio_balance(&three_ideas(), clusters());
        assert_eq!(balance.len(), clusters().len());
        let mobility = balance.iter().find(|p| p.subject == "Mobilidade").unwrap();
        assert!((mobility.score - 15.5).abs() < 1e-9);
        let health = balance.iter().find(|p| p.subject == "Saúde & Bem-estar").unwrap();
        assert_eq!(health.score, 0.0);
        assert!(balance.iter().all(|p| p.full_mark == 25));
    }

    #[test]
    fn overview_is_idempotent() {
        let services = vec![
            created(service(1, "Mobilidade", [5, 4, 3, 2, 1], ServiceStatus::Approved), 3),
            created(service(2, "Energia", [1, 1, 1, 1, 1], ServiceStatus::Cancelled), 70),
            service(3, "Mobilidade", [5, 5, 5, 5, 5], ServiceStatus::Evaluation),
        ];
        let options = OverviewOptions::default();
        let first = build_overview(&services, clusters(), now(), &options);
        let second = build_overview(&services, clusters(), now(), &options);
        assert_eq!(first, second);
        assert_eq!(first.total_ideas, 3);
        assert_eq!(first.approval_rate, 50.0);
        assert_eq!(first.top_ideas[0].id, 3);
    }
}
