use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PortfolioError;
use crate::helpers::fold_key;

/// Number of scoring criteria every idea is rated on.
pub const CRITERIA_COUNT: usize = 5;

/// Highest score a single criterion can take.
pub const MAX_CRITERION_SCORE: u8 = 5;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle stage of an idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ServiceStatus {
    #[default]
    Evaluation,
    Approved,
    Cancelled,
    Finished,
}

impl ServiceStatus {
    pub const ALL: [ServiceStatus; 4] = [
        ServiceStatus::Evaluation,
        ServiceStatus::Approved,
        ServiceStatus::Cancelled,
        ServiceStatus::Finished,
    ];

    /// Wire value stored in the spreadsheet.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Evaluation => "avaliação",
            ServiceStatus::Approved => "aprovada",
            ServiceStatus::Cancelled => "cancelada",
            ServiceStatus::Finished => "finalizada",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceStatus::Evaluation => "Avaliação",
            ServiceStatus::Approved => "Aprovada",
            ServiceStatus::Cancelled => "Cancelada",
            ServiceStatus::Finished => "Finalizada",
        }
    }

    /// Approved, cancelled and finished ideas have left evaluation.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ServiceStatus::Evaluation)
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ServiceStatus {
    type Err = PortfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_key(s).as_str() {
            "avaliacao" | "evaluation" => Ok(ServiceStatus::Evaluation),
            "aprovada" | "approved" => Ok(ServiceStatus::Approved),
            "cancelada" | "cancelled" => Ok(ServiceStatus::Cancelled),
            "finalizada" | "finished" => Ok(ServiceStatus::Finished),
            _ => Err(PortfolioError::Validation(format!("unknown status '{}'", s))),
        }
    }
}

impl Serialize for ServiceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Missing, empty, or unrecognized values are treated as `avaliação`.
impl<'de> Deserialize<'de> for ServiceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        if raw.trim().is_empty() {
            return Ok(ServiceStatus::Evaluation);
        }
        Ok(raw.parse().unwrap_or_else(|_| {
            log::warn!("Unknown service status '{}', treating as avaliação", raw);
            ServiceStatus::Evaluation
        }))
    }
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// Per-criterion scores, always exactly [`CRITERIA_COUNT`] entries in `0..=5`.
///
/// Out-of-range values are clamped on every write path, including
/// deserialization. Missing trailing entries read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Scores([u8; CRITERIA_COUNT]);

impl Scores {
    pub fn new(values: [i64; CRITERIA_COUNT]) -> Self {
        Self::from_slice(&values)
    }

    /// Build from a possibly short or long slice; missing entries are zero,
    /// extra entries are ignored.
    pub fn from_slice(values: &[i64]) -> Self {
        let mut scores = Scores::default();
        for (index, value) in values.iter().take(CRITERIA_COUNT).enumerate() {
            scores.0[index] = clamp_score(*value);
        }
        scores
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.0.get(index).copied()
    }

    /// Clamp `value` into `0..=5` and store it at `index`.
    pub fn set(&mut self, index: usize, value: i64) -> Result<u8, PortfolioError> {
        let slot = self.0.get_mut(index).ok_or_else(|| {
            PortfolioError::Validation(format!(
                "criterion index {} out of range (0..{})",
                index, CRITERIA_COUNT
            ))
        })?;
        *slot = clamp_score(value);
        Ok(*slot)
    }

    pub fn as_array(&self) -> [u8; CRITERIA_COUNT] {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

pub fn clamp_score(value: i64) -> u8 {
    value.clamp(0, MAX_CRITERION_SCORE as i64) as u8
}

impl Serialize for Scores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Scores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
        let values: Vec<i64> = raw.iter().map(|v| loose_number(v).round() as i64).collect();
        Ok(Scores::from_slice(&values))
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// A service idea as stored by the spreadsheet backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i64,
    pub service: String,
    #[serde(default)]
    pub need: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub business_model: String,
    #[serde(default)]
    pub status: ServiceStatus,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub creator_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scores: Scores,
    #[serde(default, deserialize_with = "deserialize_revenue")]
    pub revenue_estimate: f64,
}

impl Service {
    /// Sum of the five criterion scores.
    pub fn total(&self) -> u8 {
        crate::scoring::total_score(&self.scores)
    }

    pub fn tier(&self) -> crate::scoring::Tier {
        crate::scoring::classify(self.total())
    }
}

/// Clamp a revenue estimate to a finite, non-negative amount.
pub fn clamp_revenue(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Fields supplied when registering a new idea. The backend assigns the id,
/// the creation date, zeroed scores and a zero revenue estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub service: String,
    pub need: String,
    pub target_audience: String,
    pub cluster: String,
    pub business_model: String,
    #[serde(default)]
    pub status: ServiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Binary permission flag: viewers ("Leitor") read, everyone else edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    Viewer,
    #[default]
    Editor,
}

impl Role {
    pub fn can_edit(&self) -> bool {
        matches!(self, Role::Editor)
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            Role::Viewer => "Leitor",
            Role::Editor => "Editor",
        })
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(if fold_key(&raw) == "leitor" {
            Role::Viewer
        } else {
            Role::Editor
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// Result of a successful login or registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Lenient field decoding (spreadsheet cells arrive as numbers, strings, or blanks)
// ---------------------------------------------------------------------------

fn loose_number(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        serde_json::Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

fn deserialize_revenue<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(clamp_revenue(loose_number(&raw)))
}

fn deserialize_optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(match raw {
        serde_json::Value::String(s) => parse_timestamp(&s),
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    })
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
