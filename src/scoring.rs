use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PortfolioError;
use crate::helpers::fold_key;
use crate::types::{Scores, CRITERIA_COUNT, MAX_CRITERION_SCORE};

/// Highest reachable total: five criteria at five points each.
pub const MAX_TOTAL_SCORE: u8 = CRITERIA_COUNT as u8 * MAX_CRITERION_SCORE;

const VERY_HIGH_THRESHOLD: u8 = 21;
const HIGH_THRESHOLD: u8 = 16;
const MEDIUM_THRESHOLD: u8 = 11;

/// Priority bucket derived from the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "Altíssima")]
    VeryHigh,
    #[serde(rename = "Alta")]
    High,
    #[serde(rename = "Média")]
    Medium,
    #[serde(rename = "Baixa")]
    Low,
}

impl Tier {
    /// Highest priority first.
    pub const ALL: [Tier; 4] = [Tier::VeryHigh, Tier::High, Tier::Medium, Tier::Low];

    pub fn label(&self) -> &'static str {
        match self {
            Tier::VeryHigh => "Altíssima",
            Tier::High => "Alta",
            Tier::Medium => "Média",
            Tier::Low => "Baixa",
        }
    }

    /// Inclusive lower bound of the tier's score range.
    pub fn min_score(&self) -> u8 {
        match self {
            Tier::VeryHigh => VERY_HIGH_THRESHOLD,
            Tier::High => HIGH_THRESHOLD,
            Tier::Medium => MEDIUM_THRESHOLD,
            Tier::Low => 0,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Tier {
    type Err = PortfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_key(s).as_str() {
            "altissima" | "very-high" | "veryhigh" => Ok(Tier::VeryHigh),
            "alta" | "high" => Ok(Tier::High),
            "media" | "medium" => Ok(Tier::Medium),
            "baixa" | "low" => Ok(Tier::Low),
            _ => Err(PortfolioError::Validation(format!(
                "unknown classification '{}'",
                s
            ))),
        }
    }
}

/// Sum of the five criterion scores, in `0..=25`.
pub fn total_score(scores: &Scores) -> u8 {
    scores.iter().sum()
}

/// Map a total score to its priority tier. Thresholds are inclusive lower
/// bounds: 21+ Altíssima, 16+ Alta, 11+ Média, otherwise Baixa.
pub fn classify(total: u8) -> Tier {
    if total >= VERY_HIGH_THRESHOLD {
        Tier::VeryHigh
    } else if total >= HIGH_THRESHOLD {
        Tier::High
    } else if total >= MEDIUM_THRESHOLD {
        Tier::Medium
    } else {
        Tier::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_switch_tiers() {
        let cases = [
            (0, Tier::Low),
            (10, Tier::Low),
            (11, Tier::Medium),
            (15, Tier::Medium),
            (16, Tier::High),
            (20, Tier::High),
            (21, Tier::VeryHigh),
            (25, Tier::VeryHigh),
        ];
        for (total, expected) in cases {
            assert_eq!(classify(total), expected, "total {}", total);
        }
    }

    #[test]
    fn tiers_partition_the_score_range() {
        for total in 0..=MAX_TOTAL_SCORE {
            let tier = classify(total);
            let matching: Vec<Tier> = Tier::ALL
                .iter()
                .copied()
                .filter(|t| {
                    let next_floor = Tier::ALL
                        .iter()
                        .filter(|o| o.min_score() > t.min_score())
                        .map(|o| o.min_score())
                        .min()
                        .unwrap_or(MAX_TOTAL_SCORE + 1);
                    total >= t.min_score() && total < next_floor
                })
                .collect();
            assert_eq!(matching, vec![tier], "total {}", total);
        }
    }

    #[test]
    fn total_is_the_arithmetic_sum() {
        for a in 0..=5 {
            for b in 0..=5 {
                let scores = Scores::new([a, b, 5, 0, 3]);
                let total = total_score(&scores);
                assert_eq!(total as i64, a + b + 8);
                assert!(total <= MAX_TOTAL_SCORE);
            }
        }
        assert_eq!(total_score(&Scores::new([5; 5])), 25);
        assert_eq!(total_score(&Scores::default()), 0);
    }

    #[test]
    fn parses_tier_labels() {
        assert_eq!("Altíssima".parse::<Tier>().unwrap(), Tier::VeryHigh);
        assert_eq!("media".parse::<Tier>().unwrap(), Tier::Medium);
        assert!("urgent".parse::<Tier>().is_err());
    }

    #[test]
    fn tier_serializes_as_label() {
        assert_eq!(serde_json::to_string(&Tier::Medium).unwrap(), "\"Média\"");
    }
}
