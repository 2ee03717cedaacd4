//! Placeholder spending forecast.
//!
//! Nothing here looks at transaction history: the amount is a random base
//! spend scaled by the timeframe, and the confidence is a constant.

use std::fmt;
use std::str::FromStr;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const FORECAST_CONFIDENCE: f64 = 0.82;
pub const MIN_BASE_SPEND: u64 = 2000;
pub const MAX_BASE_SPEND: u64 = 10000;

pub const FORECAST_FACTORS: [&str; 3] = [
    "Historical spending patterns",
    "Average daily expenditure",
    "Recent transaction variance",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Week,
    #[default]
    Month,
    Quarter,
}

impl Timeframe {
    /// How many weekly base spends the timeframe covers.
    pub fn multiplier(self) -> u64 {
        match self {
            Timeframe::Week => 1,
            Timeframe::Month => 4,
            Timeframe::Quarter => 12,
        }
    }

    /// Like [`FromStr`], but anything unrecognized is treated as a month.
    /// Matching is exact: `"Quarter"` and `" week "` are unrecognized.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or(Timeframe::Month)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::Week => "week",
            Timeframe::Month => "month",
            Timeframe::Quarter => "quarter",
        }
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Timeframe::Week),
            "month" => Ok(Timeframe::Month),
            "quarter" => Ok(Timeframe::Quarter),
            other => Err(format!("unknown timeframe '{}'", other)),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub timeframe: Timeframe,
    /// The random weekly spend the amount was scaled from.
    pub base_spend: u64,
    pub predicted_amount: u64,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub factors: Vec<String>,
}

/// Draws a synthetic forecast. `rng` is injected so callers can seed it.
pub fn forecast<R: Rng>(timeframe: Timeframe, rng: &mut R) -> Forecast {
    let base_spend = rng.random_range(MIN_BASE_SPEND..=MAX_BASE_SPEND);
    let risk_level = *RiskLevel::ALL.choose(rng).unwrap_or(&RiskLevel::Medium);

    Forecast {
        timeframe,
        base_spend,
        predicted_amount: base_spend * timeframe.multiplier(),
        confidence: FORECAST_CONFIDENCE,
        risk_level,
        factors: FORECAST_FACTORS.iter().map(|f| f.to_string()).collect(),
    }
}
