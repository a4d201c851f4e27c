use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Width of the time bucket an order is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodGranularity {
    Day,
    /// ISO week, Monday start.
    Week,
    Month,
}

impl FromStr for PeriodGranularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            other => Err(format!(
                "unknown period '{other}'; expected day, week or month"
            )),
        }
    }
}

impl std::fmt::Display for PeriodGranularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodGranularity::Day => write!(f, "day"),
            PeriodGranularity::Week => write!(f, "week"),
            PeriodGranularity::Month => write!(f, "month"),
        }
    }
}

/// What a report bucket's category key is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// Classified subcategory (balance sheet granularity).
    Category,
    /// Matched canonical product (stock sheet granularity).
    Product,
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "category" => Ok(Self::Category),
            "product" => Ok(Self::Product),
            other => Err(format!(
                "unknown grouping '{other}'; expected category or product"
            )),
        }
    }
}

impl std::fmt::Display for GroupBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupBy::Category => write!(f, "category"),
            GroupBy::Product => write!(f, "product"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub catalog_path: PathBuf,
    pub report_period: PeriodGranularity,
    pub report_group_by: GroupBy,
    pub report_by_point_of_sale: bool,
    /// Whether the matcher may fall through to its weight-agnostic last tier.
    pub match_flexible_fallback: bool,
    pub report_workers: usize,
}
