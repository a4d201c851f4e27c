use std::str::FromStr;

use crate::app_config::{AppConfig, Environment, GroupBy, PeriodGranularity};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so only malformed values fail.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let env = parse_environment(&or_default("BARFER_ENV", "development"))?;
    let log_level = or_default("BARFER_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default(
        "BARFER_CATALOG_PATH",
        "./config/catalog.yaml",
    ));

    let report_period = PeriodGranularity::from_str(&or_default("BARFER_REPORT_PERIOD", "month"))
        .map_err(|reason| invalid("BARFER_REPORT_PERIOD", reason))?;
    let report_group_by = GroupBy::from_str(&or_default("BARFER_REPORT_GROUP_BY", "category"))
        .map_err(|reason| invalid("BARFER_REPORT_GROUP_BY", reason))?;

    let report_by_point_of_sale =
        parse_bool(&or_default("BARFER_REPORT_BY_POINT_OF_SALE", "false"))
            .map_err(|reason| invalid("BARFER_REPORT_BY_POINT_OF_SALE", reason))?;
    let match_flexible_fallback =
        parse_bool(&or_default("BARFER_MATCH_FLEXIBLE_FALLBACK", "true"))
            .map_err(|reason| invalid("BARFER_MATCH_FLEXIBLE_FALLBACK", reason))?;

    let report_workers = or_default("BARFER_REPORT_WORKERS", "1")
        .parse::<usize>()
        .map_err(|e| invalid("BARFER_REPORT_WORKERS", e.to_string()))?;
    if report_workers == 0 {
        return Err(invalid(
            "BARFER_REPORT_WORKERS",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        log_level,
        catalog_path,
        report_period,
        report_group_by,
        report_by_point_of_sale,
        match_flexible_fallback,
        report_workers,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BARFER_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got '{other}'")),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
