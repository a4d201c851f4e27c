use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "BARFER_ENV"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should load");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(
        cfg.catalog_path,
        std::path::PathBuf::from("./config/catalog.yaml")
    );
    assert_eq!(cfg.report_period, PeriodGranularity::Month);
    assert_eq!(cfg.report_group_by, GroupBy::Category);
    assert!(!cfg.report_by_point_of_sale);
    assert!(cfg.match_flexible_fallback);
    assert_eq!(cfg.report_workers, 1);
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("BARFER_ENV", "production");
    map.insert("BARFER_LOG_LEVEL", "debug");
    map.insert("BARFER_CATALOG_PATH", "/srv/barfer/catalog.yaml");
    map.insert("BARFER_REPORT_PERIOD", "week");
    map.insert("BARFER_REPORT_GROUP_BY", "product");
    map.insert("BARFER_REPORT_BY_POINT_OF_SALE", "yes");
    map.insert("BARFER_MATCH_FLEXIBLE_FALLBACK", "false");
    map.insert("BARFER_REPORT_WORKERS", "4");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.log_level, "debug");
    assert_eq!(
        cfg.catalog_path,
        std::path::PathBuf::from("/srv/barfer/catalog.yaml")
    );
    assert_eq!(cfg.report_period, PeriodGranularity::Week);
    assert_eq!(cfg.report_group_by, GroupBy::Product);
    assert!(cfg.report_by_point_of_sale);
    assert!(!cfg.match_flexible_fallback);
    assert_eq!(cfg.report_workers, 4);
}

#[test]
fn build_app_config_rejects_unknown_period() {
    let mut map = HashMap::new();
    map.insert("BARFER_REPORT_PERIOD", "fortnight");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BARFER_REPORT_PERIOD"),
        "expected InvalidEnvVar(BARFER_REPORT_PERIOD), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_unknown_group_by() {
    let mut map = HashMap::new();
    map.insert("BARFER_REPORT_GROUP_BY", "brand");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BARFER_REPORT_GROUP_BY"),
        "expected InvalidEnvVar(BARFER_REPORT_GROUP_BY), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_boolean_fallback() {
    let mut map = HashMap::new();
    map.insert("BARFER_MATCH_FLEXIBLE_FALLBACK", "sometimes");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BARFER_MATCH_FLEXIBLE_FALLBACK"),
        "expected InvalidEnvVar(BARFER_MATCH_FLEXIBLE_FALLBACK), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_workers() {
    let mut map = HashMap::new();
    map.insert("BARFER_REPORT_WORKERS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BARFER_REPORT_WORKERS"),
        "expected InvalidEnvVar(BARFER_REPORT_WORKERS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_numeric_workers() {
    let mut map = HashMap::new();
    map.insert("BARFER_REPORT_WORKERS", "many");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BARFER_REPORT_WORKERS"
    ));
}

#[test]
fn period_granularity_accepts_adjective_forms() {
    assert_eq!(
        "Monthly".parse::<PeriodGranularity>().unwrap(),
        PeriodGranularity::Month
    );
    assert_eq!(
        "daily".parse::<PeriodGranularity>().unwrap(),
        PeriodGranularity::Day
    );
}
