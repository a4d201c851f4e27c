//! Domain model and configuration shared by the Barfer reporting engine and CLI.
//!
//! Nothing in here resolves or aggregates anything; see `barfer-engine` for that.

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod orders;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, GroupBy, PeriodGranularity};
pub use catalog::{load_catalog, CanonicalProduct, CatalogFile, Section};
pub use config::{load_app_config, load_app_config_from_env};
pub use orders::{load_orders, Channel, Order, OrderContext, RawLineItem};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogParse(#[from] serde_yaml::Error),

    #[error("failed to parse orders file: {0}")]
    OrdersParse(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
