//! `report` command: load inputs, aggregate per partition, print.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use barfer_core::{AppConfig, CanonicalProduct, GroupBy, Order, PeriodGranularity};
use barfer_engine::{
    partition_by_period, run_batch, AggregationReport, EngineError, EngineOptions,
};
use futures::stream::{self, StreamExt};

/// Parsed `report` arguments. `None` and `false` fall back to the app config.
#[derive(Debug, Clone)]
pub(crate) struct ReportArgs {
    pub orders: PathBuf,
    pub catalog: Option<PathBuf>,
    pub period: Option<PeriodGranularity>,
    pub group_by: Option<GroupBy>,
    pub by_point_of_sale: bool,
    pub no_fallback: bool,
    pub workers: Option<usize>,
    pub json: bool,
}

/// Config-derived engine options with the command-line overrides applied.
pub(crate) fn engine_options(config: &AppConfig, args: &ReportArgs) -> EngineOptions {
    let mut options = EngineOptions::from_config(config);
    if let Some(period) = args.period {
        options.aggregation.granularity = period;
    }
    if let Some(group_by) = args.group_by {
        options.aggregation.group_by = group_by;
    }
    if args.by_point_of_sale {
        options.aggregation.by_point_of_sale = true;
    }
    if args.no_fallback {
        options.matcher.flexible_fallback = false;
    }
    options
}

/// Build and print a report for an order export.
///
/// # Errors
///
/// Returns an error if the catalog or order file cannot be loaded, or if an
/// aggregation worker fails.
pub(crate) async fn run_report(config: &AppConfig, args: &ReportArgs) -> anyhow::Result<()> {
    let catalog_path = args
        .catalog
        .clone()
        .unwrap_or_else(|| config.catalog_path.clone());
    let catalog = barfer_core::load_catalog(&catalog_path)
        .with_context(|| format!("loading catalog from {}", catalog_path.display()))?;
    let orders = barfer_core::load_orders(&args.orders)
        .with_context(|| format!("loading orders from {}", args.orders.display()))?;

    let options = engine_options(config, args);
    let workers = args.workers.unwrap_or(config.report_workers).max(1);
    tracing::info!(
        orders = orders.len(),
        catalog_entries = catalog.products.len(),
        period = %options.aggregation.granularity,
        group_by = %options.aggregation.group_by,
        workers,
        "building report"
    );

    let report = aggregate_partitioned(orders, catalog.products, options, workers).await?;

    if args.json {
        println!("{}", crate::render::render_json(&report)?);
    } else {
        print!("{}", crate::render::render_table(&report));
    }
    Ok(())
}

/// Aggregates period partitions on blocking worker tasks and merges the
/// partial reports.
///
/// # Errors
///
/// Returns an error if the catalog is empty or a worker task panics.
pub(crate) async fn aggregate_partitioned(
    orders: Vec<Order>,
    catalog: Vec<CanonicalProduct>,
    options: EngineOptions,
    workers: usize,
) -> anyhow::Result<AggregationReport> {
    if catalog.is_empty() {
        return Err(EngineError::EmptyCatalog.into());
    }

    let catalog = Arc::new(catalog);
    let partitions = partition_by_period(orders, options.aggregation.granularity, workers);
    let partition_count = partitions.len();

    let results: Vec<_> = stream::iter(partitions)
        .map(move |partition| {
            let catalog = Arc::clone(&catalog);
            tokio::task::spawn_blocking(move || run_batch(&partition, &catalog, &options))
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await;

    let mut report = AggregationReport::new(options.aggregation);
    for result in results {
        let partial = result.context("aggregation worker panicked")??;
        report.merge(partial);
    }

    tracing::debug!(partitions = partition_count, "partial reports merged");
    Ok(report)
}
