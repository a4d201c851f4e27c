mod render;
mod report;
mod resolve;

use std::path::PathBuf;

use barfer_core::{GroupBy, PeriodGranularity};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "barfer")]
#[command(about = "Barfer order resolution and weight/revenue reporting")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Aggregate an order export into report buckets
    Report {
        /// Order export file (JSON array of orders)
        #[arg(long)]
        orders: PathBuf,
        /// Catalog file; defaults to `BARFER_CATALOG_PATH`
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Time bucket: day, week or month
        #[arg(long)]
        period: Option<PeriodGranularity>,
        /// Bucket by classified category or by matched product
        #[arg(long)]
        group_by: Option<GroupBy>,
        /// Split buckets per point of sale
        #[arg(long)]
        by_point_of_sale: bool,
        /// Leave items unresolved instead of matching them flexibly
        #[arg(long)]
        no_fallback: bool,
        /// Partitions aggregated concurrently
        #[arg(long)]
        workers: Option<usize>,
        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Trace a single product/option pair through every resolution stage
    Resolve {
        /// Product label as typed on the order
        #[arg(long)]
        product: String,
        /// Option label as selected on the order
        #[arg(long, default_value = "")]
        option: String,
        /// Catalog file; defaults to `BARFER_CATALOG_PATH`
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Leave items unresolved instead of matching them flexibly
        #[arg(long)]
        no_fallback: bool,
    },
    /// Catalog maintenance
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
}

#[derive(Debug, Subcommand)]
enum CatalogCommands {
    /// Validate the catalog file and summarize it per section
    Check {
        /// Catalog file; defaults to `BARFER_CATALOG_PATH`
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = barfer_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Report {
            orders,
            catalog,
            period,
            group_by,
            by_point_of_sale,
            no_fallback,
            workers,
            json,
        }) => {
            let args = report::ReportArgs {
                orders,
                catalog,
                period,
                group_by,
                by_point_of_sale,
                no_fallback,
                workers,
                json,
            };
            report::run_report(&config, &args).await?;
        }
        Some(Commands::Resolve {
            product,
            option,
            catalog,
            no_fallback,
        }) => {
            resolve::run_resolve(&config, &product, &option, catalog.as_deref(), no_fallback)?;
        }
        Some(Commands::Catalog {
            command: CatalogCommands::Check { catalog },
        }) => {
            resolve::run_catalog_check(&config, catalog.as_deref())?;
        }
        None => println!("no command given; run `barfer --help` for usage"),
    }

    Ok(())
}
