//! REDP ETL - Main entry point

use clap::{Parser, Subcommand};
use redp_common::logging::{init_logging, LogConfig, LogLevel};
use std::process;
use tracing::{error, info};

use redp_etl::config::EtlConfig;
use redp_etl::event::ExtractEvent;
use redp_etl::pipeline::{CrimeRatePipeline, LoadTarget};
use redp_etl::storage::ObjectStore;
use redp_etl::warehouse::{create_pool, health_check, PgWarehouse};

#[derive(Parser, Debug)]
#[command(name = "redp-etl")]
#[command(author, version, about = "REDP crime-rate warehouse loader")]
struct Cli {
    #[command(subcommand)]
    target: Target,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Target {
    /// Load flattened rows straight into DIM_CRIME_RATE
    Dimension {
        /// Extract date selecting the source objects, e.g. 2024-01-15
        extract_date: String,
    },

    /// Resolve dimension keys and load FACT_CRIME_RATE
    Fact {
        /// Extract date selecting the source objects, e.g. 2024-01-15
        extract_date: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("redp-etl".to_string())
        .build();

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    if let Err(e) = init_logging(&log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(&cli).await {
        error!(error = %e, error_chain = ?e.chain().collect::<Vec<_>>(), "Invocation failed");
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let (extract_date, target) = match &cli.target {
        Target::Dimension { extract_date } => (extract_date, LoadTarget::Dimension),
        Target::Fact { extract_date } => (extract_date, LoadTarget::Fact),
    };

    info!("Starting REDP ETL");

    let config = EtlConfig::load()?;

    let store = ObjectStore::new(&config.storage);

    let pool = create_pool(&config.warehouse).await?;
    health_check(&pool).await?;

    let warehouse = PgWarehouse::new(pool);
    let pipeline = CrimeRatePipeline::new(store, warehouse, config.join.location_state.clone());

    let event = ExtractEvent::new(extract_date);
    let status = pipeline.run(&event, target).await?;

    info!(status_code = status.status_code, "Invocation complete");

    Ok(())
}
