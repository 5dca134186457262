//! Command-line interface for archive-loader
//!
//! # Usage Examples
//!
//! ```bash
//! # Publish every record of an archive
//! archive-loader \
//!   --kafka-brokers localhost:9092 \
//!   --topic seo-urls \
//!   --input /data/messages.tar.gz \
//!   --number-of-messages 25000
//!
//! # Pin all messages to one partition and skip entries that do not decode
//! archive-loader \
//!   --kafka-brokers kafka-1:9092,kafka-2:9092 \
//!   --topic seo-urls --partition 0 \
//!   --input /data/messages.tar.gz \
//!   --on-malformed skip
//!
//! # Decode the archive without sending anything
//! archive-loader --kafka-brokers localhost:9092 --topic seo-urls \
//!   --input /data/messages.tar.gz --dry-run
//! ```
//!
//! Exits with status 0 when the run reaches the done state and 1 otherwise.

use anyhow::Context;
use archive_kafka_publisher::{DryRunPublisher, KafkaPublisher};
use archive_loader::{LoadArgs, LoaderConfig, Pipeline, RunSummary};
use clap::Parser;

#[derive(Parser)]
#[command(name = "archive-loader")]
#[command(about = "Publish the JSON records of a .tar.gz archive to a Kafka topic")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    args: LoadArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!(
        "Starting archive-loader {} ({} {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    );

    let config = LoaderConfig::try_from(cli.args).context("Invalid configuration")?;

    let summary = if config.dry_run {
        Pipeline::new(config, DryRunPublisher::new()).run().await?
    } else {
        let publisher = KafkaPublisher::new(&config.publisher_config())
            .with_context(|| format!("Failed to create Kafka producer for {}", config.brokers))?;
        Pipeline::new(config, publisher).run().await?
    };

    report(&summary);
    Ok(())
}

fn report(summary: &RunSummary) {
    let counters = &summary.counters;
    tracing::info!(
        "Run {} at {}: {} records published, {} skipped, started {}",
        summary.state,
        counters
            .finished_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_default(),
        counters.records_published,
        counters.records_skipped,
        counters.started_at.to_rfc3339()
    );
}
