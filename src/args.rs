//! CLI argument definitions.

use crate::config::{
    parse_duration, parse_property, LoaderConfig, MalformedEntryPolicy, DEFAULT_EXPECTED_MESSAGES,
    DEFAULT_PROGRESS_INTERVAL,
};
use crate::error::Error;
use archive_source::DEFAULT_MAX_ENTRY_SIZE;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for one archive load.
#[derive(Args, Clone, Debug)]
pub struct LoadArgs {
    /// Kafka bootstrap servers (host:port, comma-separated)
    #[arg(long, env = "KAFKA_BROKERS")]
    pub kafka_brokers: String,

    /// Topic to publish to
    #[arg(long, env = "KAFKA_TOPIC")]
    pub topic: String,

    /// Send every message to this partition instead of partitioning by key
    #[arg(long, value_parser = clap::value_parser!(i32).range(0..))]
    pub partition: Option<i32>,

    /// Expected number of messages (informational, reported against the final count)
    #[arg(long, default_value_t = DEFAULT_EXPECTED_MESSAGES)]
    pub number_of_messages: u64,

    /// Path to the .tar.gz archive to publish
    #[arg(long, short = 'i', env = "ARCHIVE_PATH")]
    pub input: PathBuf,

    /// Reject entries that declare more bytes than this
    #[arg(long, default_value_t = DEFAULT_MAX_ENTRY_SIZE)]
    pub max_entry_size: u64,

    /// What to do with entries that do not decode (abort the run or skip the entry)
    #[arg(long, value_enum, default_value = "abort")]
    pub on_malformed: MalformedEntryPolicy,

    /// Log progress every N published messages
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    pub progress_interval: u64,

    /// Wait for broker acknowledgments every N published messages (default: only at the end)
    #[arg(long)]
    pub flush_interval: Option<u64>,

    /// How long the producer retries a message before failing the run (e.g. "30s", "2m")
    #[arg(long, default_value = "30s", value_parser = parse_duration)]
    pub message_timeout: Duration,

    /// Extra librdkafka producer property (repeatable)
    #[arg(long = "producer-property", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub producer_properties: Vec<(String, String)>,

    /// Dry run mode - decode the archive but don't send anything
    #[arg(long)]
    pub dry_run: bool,
}

impl TryFrom<LoadArgs> for LoaderConfig {
    type Error = Error;

    fn try_from(args: LoadArgs) -> Result<Self, Self::Error> {
        let config = LoaderConfig {
            brokers: args.kafka_brokers,
            topic: args.topic,
            partition: args.partition,
            expected_messages: Some(args.number_of_messages),
            input_path: args.input,
            max_entry_size: args.max_entry_size,
            on_malformed: args.on_malformed,
            progress_interval: args.progress_interval,
            flush_interval: args.flush_interval,
            message_timeout: args.message_timeout,
            producer_properties: args.producer_properties,
            dry_run: args.dry_run,
        };
        config.validate()?;
        Ok(config)
    }
}
