//! Immutable run configuration.
//!
//! [`LoaderConfig`] is built once at startup (usually from [`crate::LoadArgs`])
//! and moved into the pipeline. Nothing reads configuration from anywhere else.

mod duration;

pub use duration::parse_duration;

use crate::error::{Error, Result};
use anyhow::Context;
use archive_kafka_publisher::{KafkaPublisherConfig, DEFAULT_MESSAGE_TIMEOUT};
use archive_source::{ReaderOptions, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_ENTRY_SIZE};
use std::path::PathBuf;
use std::time::Duration;

/// Published records between two progress notifications.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

/// Message count the CLI expects when `--number-of-messages` is not given.
pub const DEFAULT_EXPECTED_MESSAGES: u64 = 125_826;

/// What to do with an entry that does not decode into a record.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MalformedEntryPolicy {
    /// Fail the whole run on the first malformed entry
    #[default]
    Abort,
    /// Log the entry, count it as skipped and continue
    Skip,
}

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Kafka bootstrap servers
    pub brokers: String,
    pub topic: String,
    /// Explicit target partition; `None` lets the client partition by key
    pub partition: Option<i32>,
    /// Informational only: compared with the final count, never a cap
    pub expected_messages: Option<u64>,
    /// Path of the `.tar.gz` input
    pub input_path: PathBuf,
    pub max_entry_size: u64,
    pub on_malformed: MalformedEntryPolicy,
    pub progress_interval: u64,
    /// Issue a flush barrier every N published records
    pub flush_interval: Option<u64>,
    pub message_timeout: Duration,
    pub producer_properties: Vec<(String, String)>,
    /// Decode everything but send nothing
    pub dry_run: bool,
}

impl LoaderConfig {
    /// Create a configuration with defaults for everything but the required values
    pub fn new(brokers: &str, topic: &str, input_path: impl Into<PathBuf>) -> Self {
        Self {
            brokers: brokers.to_string(),
            topic: topic.to_string(),
            partition: None,
            expected_messages: None,
            input_path: input_path.into(),
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
            on_malformed: MalformedEntryPolicy::Abort,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            flush_interval: None,
            message_timeout: DEFAULT_MESSAGE_TIMEOUT,
            producer_properties: Vec::new(),
            dry_run: false,
        }
    }

    /// Check the required parameters before any I/O happens.
    pub fn validate(&self) -> Result<()> {
        if self.brokers.trim().is_empty() {
            return Err(Error::Configuration(
                "Kafka bootstrap servers are required".to_string(),
            ));
        }
        if self.topic.trim().is_empty() {
            return Err(Error::Configuration("Topic name is required".to_string()));
        }
        if self.input_path.as_os_str().is_empty() {
            return Err(Error::Configuration(
                "Input archive path is required".to_string(),
            ));
        }
        if let Some(partition) = self.partition.filter(|p| *p < 0) {
            return Err(Error::Configuration(format!(
                "Partition must not be negative, got {partition}"
            )));
        }
        if self.max_entry_size == 0 {
            return Err(Error::Configuration(
                "Maximum entry size must be positive".to_string(),
            ));
        }
        if self.progress_interval == 0 {
            return Err(Error::Configuration(
                "Progress interval must be positive".to_string(),
            ));
        }
        if self.flush_interval == Some(0) {
            return Err(Error::Configuration(
                "Flush interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_entry_size: self.max_entry_size,
        }
    }

    pub fn publisher_config(&self) -> KafkaPublisherConfig {
        KafkaPublisherConfig {
            brokers: self.brokers.clone(),
            topic: self.topic.clone(),
            partition: self.partition,
            message_timeout: self.message_timeout,
            properties: self.producer_properties.clone(),
        }
    }

    pub fn log_configuration(&self) {
        tracing::info!("- Using Kafka Bootstrap Servers: {}", self.brokers);
        tracing::info!("- Using topic name: {}", self.topic);
        match self.partition {
            Some(partition) => tracing::info!("- Using partition: {partition}"),
            None => tracing::info!("- Using partition: assigned by producer"),
        }
        if let Some(expected) = self.expected_messages {
            tracing::info!("- Expecting numberOfMessages: {expected}");
        }
        tracing::info!("- Using input archive: {}", self.input_path.display());
        tracing::info!(
            "- Using max entry size: {} bytes, malformed entries: {:?}",
            self.max_entry_size,
            self.on_malformed
        );
        if self.dry_run {
            tracing::info!("Running in dry-run mode - no messages will be sent");
        }
    }
}

/// Parse a `key=value` producer property.
pub fn parse_property(s: &str) -> anyhow::Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Property key must not be empty in '{s}'");
    }
    Ok((key.to_string(), value.trim().to_string()))
}
