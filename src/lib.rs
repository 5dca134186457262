//! Archive Loader Library
//!
//! Publishes the records stored in a gzip-compressed tar archive to a Kafka
//! topic, one message per archive entry, in stored order.
//!
//! Each regular entry holds a JSON document with `recordKey`, `recordValue`,
//! `schemaName` and `schemaVersion`. The key and value become the message key
//! and body, and every message carries three headers:
//!
//! - `JSON_SCHEMA_NAME` - the entry's `schemaName`
//! - `JSON_SCHEMA_VALUE` - the entry's `schemaVersion`
//! - `CORRELATION_ID` - a fresh UUID v4
//!
//! # Crates
//!
//! - `archive_source` - streaming `.tar.gz` entry reader
//! - `archive_record` - JSON entry decoding and publish envelopes
//! - `archive_kafka_publisher` - rdkafka producer behind the `Publisher` trait
//!
//! # CLI Usage
//!
//! ```bash
//! archive-loader --kafka-brokers localhost:9092 --topic seo-urls \
//!   --input /data/messages.tar.gz --number-of-messages 25000
//! ```

pub mod args;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod testing;

pub use args::LoadArgs;
pub use config::{LoaderConfig, MalformedEntryPolicy};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, RunCounters, RunFailure, RunState, RunSummary};
pub use progress::{LogProgress, ProgressListener};

pub use archive_kafka_publisher as publisher;
pub use archive_record as record;
pub use archive_source as source;
