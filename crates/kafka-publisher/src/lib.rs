//! Kafka publisher for archive-loader.
//!
//! The pipeline talks to the broker only through the [`Publisher`] trait:
//! `publish` enqueues one header-annotated message without waiting for its
//! acknowledgment, and `flush` is the barrier that waits for everything
//! submitted so far.
//!
//! Implementations:
//!
//! - [`KafkaPublisher`]: rdkafka `FutureProducer` with in-flight delivery tracking
//! - [`DryRunPublisher`]: counts and logs messages without contacting a broker
//!
//! ## Usage
//!
//! ```rust,no_run
//! use archive_kafka_publisher::{KafkaPublisher, KafkaPublisherConfig, Publisher};
//! use archive_record::{decode, PublishEnvelope};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = KafkaPublisherConfig::new("localhost:9092", "seo-urls");
//!     let mut publisher = KafkaPublisher::new(&config)?;
//!
//!     let record = decode(br#"{"recordKey":"k","recordValue":"v","schemaName":"s","schemaVersion":"1"}"#)?;
//!     publisher.publish(&PublishEnvelope::new(&record)).await?;
//!     publisher.flush().await?;
//!     Ok(())
//! }
//! ```

mod dry_run;
mod error;
mod kafka;

pub use dry_run::DryRunPublisher;
pub use error::{PublishError, Result};
pub use kafka::{KafkaPublisher, KafkaPublisherConfig, DEFAULT_MESSAGE_TIMEOUT};

use archive_record::PublishEnvelope;

/// Broker-facing half of the pipeline.
///
/// Messages must reach the broker client in the order `publish` is called.
#[async_trait::async_trait]
pub trait Publisher: Send {
    /// Submit one message to the client's send queue.
    ///
    /// Returns once the message is queued, not once it is acknowledged. A
    /// terminal failure already observed for an earlier message may be
    /// reported here instead of at the next flush.
    async fn publish(&mut self, envelope: &PublishEnvelope<'_>) -> Result<()>;

    /// Block until every previously submitted message is acknowledged or has
    /// failed terminally. Returns the first failure.
    async fn flush(&mut self) -> Result<()>;
}
