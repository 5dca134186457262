//! Error types for the publisher.

use rdkafka::error::KafkaError;
use thiserror::Error;

/// Terminal publish failures.
///
/// Transient broker errors are retried inside the client and never show up
/// here.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to create Kafka producer: {0}")]
    Client(#[source] KafkaError),

    #[error("Failed to enqueue message: {0}")]
    Enqueue(#[source] KafkaError),

    #[error("Message delivery failed: {0}")]
    Delivery(#[source] KafkaError),

    #[error("Delivery canceled before the broker acknowledged the message")]
    Canceled,

    #[error("Invalid producer configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for publish operations.
pub type Result<T> = std::result::Result<T, PublishError>;
