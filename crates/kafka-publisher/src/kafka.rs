//! rdkafka-backed publisher.

use crate::error::{PublishError, Result};
use crate::Publisher;
use archive_record::PublishEnvelope;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use rdkafka::error::RDKafkaErrorCode;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{DeliveryFuture, FutureProducer, FutureRecord, Producer};
use rdkafka::ClientConfig;
use std::time::Duration;

/// Default `message.timeout.ms`: how long the client retries a message before
/// reporting it failed.
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on the blocking flush done when a publisher is dropped with
/// messages still in flight.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause before retrying an enqueue when the local queue is full and nothing
/// is in flight to wait on.
const QUEUE_FULL_BACKOFF: Duration = Duration::from_millis(10);

type DeliveryOutcome = <DeliveryFuture as std::future::Future>::Output;

/// Connection and routing settings for [`KafkaPublisher`].
#[derive(Debug, Clone)]
pub struct KafkaPublisherConfig {
    /// Bootstrap servers (host:port, comma-separated)
    pub brokers: String,
    pub topic: String,
    /// Explicit target partition. `None` leaves partitioning to the client.
    pub partition: Option<i32>,
    pub message_timeout: Duration,
    /// Extra librdkafka properties, applied after the defaults
    pub properties: Vec<(String, String)>,
}

impl KafkaPublisherConfig {
    pub fn new(brokers: &str, topic: &str) -> Self {
        Self {
            brokers: brokers.to_string(),
            topic: topic.to_string(),
            partition: None,
            message_timeout: DEFAULT_MESSAGE_TIMEOUT,
            properties: Vec::new(),
        }
    }

    /// Build the librdkafka client configuration.
    pub fn client_config(&self) -> Result<ClientConfig> {
        if self.brokers.trim().is_empty() {
            return Err(PublishError::InvalidConfig(
                "bootstrap servers must not be empty".to_string(),
            ));
        }
        if self.topic.trim().is_empty() {
            return Err(PublishError::InvalidConfig(
                "topic must not be empty".to_string(),
            ));
        }

        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("acks", "all")
            .set(
                "message.timeout.ms",
                self.message_timeout.as_millis().to_string(),
            )
            .set("queue.buffering.max.messages", "100000")
            .set("queue.buffering.max.kbytes", "1048576")
            .set("batch.size", "65536")
            .set("linger.ms", "5");
        for (key, value) in &self.properties {
            config.set(key, value);
        }
        Ok(config)
    }
}

/// Publishes envelopes to a single topic.
///
/// Every send returns a delivery future that is kept until it resolves.
/// Completed deliveries are reaped without blocking on each `publish`, and
/// `flush` awaits the rest.
pub struct KafkaPublisher {
    producer: FutureProducer,
    topic: String,
    partition: Option<i32>,
    in_flight: FuturesUnordered<DeliveryFuture>,
    acknowledged: u64,
}

impl KafkaPublisher {
    pub fn new(config: &KafkaPublisherConfig) -> Result<Self> {
        let producer: FutureProducer = config
            .client_config()?
            .create()
            .map_err(PublishError::Client)?;

        tracing::info!(
            "Created Kafka producer for {} (topic '{}', partition {})",
            config.brokers,
            config.topic,
            config
                .partition
                .map_or_else(|| "auto".to_string(), |p| p.to_string())
        );

        Ok(Self {
            producer,
            topic: config.topic.clone(),
            partition: config.partition,
            in_flight: FuturesUnordered::new(),
            acknowledged: 0,
        })
    }

    /// Messages submitted but not yet acknowledged or failed
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Messages the broker has acknowledged so far
    pub fn acknowledged(&self) -> u64 {
        self.acknowledged
    }

    fn reap_completed(&mut self) -> Result<()> {
        while let Some(Some(outcome)) = self.in_flight.next().now_or_never() {
            check_delivery(outcome)?;
            self.acknowledged += 1;
        }
        Ok(())
    }
}

fn message_headers(envelope: &PublishEnvelope<'_>) -> OwnedHeaders {
    envelope
        .headers()
        .into_iter()
        .fold(OwnedHeaders::new_with_capacity(3), |headers, (key, value)| {
            headers.insert(Header {
                key,
                value: Some(value),
            })
        })
}

fn check_delivery(outcome: DeliveryOutcome) -> Result<()> {
    match outcome {
        Ok(Ok(_)) => Ok(()),
        Ok(Err((err, _message))) => Err(PublishError::Delivery(err)),
        Err(_canceled) => Err(PublishError::Canceled),
    }
}

#[async_trait::async_trait]
impl Publisher for KafkaPublisher {
    async fn publish(&mut self, envelope: &PublishEnvelope<'_>) -> Result<()> {
        self.reap_completed()?;

        let mut record = FutureRecord::to(&self.topic)
            .key(envelope.key())
            .payload(envelope.value())
            .headers(message_headers(envelope));
        if let Some(partition) = self.partition {
            record = record.partition(partition);
        }

        loop {
            match self.producer.send_result(record) {
                Ok(delivery) => {
                    self.in_flight.push(delivery);
                    return Ok(());
                }
                Err((err, returned))
                    if err.rdkafka_error_code() == Some(RDKafkaErrorCode::QueueFull) =>
                {
                    record = returned;
                    tracing::debug!(
                        "Producer queue full with {} in flight, waiting for deliveries",
                        self.in_flight.len()
                    );
                    match self.in_flight.next().await {
                        Some(outcome) => {
                            check_delivery(outcome)?;
                            self.acknowledged += 1;
                        }
                        None => tokio::time::sleep(QUEUE_FULL_BACKOFF).await,
                    }
                }
                Err((err, _)) => return Err(PublishError::Enqueue(err)),
            }
        }
    }

    async fn flush(&mut self) -> Result<()> {
        let pending = self.in_flight.len();
        let mut first_failure = None;

        while let Some(outcome) = self.in_flight.next().await {
            match check_delivery(outcome) {
                Ok(()) => self.acknowledged += 1,
                Err(err) => {
                    tracing::error!("Delivery failed: {err}");
                    first_failure.get_or_insert(err);
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => {
                tracing::debug!(
                    "Flushed {pending} in-flight messages ({} acknowledged in total)",
                    self.acknowledged
                );
                Ok(())
            }
        }
    }
}

impl Drop for KafkaPublisher {
    fn drop(&mut self) {
        if self.in_flight.is_empty() {
            return;
        }
        tracing::debug!(
            "Closing producer with {} messages in flight",
            self.in_flight.len()
        );
        if let Err(err) = self.producer.flush(CLOSE_TIMEOUT) {
            tracing::warn!("Producer flush on close failed: {err}");
        }
    }
}
