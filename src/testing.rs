//! Test support: an in-memory publisher, a recording progress listener and
//! `.tar.gz` fixture builders.

use crate::progress::ProgressListener;
use archive_kafka_publisher::{PublishError, Publisher, Result as PublishResult};
use archive_record::PublishEnvelope;
use flate2::write::GzEncoder;
use flate2::Compression;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use std::fs::File;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// One message as a broker would have received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedMessage {
    pub key: String,
    pub value: String,
    pub headers: Vec<(String, String)>,
}

impl CapturedMessage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Default)]
struct CaptureState {
    messages: Vec<CapturedMessage>,
    publish_calls: u64,
    flushes: u64,
}

/// Publisher that keeps every message in memory.
///
/// Clones share the same capture, so a test can hand one clone to a
/// [`crate::Pipeline`] and inspect the other after the run.
#[derive(Debug, Clone, Default)]
pub struct CapturingPublisher {
    state: Arc<Mutex<CaptureState>>,
    fail_after: Option<u64>,
    fail_on_flush: bool,
}

impl CapturingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the first `accepted` messages, then report a delivery failure
    /// for every further publish.
    pub fn failing_after(accepted: u64) -> Self {
        Self {
            fail_after: Some(accepted),
            ..Self::default()
        }
    }

    /// Accept every message but fail each flush.
    pub fn failing_on_flush() -> Self {
        Self {
            fail_on_flush: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<CapturedMessage> {
        self.state().messages.clone()
    }

    pub fn publish_calls(&self) -> u64 {
        self.state().publish_calls
    }

    pub fn flushes(&self) -> u64 {
        self.state().flushes
    }

    fn state(&self) -> MutexGuard<'_, CaptureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn delivery_timeout() -> PublishError {
    PublishError::Delivery(KafkaError::MessageProduction(
        RDKafkaErrorCode::MessageTimedOut,
    ))
}

#[async_trait::async_trait]
impl Publisher for CapturingPublisher {
    async fn publish(&mut self, envelope: &PublishEnvelope<'_>) -> PublishResult<()> {
        let mut state = self.state();
        state.publish_calls += 1;
        if let Some(accepted) = self.fail_after {
            if state.messages.len() as u64 >= accepted {
                return Err(delivery_timeout());
            }
        }
        state.messages.push(CapturedMessage {
            key: envelope.key().to_string(),
            value: envelope.value().to_string(),
            headers: envelope
                .headers()
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        });
        Ok(())
    }

    async fn flush(&mut self) -> PublishResult<()> {
        self.state().flushes += 1;
        if self.fail_on_flush {
            return Err(delivery_timeout());
        }
        Ok(())
    }
}

/// Progress listener that records the published count of every notification.
#[derive(Debug, Clone, Default)]
pub struct RecordingProgress {
    notifications: Arc<Mutex<Vec<u64>>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<u64> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProgressListener for RecordingProgress {
    fn on_progress(&mut self, published: u64, _elapsed: Duration) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(published);
    }
}

/// JSON document for one archive entry.
pub fn record_json(key: &str, value: &str, schema_name: &str, schema_version: &str) -> String {
    serde_json::json!({
        "recordKey": key,
        "recordValue": value,
        "schemaName": schema_name,
        "schemaVersion": schema_version,
    })
    .to_string()
}

/// Write a `.tar.gz` archive holding one regular file per `(name, payload)`
/// pair, in the given order.
pub fn write_archive<I, N, D>(path: &Path, entries: I) -> std::io::Result<()>
where
    I: IntoIterator<Item = (N, D)>,
    N: AsRef<str>,
    D: AsRef<[u8]>,
{
    let file = File::create(path)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    for (name, payload) in entries {
        let payload = payload.as_ref();
        let mut header = tar::Header::new_gnu();
        header.set_size(payload.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name.as_ref(), payload)?;
    }
    builder.into_inner()?.finish()?;
    Ok(())
}

/// Write an archive of `count` well-formed records.
///
/// Entry `i` has key `key-{i}`, value `value-{i}`, schema name `schema-{i % 3}`
/// and schema version `1`.
pub fn write_records_archive(path: &Path, count: usize) -> std::io::Result<()> {
    write_archive(
        path,
        (0..count).map(|i| {
            (
                format!("records/{i:06}.json"),
                record_json(
                    &format!("key-{i}"),
                    &format!("value-{i}"),
                    &format!("schema-{}", i % 3),
                    "1",
                ),
            )
        }),
    )
}
