use crate::{Publisher, Result};
use archive_record::PublishEnvelope;

/// Publisher that accepts every message and sends nothing.
#[derive(Debug, Default)]
pub struct DryRunPublisher {
    accepted: u64,
    flushes: u64,
}

impl DryRunPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn flushes(&self) -> u64 {
        self.flushes
    }
}

#[async_trait::async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&mut self, envelope: &PublishEnvelope<'_>) -> Result<()> {
        self.accepted += 1;
        tracing::debug!(
            "[dry-run] key={} correlation_id={} ({} bytes)",
            envelope.key(),
            envelope.correlation_id(),
            envelope.value().len()
        );
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
