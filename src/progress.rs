//! Progress notifications emitted while reading.

use std::time::Duration;

/// Receives a notification every `progress_interval` published records.
pub trait ProgressListener {
    fn on_progress(&mut self, published: u64, elapsed: Duration);
}

/// Default listener: one `info` line per notification.
#[derive(Debug, Default)]
pub struct LogProgress {
    expected: Option<u64>,
}

impl LogProgress {
    pub fn new(expected: Option<u64>) -> Self {
        Self { expected }
    }
}

impl ProgressListener for LogProgress {
    fn on_progress(&mut self, published: u64, elapsed: Duration) {
        let rate = if elapsed.as_secs_f64() > 0.0 {
            published as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        match self.expected.filter(|expected| *expected > 0) {
            Some(expected) => tracing::info!(
                "Publish #{published} messages ({:.1}% of {expected}, {rate:.0} msg/sec)",
                published as f64 * 100.0 / expected as f64
            ),
            None => tracing::info!("Publish #{published} messages ({rate:.0} msg/sec)"),
        }
    }
}
