//! Archive → decoder → publisher orchestration.
//!
//! A run moves through
//!
//! ```text
//! Idle → Configuring → Reading → Draining → Done
//!                 \         \         \
//!                  └─────────┴─────────┴──→ Failed
//! ```
//!
//! Reading pulls entries one at a time on the calling task, decodes them and
//! hands each record to the publisher. Draining is the final flush barrier.
//! The archive reader is scoped to the Reading state and the publisher to the
//! pipeline value, so both are released on every exit path.

use crate::config::{LoaderConfig, MalformedEntryPolicy};
use crate::error::{Error, Result};
use crate::progress::{LogProgress, ProgressListener};
use archive_kafka_publisher::Publisher;
use archive_record::PublishEnvelope;
use archive_source::ArchiveReader;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Configuring,
    Reading,
    Draining,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Configuring => "configuring",
            RunState::Reading => "reading",
            RunState::Draining => "draining",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Counters for one run.
#[derive(Debug, Clone)]
pub struct RunCounters {
    pub records_published: u64,
    /// Malformed entries passed over under [`MalformedEntryPolicy::Skip`]
    pub records_skipped: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    started: Instant,
    elapsed: Option<Duration>,
}

impl RunCounters {
    fn start() -> Self {
        Self {
            records_published: 0,
            records_skipped: 0,
            started_at: Utc::now(),
            finished_at: None,
            started: Instant::now(),
            elapsed: None,
        }
    }

    fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
        self.elapsed = Some(self.started.elapsed());
    }

    /// Wall-clock time of the run, or so far if it is still going
    pub fn elapsed(&self) -> Duration {
        self.elapsed.unwrap_or_else(|| self.started.elapsed())
    }
}

/// Outcome of a run that reached [`RunState::Done`].
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub state: RunState,
    pub counters: RunCounters,
    pub expected_messages: Option<u64>,
}

/// Outcome of a run that ended in [`RunState::Failed`].
///
/// Carries the state the run was in when the error surfaced and the counters
/// up to that point.
#[derive(thiserror::Error, Debug)]
#[error(
    "Run failed while {failed_in} after publishing {} records: {error}",
    .counters.records_published
)]
pub struct RunFailure {
    pub failed_in: RunState,
    #[source]
    pub error: Error,
    pub counters: RunCounters,
}

impl RunFailure {
    pub fn state(&self) -> RunState {
        RunState::Failed
    }
}

/// One run over one archive.
pub struct Pipeline<P, L = LogProgress> {
    config: LoaderConfig,
    publisher: P,
    progress: L,
}

impl<P: Publisher> Pipeline<P> {
    pub fn new(config: LoaderConfig, publisher: P) -> Self {
        let progress = LogProgress::new(config.expected_messages);
        Self {
            config,
            publisher,
            progress,
        }
    }
}

impl<P: Publisher, L: ProgressListener> Pipeline<P, L> {
    /// Replace the progress listener
    pub fn with_progress<M: ProgressListener>(self, progress: M) -> Pipeline<P, M> {
        Pipeline {
            config: self.config,
            publisher: self.publisher,
            progress,
        }
    }

    /// Drive the run to completion.
    ///
    /// Consumes the pipeline; the publisher is dropped (and closed) before
    /// this returns.
    pub async fn run(mut self) -> std::result::Result<RunSummary, RunFailure> {
        let mut state = RunState::Idle;
        let mut counters = RunCounters::start();

        let outcome = self.drive(&mut state, &mut counters).await;
        counters.finish();

        match outcome {
            Ok(()) => {
                info!(
                    "Publish {} records in {} ms",
                    counters.records_published,
                    counters.elapsed().as_millis()
                );
                if counters.records_skipped > 0 {
                    warn!("Skipped {} malformed entries", counters.records_skipped);
                }
                if let Some(expected) = self.config.expected_messages {
                    if expected != counters.records_published {
                        warn!(
                            "Expected {expected} messages but published {}",
                            counters.records_published
                        );
                    }
                }
                Ok(RunSummary {
                    state,
                    counters,
                    expected_messages: self.config.expected_messages,
                })
            }
            Err(error) => {
                tracing::error!(
                    "Error during operation while {state}: {error} ({} records published before failure)",
                    counters.records_published
                );
                Err(RunFailure {
                    failed_in: state,
                    error,
                    counters,
                })
            }
        }
    }

    async fn drive(&mut self, state: &mut RunState, counters: &mut RunCounters) -> Result<()> {
        transition(state, RunState::Configuring);
        self.config.validate()?;
        self.config.log_configuration();

        transition(state, RunState::Reading);
        self.read_archive(counters).await?;

        transition(state, RunState::Draining);
        self.publisher.flush().await?;

        transition(state, RunState::Done);
        Ok(())
    }

    async fn read_archive(&mut self, counters: &mut RunCounters) -> Result<()> {
        let mut reader =
            ArchiveReader::open(&self.config.input_path, &self.config.reader_options())?;
        let mut entries = reader.entries()?;

        loop {
            let entry = match entries.next_entry() {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) if err.is_entry_local() => {
                    self.reject(counters, err.into())?;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let record = match archive_record::decode(entry.payload()) {
                Ok(record) => record,
                Err(err) => {
                    self.reject(counters, Error::malformed(&entry, err))?;
                    continue;
                }
            };

            let envelope = PublishEnvelope::new(&record);
            self.publisher.publish(&envelope).await?;
            counters.records_published += 1;
            debug!(
                "Published entry #{} {} (key={}, correlation_id={})",
                entry.index,
                entry.path,
                record.key,
                envelope.correlation_id()
            );

            let published = counters.records_published;
            if published % self.config.progress_interval == 0 {
                self.progress.on_progress(published, counters.elapsed());
            }
            if let Some(every) = self.config.flush_interval {
                if published % every == 0 {
                    self.publisher.flush().await?;
                    debug!("Flush barrier after {published} records");
                }
            }
        }

        debug!(
            "Archive {} exhausted after {} entries",
            self.config.input_path.display(),
            entries.entries_read()
        );
        Ok(())
    }

    fn reject(&self, counters: &mut RunCounters, error: Error) -> Result<()> {
        match self.config.on_malformed {
            MalformedEntryPolicy::Abort => Err(error),
            MalformedEntryPolicy::Skip => {
                counters.records_skipped += 1;
                warn!("Skipping entry: {error}");
                Ok(())
            }
        }
    }
}

fn transition(state: &mut RunState, next: RunState) {
    debug!("Pipeline state: {state} -> {next}");
    *state = next;
}
