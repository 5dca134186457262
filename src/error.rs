//! Run-level error type.

use archive_kafka_publisher::PublishError;
use archive_record::MalformedRecordError;
use archive_source::{ArchiveEntry, ArchiveError};
use thiserror::Error;

/// Everything that can end a run in the failed state.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Archive I/O error: {0}")]
    ArchiveIo(#[source] ArchiveError),

    #[error("Archive is corrupt: {0}")]
    ArchiveCorrupt(#[source] ArchiveError),

    #[error("Malformed entry #{index} ({path}): {reason}")]
    MalformedEntry {
        index: u64,
        path: String,
        reason: String,
    },

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
}

impl Error {
    pub(crate) fn malformed(entry: &ArchiveEntry, err: MalformedRecordError) -> Self {
        Error::MalformedEntry {
            index: entry.index,
            path: entry.path.clone(),
            reason: err.to_string(),
        }
    }

    /// Whether this error concerns a single entry rather than the whole run
    pub fn is_malformed_entry(&self) -> bool {
        matches!(self, Error::MalformedEntry { .. })
    }
}

impl From<ArchiveError> for Error {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::Open { .. } => Error::ArchiveIo(err),
            ArchiveError::EntryTooLarge {
                index,
                path,
                size,
                limit,
            } => Error::MalformedEntry {
                index,
                path,
                reason: format!("declared size of {size} bytes exceeds the limit of {limit}"),
            },
            ArchiveError::Corrupt { .. } | ArchiveError::Truncated { .. } => {
                Error::ArchiveCorrupt(err)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
