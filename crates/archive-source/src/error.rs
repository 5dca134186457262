//! Error types for archive reading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening or walking an archive.
///
/// Only [`ArchiveError::EntryTooLarge`] is local to one entry; every other
/// variant means entry boundaries can no longer be trusted.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Failed to open archive {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt archive data after {entries_read} entries: {source}")]
    Corrupt {
        entries_read: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Truncated entry #{index} ({path}): declared {declared} bytes, read {actual}")]
    Truncated {
        index: u64,
        path: String,
        declared: u64,
        actual: u64,
    },

    #[error("Entry #{index} ({path}) declares {size} bytes, exceeding the limit of {limit}")]
    EntryTooLarge {
        index: u64,
        path: String,
        size: u64,
        limit: u64,
    },
}

impl ArchiveError {
    /// Whether the reader can still advance past this error.
    pub fn is_entry_local(&self) -> bool {
        matches!(self, ArchiveError::EntryTooLarge { .. })
    }
}

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;
