//! Streaming reader for gzip-compressed tar archives.
//!
//! The reader stacks three owned layers, each dropping the one below it:
//!
//! ```text
//! tar::Archive  ->  flate2::read::GzDecoder  ->  BufReader<File>
//! ```
//!
//! Nothing is materialized up front. [`ArchiveEntries::next_entry`] advances
//! to the next regular file entry, reads its payload into an owned buffer
//! bounded by the configured maximum entry size, and hands it out. The
//! payload is fully consumed before the cursor can move on.
//!
//! # Example
//!
//! ```ignore
//! use archive_source::{ArchiveReader, ReaderOptions};
//!
//! let mut reader = ArchiveReader::open("/tmp/messages.tar.gz", &ReaderOptions::default())?;
//! let mut entries = reader.entries()?;
//! while let Some(entry) = entries.next_entry()? {
//!     println!("{} ({} bytes)", entry.path, entry.size);
//! }
//! ```

mod entry;
mod error;
mod reader;

pub use entry::{ArchiveEntries, ArchiveEntry};
pub use error::{ArchiveError, Result};
pub use reader::ArchiveReader;

/// Default read buffer size for the underlying file (1MB)
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Default upper bound on a single entry's declared size (16MB)
pub const DEFAULT_MAX_ENTRY_SIZE: u64 = 16 * 1024 * 1024;

/// Options for opening an archive.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Buffer size for the file reader beneath the decompressor
    pub buffer_size: usize,
    /// Entries declaring more bytes than this are rejected without buffering
    pub max_entry_size: u64,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
        }
    }
}
