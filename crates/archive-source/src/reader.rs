//! Archive opening and decompression stacking.

use crate::entry::ArchiveEntries;
use crate::error::{ArchiveError, Result};
use crate::ReaderOptions;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Owns the decompressed tar stream for the duration of a run.
pub struct ArchiveReader<R: Read> {
    archive: tar::Archive<GzDecoder<R>>,
    max_entry_size: u64,
}

impl ArchiveReader<BufReader<File>> {
    /// Open a `.tar.gz` file from the local filesystem
    pub fn open<P: AsRef<Path>>(path: P, options: &ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ArchiveError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Opened archive: {}", path.display());

        Ok(Self::from_reader(
            BufReader::with_capacity(options.buffer_size, file),
            options,
        ))
    }
}

impl<R: Read> ArchiveReader<R> {
    /// Wrap an arbitrary gzip byte stream
    pub fn from_reader(reader: R, options: &ReaderOptions) -> Self {
        Self {
            archive: tar::Archive::new(GzDecoder::new(reader)),
            max_entry_size: options.max_entry_size,
        }
    }

    /// Start the forward-only entry cursor.
    ///
    /// Can be called once per reader; the cursor borrows the reader mutably.
    pub fn entries(&mut self) -> Result<ArchiveEntries<'_, R>> {
        let entries = self
            .archive
            .entries()
            .map_err(|source| ArchiveError::Corrupt {
                entries_read: 0,
                source,
            })?;
        Ok(ArchiveEntries::new(entries, self.max_entry_size))
    }
}
