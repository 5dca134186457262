//! Forward-only entry cursor.

use crate::error::{ArchiveError, Result};
use flate2::read::GzDecoder;
use std::io::Read;
use tar::EntryType;

/// One regular file entry, payload already read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Ordinal among regular file entries, starting at 0
    pub index: u64,
    /// Path stored in the entry header
    pub path: String,
    /// Declared payload length
    pub size: u64,
    payload: Vec<u8>,
}

impl ArchiveEntry {
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Cursor over the entries of an [`crate::ArchiveReader`].
///
/// Entries come out in stored order. After a fatal error the cursor is
/// exhausted and only returns `None`.
pub struct ArchiveEntries<'a, R: Read> {
    entries: tar::Entries<'a, GzDecoder<R>>,
    max_entry_size: u64,
    next_index: u64,
    failed: bool,
}

impl<'a, R: Read> ArchiveEntries<'a, R> {
    pub(crate) fn new(entries: tar::Entries<'a, GzDecoder<R>>, max_entry_size: u64) -> Self {
        Self {
            entries,
            max_entry_size,
            next_index: 0,
            failed: false,
        }
    }

    /// Number of regular file entries visited so far
    pub fn entries_read(&self) -> u64 {
        self.next_index
    }

    /// Advance to the next regular file entry.
    ///
    /// Returns `Ok(None)` once the archive is exhausted.
    pub fn next_entry(&mut self) -> Result<Option<ArchiveEntry>> {
        if self.failed {
            return Ok(None);
        }
        let result = self.advance();
        if matches!(&result, Err(err) if !err.is_entry_local()) {
            self.failed = true;
        }
        result
    }

    fn advance(&mut self) -> Result<Option<ArchiveEntry>> {
        loop {
            let mut entry = match self.entries.next() {
                None => return Ok(None),
                Some(Ok(entry)) => entry,
                Some(Err(source)) => {
                    return Err(ArchiveError::Corrupt {
                        entries_read: self.next_index,
                        source,
                    })
                }
            };

            let entry_type = entry.header().entry_type();
            let path = entry
                .path()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "<invalid path>".to_string());

            if !carries_payload(&entry_type) {
                if has_no_payload(&entry_type) {
                    tracing::debug!("Skipping non-file entry {path} ({entry_type:?})");
                } else {
                    tracing::warn!("Skipping entry {path} of unsupported type {entry_type:?}");
                }
                continue;
            }

            let index = self.next_index;
            self.next_index += 1;
            let size = entry.size();

            // The unread payload is skipped by the next call to `entries.next()`.
            if size > self.max_entry_size {
                return Err(ArchiveError::EntryTooLarge {
                    index,
                    path,
                    size,
                    limit: self.max_entry_size,
                });
            }

            let mut payload = Vec::with_capacity(size as usize);
            entry
                .read_to_end(&mut payload)
                .map_err(|source| ArchiveError::Corrupt {
                    entries_read: index,
                    source,
                })?;

            if (payload.len() as u64) < size {
                return Err(ArchiveError::Truncated {
                    index,
                    path,
                    declared: size,
                    actual: payload.len() as u64,
                });
            }

            tracing::trace!("Read entry #{index} {path} ({size} bytes)");

            return Ok(Some(ArchiveEntry {
                index,
                path,
                size,
                payload,
            }));
        }
    }
}

/// Entry types read as records. The tar parser expands GNU sparse entries.
fn carries_payload(entry_type: &EntryType) -> bool {
    matches!(
        entry_type,
        EntryType::Regular | EntryType::Continuous | EntryType::GNUSparse
    )
}

fn has_no_payload(entry_type: &EntryType) -> bool {
    matches!(
        entry_type,
        EntryType::Directory
            | EntryType::Symlink
            | EntryType::Link
            | EntryType::Char
            | EntryType::Block
            | EntryType::Fifo
    )
}

impl<R: Read> Iterator for ArchiveEntries<'_, R> {
    type Item = Result<ArchiveEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}
