//! Decision journal adapters
//!
//! On-disk layout: a sequence of frames `[len:u32 LE][bincode JournalRecord]`.
//! A truncated final frame (torn write) is ignored on load; a complete frame
//! that fails to decode is reported as corruption.

use crate::domain::{decode_record, encode_record, JournalRecord};
use crate::ports::RecordJournal;
use parking_lot::{Mutex, RwLock};
use shared_types::{StorageError, UnixSeconds};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// In-memory journal for tests and ephemeral nodes.
#[derive(Default)]
pub struct InMemoryJournal {
    records: RwLock<Vec<JournalRecord>>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<JournalRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl RecordJournal for InMemoryJournal {
    fn append(&self, record: &JournalRecord) -> Result<(), StorageError> {
        self.records.write().push(record.clone());
        Ok(())
    }

    fn load(&self) -> Result<Vec<JournalRecord>, StorageError> {
        Ok(self.records.read().clone())
    }

    fn compact_before(&self, horizon: UnixSeconds) -> Result<usize, StorageError> {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|r| r.timestamp >= horizon);
        Ok(before - records.len())
    }
}

/// Append-only file journal. Every append is synced before returning.
pub struct FileJournal {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileJournal {
    /// Open (or create) the journal at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        // Cut a torn tail so later appends start on a frame boundary.
        let mut bytes = Vec::new();
        (&file).read_to_end(&mut bytes)?;
        let (records, valid_len) = Self::parse(&bytes)?;
        if valid_len < bytes.len() {
            warn!(
                valid_len,
                file_len = bytes.len(),
                "[proof-consensus] Truncating torn journal tail"
            );
            file.set_len(valid_len as u64)?;
        }
        info!(
            "[proof-consensus] Journal opened at {} ({} records)",
            path.display(),
            records.len()
        );
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn frame(record: &JournalRecord) -> Result<Vec<u8>, StorageError> {
        let payload =
            encode_record(record).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let mut frame = Vec::with_capacity(4 + payload.len());
        frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    /// Decode complete frames; returns them and the byte length they span.
    fn parse(bytes: &[u8]) -> Result<(Vec<JournalRecord>, usize), StorageError> {
        let mut records = Vec::new();
        let mut cursor = 0usize;

        while cursor < bytes.len() {
            let Some(header) = bytes.get(cursor..cursor + 4) else {
                warn!(offset = cursor, "Ignoring torn journal frame header");
                break;
            };
            let mut len = [0u8; 4];
            len.copy_from_slice(header);
            let len = u32::from_le_bytes(len) as usize;

            let start = cursor + 4;
            let Some(payload) = bytes.get(start..start + len) else {
                warn!(offset = cursor, len, "Ignoring torn journal frame");
                break;
            };
            let record = decode_record(payload).map_err(|e| StorageError::DataCorruption {
                offset: cursor as u64,
                reason: e.to_string(),
            })?;
            records.push(record);
            cursor = start + len;
        }
        Ok((records, cursor))
    }
}

impl RecordJournal for FileJournal {
    fn append(&self, record: &JournalRecord) -> Result<(), StorageError> {
        let frame = Self::frame(record)?;
        let mut file = self.file.lock();
        file.write_all(&frame)?;
        file.sync_data()?;
        Ok(())
    }

    fn load(&self) -> Result<Vec<JournalRecord>, StorageError> {
        let _guard = self.file.lock();
        let mut bytes = Vec::new();
        File::open(&self.path)?.read_to_end(&mut bytes)?;
        Ok(Self::parse(&bytes)?.0)
    }

    fn compact_before(&self, horizon: UnixSeconds) -> Result<usize, StorageError> {
        let mut file = self.file.lock();

        let mut bytes = Vec::new();
        File::open(&self.path)?.read_to_end(&mut bytes)?;
        let (records, _) = Self::parse(&bytes)?;
        let before = records.len();
        let retained: Vec<_> = records
            .into_iter()
            .filter(|r| r.timestamp >= horizon)
            .collect();
        let dropped = before - retained.len();
        if dropped == 0 {
            return Ok(0);
        }

        let mut kept = Vec::with_capacity(bytes.len());
        for record in &retained {
            kept.extend_from_slice(&Self::frame(record)?);
        }

        // Rewrite atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut temp = File::create(&temp_path)?;
        temp.write_all(&kept)?;
        temp.sync_all()?;
        std::fs::rename(&temp_path, &self.path)?;

        *file = OpenOptions::new().append(true).open(&self.path)?;
        info!(dropped, "[proof-consensus] Journal compacted");
        Ok(dropped)
    }
}
