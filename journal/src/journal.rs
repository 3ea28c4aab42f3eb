//! Change log implementations.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use rewind_core::TxnId;
use rewind_graph::ChangeSet;
use tracing::{debug, warn};

use crate::entry::{LogEntry, TxnRecord};
use crate::error::{JournalError, JournalResult};
use crate::sequencer::TxnSequencer;

/// Ordered, durable storage of committed transactions.
pub trait ChangeLog {
    /// Append a transaction on top of the current cursor.
    ///
    /// Retained transactions after the cursor are dropped as part of the
    /// same append. The cursor moves to the returned id.
    fn append(
        &mut self,
        description: &str,
        forward: ChangeSet,
        inverse: ChangeSet,
    ) -> JournalResult<TxnId>;

    /// Persist a cursor move. `to` must be retained or `BEFORE_FIRST`.
    fn move_cursor(&mut self, to: TxnId) -> JournalResult<()>;

    /// Drop every transaction after `id`. Returns how many were dropped.
    fn truncate_after(&mut self, id: TxnId) -> JournalResult<usize>;

    /// Retained transactions in commit order.
    fn records(&self) -> &[TxnRecord];

    /// Id ordering and cursor.
    fn sequencer(&self) -> &TxnSequencer;

    /// Flush buffered writes to durable storage.
    fn sync(&mut self) -> JournalResult<()>;

    /// Drop storage held by entries that no longer affect the retained state.
    fn compact(&mut self) -> JournalResult<()> {
        Ok(())
    }

    /// Get a retained transaction by id.
    fn get(&self, id: TxnId) -> Option<&TxnRecord> {
        let records = self.records();
        records
            .binary_search_by_key(&id, |record| record.id)
            .ok()
            .map(|idx| &records[idx])
    }
}

impl<L: ChangeLog + ?Sized> ChangeLog for Box<L> {
    fn append(
        &mut self,
        description: &str,
        forward: ChangeSet,
        inverse: ChangeSet,
    ) -> JournalResult<TxnId> {
        (**self).append(description, forward, inverse)
    }

    fn move_cursor(&mut self, to: TxnId) -> JournalResult<()> {
        (**self).move_cursor(to)
    }

    fn truncate_after(&mut self, id: TxnId) -> JournalResult<usize> {
        (**self).truncate_after(id)
    }

    fn records(&self) -> &[TxnRecord] {
        (**self).records()
    }

    fn sequencer(&self) -> &TxnSequencer {
        (**self).sequencer()
    }

    fn sync(&mut self) -> JournalResult<()> {
        (**self).sync()
    }

    fn compact(&mut self) -> JournalResult<()> {
        (**self).compact()
    }

    fn get(&self, id: TxnId) -> Option<&TxnRecord> {
        (**self).get(id)
    }
}

/// Retained records plus the sequencer, rebuilt by replaying entries.
#[derive(Debug, Default)]
struct LogState {
    records: Vec<TxnRecord>,
    sequencer: TxnSequencer,
}

impl LogState {
    /// Build the commit entry for a new transaction.
    fn commit_entry(&self, description: &str, forward: ChangeSet, inverse: ChangeSet) -> LogEntry {
        LogEntry::Txn(TxnRecord::new(
            self.sequencer.peek_next(),
            self.sequencer.current(),
            description,
            forward,
            inverse,
        ))
    }

    /// Reject entries that would fail to replay, before they are written.
    fn check(&self, entry: &LogEntry) -> JournalResult<()> {
        match entry {
            LogEntry::Cursor { at } if at.is_valid() && !self.sequencer.contains(*at) => {
                Err(JournalError::unknown_txn(*at))
            }
            _ => Ok(()),
        }
    }

    fn apply(&mut self, entry: LogEntry) -> JournalResult<()> {
        match entry {
            LogEntry::Txn(record) => {
                self.sequencer.commit(record.id, record.parent)?;
                let parent = record.parent;
                self.records.retain(|retained| retained.id <= parent);
                self.records.push(record);
            }
            LogEntry::Cursor { at } => {
                self.sequencer.set_current(at)?;
            }
            LogEntry::Truncate { after } => {
                self.sequencer.truncate_after(after);
                self.records.retain(|retained| retained.id <= after);
            }
            LogEntry::Checkpoint { next_txn_id } => {
                self.sequencer.reserve(next_txn_id);
            }
        }
        Ok(())
    }

    /// Entries that reproduce this state from scratch.
    fn snapshot(&self) -> Vec<LogEntry> {
        let mut entries: Vec<LogEntry> = self.records.iter().cloned().map(LogEntry::Txn).collect();
        if self.sequencer.current() != self.sequencer.last() {
            entries.push(LogEntry::Cursor {
                at: self.sequencer.current(),
            });
        }
        // Last, so replayed commits are not rejected as out of order.
        entries.push(LogEntry::Checkpoint {
            next_txn_id: self.sequencer.peek_next(),
        });
        entries
    }
}

/// In-memory journal for testing and simple use cases.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    state: LogState,
}

impl MemoryJournal {
    /// Create a new empty memory journal.
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&mut self, entry: LogEntry) -> JournalResult<()> {
        self.state.check(&entry)?;
        self.state.apply(entry)
    }
}

impl ChangeLog for MemoryJournal {
    fn append(
        &mut self,
        description: &str,
        forward: ChangeSet,
        inverse: ChangeSet,
    ) -> JournalResult<TxnId> {
        let entry = self.state.commit_entry(description, forward, inverse);
        let id = entry.txn_id();
        self.write(entry)?;
        Ok(id)
    }

    fn move_cursor(&mut self, to: TxnId) -> JournalResult<()> {
        self.write(LogEntry::Cursor { at: to })
    }

    fn truncate_after(&mut self, id: TxnId) -> JournalResult<usize> {
        let before = self.state.records.len();
        self.write(LogEntry::Truncate { after: id })?;
        Ok(before - self.state.records.len())
    }

    fn records(&self) -> &[TxnRecord] {
        &self.state.records
    }

    fn sequencer(&self) -> &TxnSequencer {
        &self.state.sequencer
    }

    /// Sync is a no-op for memory journal.
    fn sync(&mut self) -> JournalResult<()> {
        Ok(())
    }
}

/// File-based journal for durability.
///
/// The file holds one JSON-encoded [`LogEntry`] per line and is only ever
/// appended to, except by [`FileJournal::compact`].
#[derive(Debug)]
pub struct FileJournal {
    /// Path to the journal file.
    path: PathBuf,
    /// File opened for append.
    file: File,
    /// Length of the file up to the last complete entry.
    len: u64,
    /// Call `sync_data` after every write.
    sync_writes: bool,
    /// Replayed state.
    state: LogState,
}

impl FileJournal {
    /// Open a journal file, creating it if missing.
    pub fn open(path: impl AsRef<Path>, sync_writes: bool) -> JournalResult<Self> {
        Self::open_with(path, true, sync_writes)
    }

    /// Open a journal file.
    ///
    /// With `create` false, a missing file is [`JournalError::NotFound`].
    pub fn open_with(path: impl AsRef<Path>, create: bool, sync_writes: bool) -> JournalResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !create && !path.exists() {
            return Err(JournalError::not_found(path.display().to_string()));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let (state, len) = Self::replay(&contents)?;

        // Drop a torn tail so new entries start on a fresh line.
        if len < contents.len() as u64 {
            file.set_len(len)?;
        }

        debug!(
            path = %path.display(),
            retained = state.records.len(),
            cursor = %state.sequencer.current(),
            "journal opened"
        );

        Ok(Self {
            path,
            file,
            len,
            sync_writes,
            state,
        })
    }

    /// Replay the file contents. Returns the state and the length of the
    /// valid prefix.
    fn replay(contents: &str) -> JournalResult<(LogState, u64)> {
        let mut state = LogState::default();
        let mut offset = 0usize;

        for (idx, chunk) in contents.split_inclusive('\n').enumerate() {
            let line_no = idx + 1;
            if !chunk.ends_with('\n') {
                warn!(line = line_no, bytes = chunk.len(), "ignoring torn journal tail");
                break;
            }
            offset += chunk.len();

            let line = chunk.trim();
            if line.is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(line)
                .map_err(|err| JournalError::invalid_format(line_no, err.to_string()))?;
            state
                .apply(entry)
                .map_err(|err| JournalError::invalid_format(line_no, err.to_string()))?;
        }

        Ok((state, offset as u64))
    }

    /// Write one entry, then apply it. On failure the file is cut back to
    /// its previous length and the state is untouched.
    fn write(&mut self, entry: LogEntry) -> JournalResult<()> {
        self.state.check(&entry)?;

        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');

        if let Err(err) = self.write_line(&line) {
            if let Err(trunc_err) = self.file.set_len(self.len) {
                warn!(error = %trunc_err, "failed to cut back journal after write error");
            }
            return Err(err);
        }

        self.len += line.len() as u64;
        self.state.apply(entry)
    }

    fn write_line(&mut self, line: &[u8]) -> JournalResult<()> {
        self.file.write_all(line)?;
        self.file.flush()?;
        if self.sync_writes {
            self.file.sync_data()?;
        }
        Ok(())
    }

    /// Rewrite the file with only the retained transactions and cursor.
    ///
    /// The new contents are written to a sibling file and renamed over the
    /// journal, so a crash leaves either the old or the new file.
    pub fn compact(&mut self) -> JournalResult<()> {
        let tmp_path = self.compact_path();
        let mut contents = Vec::new();
        for entry in self.state.snapshot() {
            serde_json::to_writer(&mut contents, &entry)?;
            contents.push(b'\n');
        }

        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&contents)?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        self.file = OpenOptions::new().read(true).append(true).open(&self.path)?;
        self.len = contents.len() as u64;

        debug!(
            path = %self.path.display(),
            retained = self.state.records.len(),
            bytes = self.len,
            "journal compacted"
        );
        Ok(())
    }

    fn compact_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".compact");
        self.path.with_file_name(name)
    }

    /// Get the journal file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current length of the journal file.
    pub fn len_bytes(&self) -> u64 {
        self.len
    }
}

impl ChangeLog for FileJournal {
    fn append(
        &mut self,
        description: &str,
        forward: ChangeSet,
        inverse: ChangeSet,
    ) -> JournalResult<TxnId> {
        let entry = self.state.commit_entry(description, forward, inverse);
        let id = entry.txn_id();
        self.write(entry)?;
        Ok(id)
    }

    fn move_cursor(&mut self, to: TxnId) -> JournalResult<()> {
        self.write(LogEntry::Cursor { at: to })
    }

    fn truncate_after(&mut self, id: TxnId) -> JournalResult<usize> {
        let before = self.state.records.len();
        self.write(LogEntry::Truncate { after: id })?;
        Ok(before - self.state.records.len())
    }

    fn records(&self) -> &[TxnRecord] {
        &self.state.records
    }

    fn sequencer(&self) -> &TxnSequencer {
        &self.state.sequencer
    }

    fn sync(&mut self) -> JournalResult<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    fn compact(&mut self) -> JournalResult<()> {
        FileJournal::compact(self)
    }
}
