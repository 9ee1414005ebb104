//! Audit logger: append-only NDJSON, one file per day
//!
//! ## Write rules
//!
//! - Partition file: `<log_dir>/queries_<YYYY-MM-DD>.log`
//! - Directory and partition are created on first write
//! - One JSON object per line; lines are never rewritten or removed
//! - Appends are serialized by a mutex in-process and, on unix, by an
//!   exclusive `flock` on the partition file across processes
//! - The timestamp is taken under both locks and clamped to the later of
//!   this logger's last stamp and the partition's final record, so a
//!   partition never steps backwards even with several writers
//! - Each line goes out in a single `write_all` on an `O_APPEND` handle
//!
//! ## Failure semantics
//!
//! `record` never returns an error. A failed write is reported through
//! `tracing` and dropped; the caller's response must not depend on it.

use crate::audit::record::{AuditEntry, AuditRecord};
use crate::error::PipelineError;
use chrono::{DateTime, Local, NaiveDate};
use serde::Deserialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

/// Bytes read from the end of a partition to find its final record
const TAIL_BYTES: u64 = 64 * 1024;

/// Last timestamp handed out, for monotonic stamping
#[derive(Debug, Default)]
struct AppendState {
    last: Option<DateTime<Local>>,
}

/// Only the field needed to seed the clamp
#[derive(Deserialize)]
struct Stamp {
    timestamp: DateTime<Local>,
}

fn later(a: DateTime<Local>, b: Option<DateTime<Local>>) -> DateTime<Local> {
    match b {
        Some(b) if b > a => b,
        _ => a,
    }
}

/// Audit logger handle
#[derive(Debug)]
pub struct AuditLogger {
    log_dir: PathBuf,
    state: Mutex<AppendState>,
}

/// Partition file name for a date
pub fn partition_file_name(date: NaiveDate) -> String {
    format!("queries_{}.log", date.format("%Y-%m-%d"))
}

impl AuditLogger {
    /// Logger writing under `log_dir`; nothing is touched until first write
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Self {
        Self {
            log_dir: log_dir.as_ref().to_path_buf(),
            state: Mutex::new(AppendState::default()),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn partition_path(&self, date: NaiveDate) -> PathBuf {
        self.log_dir.join(partition_file_name(date))
    }

    /// Append one record; never fails
    pub fn record(&self, entry: AuditEntry) {
        if let Err(e) = self.try_record(entry) {
            warn!(error = %e, log_dir = %self.log_dir.display(), "audit record dropped");
        }
    }

    /// Append one record, reporting failures
    pub fn try_record(&self, entry: AuditEntry) -> Result<AuditRecord, PipelineError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let floor = later(Local::now(), state.last);
        let path = self.partition_path(floor.date_naive());
        let io_err = |e: std::io::Error| {
            PipelineError::LoggingError(format!("{}: {}", path.display(), e))
        };

        let mut partition = LockedPartition::open(&self.log_dir, &path).map_err(io_err)?;
        let timestamp = later(floor, partition.last_timestamp().map_err(io_err)?);

        let record = AuditRecord::stamped(timestamp, entry);
        let mut line = serde_json::to_string(&record)
            .map_err(|e| PipelineError::LoggingError(e.to_string()))?;
        line.push('\n');
        partition.append(&line).map_err(io_err)?;
        drop(partition);

        state.last = Some(timestamp);
        drop(state);

        info!(
            run_id = %record.run_id,
            success = record.success,
            user_query = %record.user_query,
            final_sql = record.final_sql.as_deref().unwrap_or(""),
            error = record.error.as_deref().unwrap_or(""),
            "query logged"
        );
        Ok(record)
    }

    /// Read back one day's partition
    ///
    /// A missing partition is empty. Lines that fail to decode are skipped.
    pub fn read_partition(&self, date: NaiveDate) -> Result<Vec<AuditRecord>, PipelineError> {
        let path = self.partition_path(date);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&path)
            .map_err(|e| PipelineError::LoggingError(format!("{}: {}", path.display(), e)))?;

        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| PipelineError::LoggingError(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(line = idx + 1, error = %e, "skipping corrupt audit line"),
            }
        }
        Ok(records)
    }
}

/// Partition file held under an exclusive advisory lock until dropped
struct LockedPartition {
    file: File,
}

impl LockedPartition {
    fn open(dir: &Path, path: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        lock_exclusive(&file)?;
        Ok(Self { file })
    }

    /// Timestamp of the last decodable record, if any
    fn last_timestamp(&mut self) -> std::io::Result<Option<DateTime<Local>>> {
        let len = self.file.metadata()?.len();
        if len == 0 {
            return Ok(None);
        }

        let start = len.saturating_sub(TAIL_BYTES);
        self.file.seek(SeekFrom::Start(start))?;
        let mut tail = Vec::new();
        self.file.read_to_end(&mut tail)?;

        let text = String::from_utf8_lossy(&tail);
        // First line of a mid-file window is partial
        let skip = usize::from(start > 0);
        let last = text
            .lines()
            .skip(skip)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .find_map(|line| serde_json::from_str::<Stamp>(line.trim()).ok())
            .map(|stamp| stamp.timestamp);
        Ok(last)
    }

    fn append(&mut self, line: &str) -> std::io::Result<()> {
        self.file.write_all(line.as_bytes())?;
        self.file.flush()
    }
}

impl Drop for LockedPartition {
    fn drop(&mut self) {
        unlock(&self.file);
    }
}

#[cfg(unix)]
fn lock_exclusive(file: &File) -> std::io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(unix)]
fn unlock(file: &File) {
    use std::os::unix::io::AsRawFd;

    // Closing the descriptor releases the lock as well
    unsafe {
        libc::flock(file.as_raw_fd(), libc::LOCK_UN);
    }
}

#[cfg(not(unix))]
fn lock_exclusive(_file: &File) -> std::io::Result<()> {
    Ok(())
}

#[cfg(not(unix))]
fn unlock(_file: &File) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn entry(success: bool) -> AuditEntry {
        AuditEntry {
            run_id: Uuid::new_v4(),
            success,
            user_query: "total units".to_string(),
            selected_columns: vec!["units".to_string()],
            selected_values: BTreeMap::new(),
            draft_sql: Some("SELECT SUM(units) FROM sampledb".to_string()),
            final_sql: Some("SELECT SUM(units) FROM sampledb".to_string()),
            comments: Some("ok".to_string()),
            error: None,
        }
    }

    #[test]
    fn test_partition_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(partition_file_name(date), "queries_2024-03-09.log");
    }

    #[test]
    fn test_directory_created_lazily() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("logs");
        let logger = AuditLogger::new(&dir);
        assert!(!dir.exists());

        let record = logger.try_record(entry(true)).unwrap();
        assert!(logger.partition_path(record.timestamp.date_naive()).exists());
    }

    #[test]
    fn test_records_append_and_read_back() {
        let temp = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp.path());
        let first = logger.try_record(entry(true)).unwrap();
        let second = logger.try_record(entry(false)).unwrap();
        assert!(second.timestamp >= first.timestamp);

        let date = first.timestamp.date_naive();
        let records = logger.read_partition(date).unwrap();
        if second.timestamp.date_naive() == date {
            assert_eq!(records.len(), 2);
            assert_eq!(records[1].run_id, second.run_id);
        } else {
            assert_eq!(records.len(), 1);
        }
        assert_eq!(records[0].run_id, first.run_id);
    }

    #[test]
    fn test_clamps_to_record_left_by_another_writer() {
        let temp = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp.path());

        // Final line written by a process whose clock ran ahead
        let date = Local::now().date_naive();
        let ahead = Local::now() + chrono::Duration::seconds(120);
        let seeded = AuditRecord::stamped(ahead, entry(true));
        fs::write(
            logger.partition_path(date),
            format!("{}\n", serde_json::to_string(&seeded).unwrap()),
        )
        .unwrap();

        let record = logger.try_record(entry(false)).unwrap();
        if Local::now().date_naive() == date {
            assert_eq!(record.timestamp, ahead);
            let records = logger.read_partition(date).unwrap();
            assert_eq!(records.len(), 2);
            assert!(records[0].timestamp <= records[1].timestamp);
        }
    }

    #[test]
    fn test_unwritable_dir_is_swallowed() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not_a_dir");
        fs::write(&blocker, b"file").unwrap();

        let logger = AuditLogger::new(&blocker);
        assert!(logger.try_record(entry(true)).is_err());
        // Must not panic or surface anything
        logger.record(entry(true));
    }

    #[test]
    fn test_corrupt_lines_skipped() {
        let temp = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp.path());
        let record = logger.try_record(entry(true)).unwrap();
        let path = logger.partition_path(record.timestamp.date_naive());
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();

        let records = logger.read_partition(record.timestamp.date_naive()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_missing_partition_is_empty() {
        let temp = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp.path());
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert!(logger.read_partition(date).unwrap().is_empty());
    }
}
