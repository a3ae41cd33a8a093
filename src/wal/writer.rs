use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use crate::util::{Result, Status};
use crate::wal::{
    LogEntry,
    log_format::{HEADER_SIZE, MAX_RECORD_SIZE, calculate_checksum, encode_header},
};

/// Appends records to the operation log.
///
/// Every record is written at the end of the last good record. A failed
/// append is rolled back so later records never follow a partial one; if
/// the rollback fails too, the writer refuses further appends.
pub struct Writer {
    file: File,
    /// Length of the file when it was opened
    base: u64,
    /// Bytes appended through this writer
    offset: usize,
    sync: bool,
    poisoned: bool,
}

impl Writer {
    /// Open the log for appending, creating it if needed.
    pub fn new<P: AsRef<Path>>(path: P, sync: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|e| Status::io_error(format!("Failed to open log file: {e}")))?;
        let base = file
            .metadata()
            .map_err(|e| Status::io_error(format!("Failed to stat log file: {e}")))?
            .len();

        Ok(Writer {
            file,
            base,
            offset: 0,
            sync,
            poisoned: false,
        })
    }

    pub fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let payload = serde_json::to_vec(entry)?;
        self.add_record(&payload)
    }

    pub fn add_record(&mut self, data: &[u8]) -> Result<()> {
        if self.poisoned {
            return Err(Status::io_error("Log writer is unusable after a failed append"));
        }
        if data.len() > MAX_RECORD_SIZE {
            return Err(Status::invalid_argument("Record too large"));
        }
        let length = data.len() as u32;
        let header = encode_header(calculate_checksum(length, data), length);

        let mut buf = Vec::with_capacity(HEADER_SIZE + data.len());
        buf.extend_from_slice(&header);
        buf.extend_from_slice(data);
        if let Err(e) = self.write_at_end(&buf) {
            self.rollback();
            return Err(Status::io_error(format!("Write record failed: {e}")));
        }
        self.offset += buf.len();

        if self.sync {
            self.sync()?;
        }
        Ok(())
    }

    /// File position just past the last record this writer completed.
    fn end(&self) -> u64 {
        self.base + self.offset as u64
    }

    fn write_at_end(&mut self, buf: &[u8]) -> std::io::Result<()> {
        let end = self.end();
        self.file.seek(SeekFrom::Start(end))?;
        self.file.write_all(buf)
    }

    /// Cut off whatever a failed append left behind.
    fn rollback(&mut self) {
        let end = self.end();
        if let Err(e) = self.file.set_len(end) {
            tracing::error!(error = %e, end, "failed to roll back operation log");
            self.poisoned = true;
        }
    }

    pub fn sync(&mut self) -> Result<()> {
        self.file
            .sync_all()
            .map_err(|e| Status::io_error(format!("Sync failed: {e}")))
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}
