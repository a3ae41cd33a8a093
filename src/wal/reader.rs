use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::util::{Result, Status};
use crate::wal::{
    LogEntry,
    log_format::{HEADER_SIZE, MAX_RECORD_SIZE, calculate_checksum, decode_header},
};

/// Reads records back from the operation log, in append order.
pub struct Reader {
    file: BufReader<File>,
    /// Offset just past the last complete record
    offset: usize,
}

impl Reader {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Status::io_error(format!("Failed to open log file: {e}")))?;

        Ok(Reader {
            file: BufReader::new(file),
            offset: 0,
        })
    }

    pub fn read_entry(&mut self) -> Result<Option<LogEntry>> {
        match self.read_record()? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    /// Next record, or `None` at end of log. A partially written record at
    /// the end is treated as end of log.
    pub fn read_record(&mut self) -> Result<Option<Vec<u8>>> {
        let mut header = [0u8; HEADER_SIZE];
        if !self.read_full(&mut header)? {
            return Ok(None);
        }

        let (checksum, length) = decode_header(&header);
        if length as usize > MAX_RECORD_SIZE {
            return Err(Status::corruption(format!(
                "Record length {length} at offset {} exceeds limit",
                self.offset
            )));
        }

        let mut data = vec![0u8; length as usize];
        if !self.read_full(&mut data)? {
            return Ok(None);
        }

        let expected = calculate_checksum(length, &data);
        if checksum != expected {
            return Err(Status::corruption(format!(
                "Checksum mismatch at offset {}: expected {expected}, got {checksum}",
                self.offset
            )));
        }

        self.offset += HEADER_SIZE + data.len();
        Ok(Some(data))
    }

    // False on a clean or torn end of file.
    fn read_full(&mut self, buf: &mut [u8]) -> Result<bool> {
        match self.file.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(Status::io_error(format!("Read record failed: {e}"))),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use std::fs::OpenOptions;
    use std::io::Write;

    use super::*;
    use crate::wal::writer::Writer;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_write_records() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        {
            let mut writer = Writer::new(path, false).unwrap();
            for i in 0..50 {
                writer.add_record(format!("record_{i}").as_bytes()).unwrap();
            }
        }

        let mut reader = Reader::new(path).unwrap();
        for i in 0..50 {
            let data = reader.read_record().unwrap().unwrap();
            assert_eq!(data, format!("record_{i}").as_bytes());
        }
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_torn_tail_is_ignored() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        {
            let mut writer = Writer::new(path, false).unwrap();
            writer.add_record(b"complete").unwrap();
            writer.add_record(b"this one gets cut").unwrap();
        }
        let len = std::fs::metadata(path).unwrap().len();
        let file = OpenOptions::new().write(true).open(path).unwrap();
        file.set_len(len - 5).unwrap();

        let mut reader = Reader::new(path).unwrap();
        assert_eq!(reader.read_record().unwrap().unwrap(), b"complete");
        assert!(reader.read_record().unwrap().is_none());
        assert_eq!(reader.offset(), HEADER_SIZE + b"complete".len());
    }

    #[test]
    fn test_checksum_mismatch() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        {
            let mut writer = Writer::new(path, false).unwrap();
            writer.add_record(b"payload").unwrap();
        }
        let mut bytes = std::fs::read(path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let mut file = OpenOptions::new().write(true).truncate(true).open(path).unwrap();
        file.write_all(&bytes).unwrap();

        let mut reader = Reader::new(path).unwrap();
        assert!(reader.read_record().unwrap_err().is_corruption());
    }
}
