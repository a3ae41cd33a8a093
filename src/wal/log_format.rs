/// Operation log file format
///
/// The log is a flat sequence of records appended one after another. Each
/// record carries one JSON-encoded `LogEntry`.
///
/// Record format:
/// +----------+---------+---------+
/// | Checksum | Length  | Data    |
/// +----------+---------+---------+
/// | 4 bytes  | 4 bytes | N bytes |
/// +----------+---------+---------+
///
/// The checksum is CRC32 over the length field and the data. A record cut
/// short at the end of the file is a torn append and is dropped on replay.
use crc32fast::Hasher;

/// Header size: checksum(4) + length(4) = 8 bytes
pub const HEADER_SIZE: usize = 8;

/// Largest payload a single record may carry.
pub const MAX_RECORD_SIZE: usize = 64 * 1024 * 1024;

pub fn calculate_checksum(length: u32, data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&length.to_le_bytes());
    hasher.update(data);
    hasher.finalize()
}

pub fn encode_header(checksum: u32, length: u32) -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(&checksum.to_le_bytes());
    header[4..8].copy_from_slice(&length.to_le_bytes());
    header
}

/// Returns: (checksum, length)
pub fn decode_header(header: &[u8; HEADER_SIZE]) -> (u32, u32) {
    let checksum = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let length = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    (checksum, length)
}
