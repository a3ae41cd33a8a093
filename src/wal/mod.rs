pub mod log_entry;
pub mod log_format;
pub mod reader;
pub mod writer;

pub use log_entry::LogEntry;
pub use log_format::HEADER_SIZE;
pub use reader::Reader;
pub use writer::Writer;

/// File name of the operation log inside a cluster's data directory.
pub const LOG_FILE_NAME: &str = "cluster.log";
