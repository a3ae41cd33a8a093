use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    Connection,
    Closed,
    TableNotFound,
    TableExists,
    TableNotEnabled,
    TableNotDisabled,
    NoSuchColumnFamily,
    ConcurrentModification,
    InvalidArgument,
    IOError,
    Corruption,
}

/// The two failure classes a caller has to tell apart.
///
/// `Connection` means the cluster could not be located or the handles could
/// not be created; every other failure happens while talking to a cluster
/// and is an `Operation` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Operation,
}

#[derive(Debug, Clone)]
pub struct Status {
    code: Code,
    message: Option<String>,
}

impl Status {
    fn with_code(code: Code, msg: impl Into<String>) -> Self {
        Status {
            code,
            message: Some(msg.into()),
        }
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::with_code(Code::Connection, msg)
    }

    pub fn closed(msg: impl Into<String>) -> Self {
        Self::with_code(Code::Closed, msg)
    }

    pub fn table_not_found(table: impl fmt::Display) -> Self {
        Self::with_code(Code::TableNotFound, format!("table '{table}' does not exist"))
    }

    pub fn table_exists(table: impl fmt::Display) -> Self {
        Self::with_code(Code::TableExists, format!("table '{table}' already exists"))
    }

    pub fn table_not_enabled(table: impl fmt::Display) -> Self {
        Self::with_code(Code::TableNotEnabled, format!("table '{table}' is disabled"))
    }

    pub fn table_not_disabled(table: impl fmt::Display) -> Self {
        Self::with_code(
            Code::TableNotDisabled,
            format!("table '{table}' must be disabled first"),
        )
    }

    pub fn no_such_column_family(table: impl fmt::Display, family: &str) -> Self {
        Self::with_code(
            Code::NoSuchColumnFamily,
            format!("column family '{family}' does not exist in table '{table}'"),
        )
    }

    pub fn concurrent_modification(msg: impl Into<String>) -> Self {
        Self::with_code(Code::ConcurrentModification, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::with_code(Code::InvalidArgument, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::with_code(Code::IOError, msg)
    }

    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::with_code(Code::Corruption, msg)
    }

    pub fn kind(&self) -> ErrorKind {
        match self.code {
            Code::Connection => ErrorKind::Connection,
            _ => ErrorKind::Operation,
        }
    }

    pub fn is_connection_error(&self) -> bool {
        self.kind() == ErrorKind::Connection
    }

    pub fn is_operation_error(&self) -> bool {
        self.kind() == ErrorKind::Operation
    }

    pub fn is_table_not_found(&self) -> bool {
        self.code == Code::TableNotFound
    }

    pub fn is_closed(&self) -> bool {
        self.code == Code::Closed
    }

    pub fn is_corruption(&self) -> bool {
        self.code == Code::Corruption
    }

    pub fn code(&self) -> &Code {
        &self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{:?}: {}", self.code, msg),
            None => write!(f, "{:?}", self.code),
        }
    }
}

impl std::error::Error for Status {}

impl From<std::io::Error> for Status {
    fn from(err: std::io::Error) -> Self {
        Status::io_error(err.to_string())
    }
}

impl From<serde_json::Error> for Status {
    fn from(err: serde_json::Error) -> Self {
        Status::corruption(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Status>;
