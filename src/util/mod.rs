pub mod status;

pub use status::{Code, ErrorKind, Result, Status};
