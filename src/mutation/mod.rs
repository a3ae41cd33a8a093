//! Request types sent from a `Table` handle to the cluster.
pub mod delete;
pub mod put;
pub mod query;

pub use delete::{Delete, DeleteTarget};
pub use put::Put;
pub use query::{ColumnFilter, Get, Scan};

use bytes::Bytes;

pub(crate) fn to_bytes(data: impl AsRef<[u8]>) -> Bytes {
    Bytes::copy_from_slice(data.as_ref())
}
