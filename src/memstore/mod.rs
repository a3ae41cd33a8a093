//! Sorted, versioned in-memory cell storage for one table.
//!
//! Puts and delete markers live side by side in a lock-free skip list keyed
//! by `CellKey`. Nothing is overwritten in place: a read resolves the
//! versions of each column against the markers that cover them.
//!
//! ```text
//! r1/A/x @7 Put "v2"        <- visible (newest)
//! r1/A/x @5 DeleteColumn    <- masks everything below
//! r1/A/x @3 Put "v1"        <- hidden
//! r1/B/y @4 Put "w"
//! r2/...
//! ```
#[allow(clippy::module_inception)]
pub mod memstore;

pub use memstore::{MemStore, ReadView, ScanBatch};
