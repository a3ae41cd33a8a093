/// The embedded column-family store that clients connect to.
///
/// A `Cluster` owns a catalog of tables, each with its descriptor, an
/// enabled flag and a `MemStore`. It registers itself under `host:port` in a
/// process-wide registry, which is how `Connection::open` finds it from a
/// quorum list.
///
/// # Lifecycle
///
/// ```text
/// Cluster::start(options) → replay operation log (if data_dir) → register
///         ↓
/// clients connect, create/modify/disable/delete tables, put/delete/scan
///         ↓
/// shutdown() → deregister; open connections now fail with IOError
/// ```
#[allow(clippy::module_inception)]
mod cluster;
mod clock;
pub mod registry;

pub use clock::Clock;
pub use cluster::Cluster;
