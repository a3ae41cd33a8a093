/// Client handles onto a running cluster.
///
/// ```text
/// Connection::open(config)       resolves quorum → Cluster
///  ├─→ admin()                   table lifecycle and schema
///  └─→ table(name)               put / delete / get / scanner
///                                 └─→ ResultScanner (lazy, batched)
/// ```
///
/// Closing the connection invalidates every handle obtained from it.
mod admin;
mod connection;
mod scanner;
mod table;

pub use admin::Admin;
pub use connection::Connection;
pub use scanner::ResultScanner;
pub use table::Table;
