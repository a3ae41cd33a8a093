pub mod cell;
pub mod client;
pub mod cluster;
pub mod config;
pub mod memstore;
pub mod mutation;
pub mod schema;
pub mod session;
pub mod statistics;
pub mod util;
pub mod wal;
pub mod walkthrough;

pub use cell::{Cell, RowResult};
pub use client::{Admin, Connection, ResultScanner, Table};
pub use cluster::Cluster;
pub use config::{ClusterConfig, ServerOptions};
pub use mutation::{Delete, Get, Put, Scan};
pub use schema::{ColumnFamilyDescriptor, TableDescriptor, TableName};
pub use session::Session;
pub use statistics::Statistics;
pub use util::{Code, ErrorKind, Result, Status};
