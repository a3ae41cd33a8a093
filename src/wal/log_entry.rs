use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{
    cell::CellKey,
    schema::{TableDescriptor, TableName},
};

/// One durable cluster operation. Replaying the entries of a log in order
/// rebuilds the catalog and every table's cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LogEntry {
    CreateTable {
        descriptor: TableDescriptor,
    },
    ModifyTable {
        descriptor: TableDescriptor,
    },
    SetEnabled {
        table: TableName,
        enabled: bool,
    },
    DeleteTable {
        table: TableName,
    },
    /// Cells and delete markers of one put or delete, already stamped.
    Mutate {
        table: TableName,
        entries: Vec<(CellKey, Bytes)>,
    },
}
