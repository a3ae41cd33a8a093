use std::cmp::Ordering;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Kind of entry stored at a cell coordinate.
///
/// Declaration order matters: at equal coordinates and timestamp, delete
/// markers sort before the put they mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Masks every cell of the family in this row with timestamp <= ts.
    DeleteFamily,
    /// Masks every version of the column with timestamp <= ts.
    DeleteColumn,
    /// Masks exactly the version at ts.
    Delete,
    Put,
}

/// Sort key of an entry in a table's memstore.
///
/// Entries are ordered by row, family and qualifier ascending, then by
/// timestamp descending so the newest version of a column comes first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub row: Bytes,
    pub family: String,
    pub qualifier: Bytes,
    pub timestamp: u64,
    pub key_type: KeyType,
}

impl CellKey {
    pub fn new(
        row: Bytes,
        family: impl Into<String>,
        qualifier: Bytes,
        timestamp: u64,
        key_type: KeyType,
    ) -> Self {
        CellKey {
            row,
            family: family.into(),
            qualifier,
            timestamp,
            key_type,
        }
    }

    /// The smallest possible key of `row`; seeking to it lands on the
    /// row's first entry.
    pub fn first_on_row(row: Bytes) -> Self {
        CellKey {
            row,
            family: String::new(),
            qualifier: Bytes::new(),
            timestamp: u64::MAX,
            key_type: KeyType::DeleteFamily,
        }
    }

    pub fn same_column(&self, other: &CellKey) -> bool {
        self.row == other.row && self.family == other.family && self.qualifier == other.qualifier
    }
}

impl Ord for CellKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.family.cmp(&other.family))
            .then_with(|| self.qualifier.cmp(&other.qualifier))
            .then_with(|| other.timestamp.cmp(&self.timestamp))
            .then_with(|| self.key_type.cmp(&other.key_type))
    }
}

impl PartialOrd for CellKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One visible version of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub row: Bytes,
    pub family: String,
    pub qualifier: Bytes,
    pub timestamp: u64,
    pub value: Bytes,
}

impl Cell {
    pub(crate) fn from_entry(key: &CellKey, value: Bytes) -> Self {
        Cell {
            row: key.row.clone(),
            family: key.family.clone(),
            qualifier: key.qualifier.clone(),
            timestamp: key.timestamp,
            value,
        }
    }
}

/// Renders as `family:qualifier, value=value`, the way a shell scan shows a
/// cell after its row key.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}, value={}",
            self.family,
            String::from_utf8_lossy(&self.qualifier),
            String::from_utf8_lossy(&self.value)
        )
    }
}

/// The visible cells of one row, in family/qualifier order with newer
/// versions first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowResult {
    row: Bytes,
    cells: Vec<Cell>,
}

impl RowResult {
    pub fn new(row: Bytes, cells: Vec<Cell>) -> Self {
        RowResult { row, cells }
    }

    pub fn row(&self) -> &Bytes {
        &self.row
    }

    pub fn row_lossy(&self) -> String {
        String::from_utf8_lossy(&self.row).into_owned()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Latest value of a column, if the row has one.
    pub fn value(&self, family: &str, qualifier: &[u8]) -> Option<&Bytes> {
        self.cells
            .iter()
            .find(|c| c.family == family && c.qualifier == qualifier)
            .map(|c| &c.value)
    }
}
