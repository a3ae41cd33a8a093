use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;

use crate::mutation::to_bytes;

/// Restricts a read to some families or columns. Empty means everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFilter {
    // `None` selects the whole family.
    families: BTreeMap<String, Option<BTreeSet<Bytes>>>,
}

impl ColumnFilter {
    pub fn add_family(&mut self, family: impl Into<String>) {
        self.families.insert(family.into(), None);
    }

    pub fn add_column(&mut self, family: impl Into<String>, qualifier: impl AsRef<[u8]>) {
        let entry = self
            .families
            .entry(family.into())
            .or_insert_with(|| Some(BTreeSet::new()));
        // A whole-family selection already covers the column.
        if let Some(qualifiers) = entry {
            qualifiers.insert(to_bytes(qualifier));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    pub fn matches(&self, family: &str, qualifier: &[u8]) -> bool {
        if self.families.is_empty() {
            return true;
        }
        match self.families.get(family) {
            None => false,
            Some(None) => true,
            Some(Some(qualifiers)) => qualifiers.contains(qualifier),
        }
    }

    pub fn matches_family(&self, family: &str) -> bool {
        self.families.is_empty() || self.families.contains_key(family)
    }
}

/// Point read of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Get {
    pub row: Bytes,
    pub filter: ColumnFilter,
    pub max_versions: u32,
}

impl Get {
    pub fn new(row: impl AsRef<[u8]>) -> Self {
        Get {
            row: to_bytes(row),
            filter: ColumnFilter::default(),
            max_versions: 1,
        }
    }

    pub fn add_family(mut self, family: impl Into<String>) -> Self {
        self.filter.add_family(family);
        self
    }

    pub fn add_column(mut self, family: impl Into<String>, qualifier: impl AsRef<[u8]>) -> Self {
        self.filter.add_column(family, qualifier);
        self
    }

    pub fn with_max_versions(mut self, max_versions: u32) -> Self {
        self.max_versions = max_versions;
        self
    }
}

/// Range read over rows in row key order. `stop_row` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan {
    pub start_row: Option<Bytes>,
    pub stop_row: Option<Bytes>,
    pub filter: ColumnFilter,
    pub max_versions: u32,
    /// Rows per round trip; `None` uses the connection's `scanner_caching`.
    pub caching: Option<usize>,
}

impl Default for Scan {
    fn default() -> Self {
        Scan {
            start_row: None,
            stop_row: None,
            filter: ColumnFilter::default(),
            max_versions: 1,
            caching: None,
        }
    }
}

impl Scan {
    pub fn new() -> Self {
        Scan::default()
    }

    pub fn with_start_row(mut self, row: impl AsRef<[u8]>) -> Self {
        self.start_row = Some(to_bytes(row));
        self
    }

    pub fn with_stop_row(mut self, row: impl AsRef<[u8]>) -> Self {
        self.stop_row = Some(to_bytes(row));
        self
    }

    pub fn add_family(mut self, family: impl Into<String>) -> Self {
        self.filter.add_family(family);
        self
    }

    pub fn add_column(mut self, family: impl Into<String>, qualifier: impl AsRef<[u8]>) -> Self {
        self.filter.add_column(family, qualifier);
        self
    }

    pub fn with_max_versions(mut self, max_versions: u32) -> Self {
        self.max_versions = max_versions;
        self
    }

    pub fn with_caching(mut self, caching: usize) -> Self {
        self.caching = Some(caching);
        self
    }

    pub fn is_past_stop(&self, row: &[u8]) -> bool {
        self.stop_row
            .as_ref()
            .is_some_and(|stop| row >= stop.as_ref())
    }
}
