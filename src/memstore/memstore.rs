use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use bytes::Bytes;
use crossbeam_skiplist::SkipMap;

use crate::{
    cell::{Cell, CellKey, KeyType, RowResult},
    mutation::{ColumnFilter, Scan},
    schema::TableDescriptor,
};

/// What a read is allowed to see: the current schema, the requested
/// columns, and how many versions per column.
pub struct ReadView<'a> {
    pub descriptor: &'a TableDescriptor,
    pub filter: &'a ColumnFilter,
    pub max_versions: u32,
}

/// One round trip of a scanner.
#[derive(Debug, Default)]
pub struct ScanBatch {
    pub rows: Vec<RowResult>,
    /// False once the scan range is known to be exhausted.
    pub more: bool,
}

pub struct MemStore {
    map: SkipMap<CellKey, Bytes>,
    approximate_memory: AtomicUsize,
}

impl MemStore {
    pub fn new() -> Self {
        MemStore {
            map: SkipMap::new(),
            approximate_memory: AtomicUsize::new(0),
        }
    }

    pub fn add(&self, key: CellKey, value: Bytes) {
        let mem_usage = key.row.len() + key.family.len() + key.qualifier.len() + 9 + value.len();
        self.approximate_memory.fetch_add(mem_usage, Ordering::Relaxed);
        self.map.insert(key, value);
    }

    /// Timestamp of the newest visible version of a column, if any.
    pub fn latest_timestamp(
        &self,
        descriptor: &TableDescriptor,
        row: &Bytes,
        family: &str,
        qualifier: &Bytes,
    ) -> Option<u64> {
        let mut filter = ColumnFilter::default();
        filter.add_column(family, qualifier);
        let view = ReadView {
            descriptor,
            filter: &filter,
            max_versions: 1,
        };
        self.read_row(row, &view).first().map(|c| c.timestamp)
    }

    pub fn read_row(&self, row: &Bytes, view: &ReadView<'_>) -> Vec<Cell> {
        let entries: Vec<(CellKey, Bytes)> = self
            .map
            .range(CellKey::first_on_row(row.clone())..)
            .take_while(|entry| entry.key().row == *row)
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        resolve_row(&entries, view)
    }

    /// Collect up to `limit` non-empty rows of `scan`, starting after
    /// `resume_after` when a previous batch ended there.
    pub fn scan_rows(
        &self,
        scan: &Scan,
        view: &ReadView<'_>,
        resume_after: Option<&Bytes>,
        limit: usize,
    ) -> ScanBatch {
        let start = match resume_after {
            Some(row) => row.clone(),
            None => scan.start_row.clone().unwrap_or_default(),
        };

        let mut batch = ScanBatch::default();
        let mut pending: Vec<(CellKey, Bytes)> = Vec::new();

        for entry in self.map.range(CellKey::first_on_row(start)..) {
            let key = entry.key();
            if resume_after.is_some_and(|r| key.row == *r) {
                continue;
            }

            if pending.first().is_some_and(|(k, _)| k.row != key.row) {
                flush_row(&mut pending, view, &mut batch.rows);
                if batch.rows.len() >= limit {
                    batch.more = true;
                    return batch;
                }
            }

            if pending.is_empty() && scan.is_past_stop(&key.row) {
                return batch;
            }
            pending.push((key.clone(), entry.value().clone()));
        }

        flush_row(&mut pending, view, &mut batch.rows);
        batch
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn approximate_memory_usage(&self) -> usize {
        self.approximate_memory.load(Ordering::Relaxed)
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

fn flush_row(pending: &mut Vec<(CellKey, Bytes)>, view: &ReadView<'_>, rows: &mut Vec<RowResult>) {
    let Some((first, _)) = pending.first() else {
        return;
    };
    let row = first.row.clone();
    let cells = resolve_row(pending, view);
    pending.clear();
    if !cells.is_empty() {
        rows.push(RowResult::new(row, cells));
    }
}

/// Apply delete markers, schema, filter and version limits to the sorted
/// entries of one row.
fn resolve_row(entries: &[(CellKey, Bytes)], view: &ReadView<'_>) -> Vec<Cell> {
    let mut family_deletes: HashMap<&str, u64> = HashMap::new();
    for (key, _) in entries {
        if key.key_type == KeyType::DeleteFamily && view.filter.matches_family(&key.family) {
            let ts = family_deletes.entry(key.family.as_str()).or_insert(0);
            *ts = (*ts).max(key.timestamp);
        }
    }

    let mut cells = Vec::new();
    let mut column: Option<&CellKey> = None;
    let mut column_delete: Option<u64> = None;
    let mut version_deletes: Vec<u64> = Vec::new();
    let mut emitted = 0u32;

    for (key, value) in entries {
        if key.key_type == KeyType::DeleteFamily {
            continue;
        }
        if !column.is_some_and(|c| c.same_column(key)) {
            column = Some(key);
            column_delete = None;
            version_deletes.clear();
            emitted = 0;
        }

        match key.key_type {
            KeyType::DeleteColumn => {
                column_delete =
                    Some(column_delete.map_or(key.timestamp, |ts| ts.max(key.timestamp)));
            }
            KeyType::Delete => version_deletes.push(key.timestamp),
            KeyType::Put => {
                let Some(family) = view.descriptor.family(&key.family) else {
                    continue;
                };
                if !view.filter.matches(&key.family, &key.qualifier) {
                    continue;
                }
                let masked = family_deletes
                    .get(key.family.as_str())
                    .is_some_and(|&ts| key.timestamp <= ts)
                    || column_delete.is_some_and(|ts| key.timestamp <= ts)
                    || version_deletes.contains(&key.timestamp);
                if masked || emitted >= view.max_versions.min(family.max_versions) {
                    continue;
                }
                emitted += 1;
                cells.push(Cell::from_entry(key, value.clone()));
            }
            KeyType::DeleteFamily => {}
        }
    }
    cells
}
