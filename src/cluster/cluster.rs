use std::{
    collections::BTreeMap,
    fs,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};

use crate::{
    cell::{CellKey, KeyType, RowResult},
    cluster::{Clock, registry},
    config::{ClusterConfig, ServerOptions},
    memstore::{MemStore, ReadView, ScanBatch},
    mutation::{Delete, DeleteTarget, Get, Put, Scan},
    schema::{ColumnFamilyDescriptor, TableDescriptor, TableName},
    statistics::Statistics,
    util::{Result, Status},
    wal::{self, LogEntry},
};

struct TableState {
    descriptor: TableDescriptor,
    enabled: bool,
    store: Arc<MemStore>,
}

impl TableState {
    fn new(descriptor: TableDescriptor) -> Self {
        TableState {
            descriptor,
            enabled: true,
            store: Arc::new(MemStore::new()),
        }
    }
}

pub struct Cluster {
    host: String,
    port: u16,
    /// Catalog of tables, ordered by name
    tables: RwLock<BTreeMap<TableName, TableState>>,
    clock: Clock,
    /// Operation log, when the cluster has a data directory
    wal: Mutex<Option<wal::Writer>>,
    statistics: Arc<Statistics>,
    running: AtomicBool,
}

impl Cluster {
    /// Start a cluster and register it under `options.host:options.port`.
    ///
    /// Port 0 picks an unused port; read it back with `port()` or
    /// `client_config()`. With a data directory, the operation log found
    /// there is replayed before the cluster accepts connections.
    pub fn start(options: ServerOptions) -> Result<Arc<Cluster>> {
        registry::register_with(&options.host, options.port, |port| {
            let cluster = Cluster::open(&options, port)?;
            tracing::info!(
                address = %cluster.address(),
                durable = options.data_dir.is_some(),
                "cluster started"
            );
            Ok(Arc::new(cluster))
        })
    }

    fn open(options: &ServerOptions, port: u16) -> Result<Cluster> {
        let cluster = Cluster {
            host: options.host.clone(),
            port,
            tables: RwLock::new(BTreeMap::new()),
            clock: Clock::new(),
            wal: Mutex::new(None),
            statistics: Arc::new(Statistics::new()),
            running: AtomicBool::new(true),
        };

        if let Some(dir) = &options.data_dir {
            fs::create_dir_all(dir)
                .map_err(|e| Status::io_error(format!("Failed to create data dir: {e}")))?;
            let log_path = dir.join(wal::LOG_FILE_NAME);
            if log_path.exists() {
                let valid = cluster.replay(&log_path)?;
                // Drop a torn tail so new records follow the last good one.
                fs::OpenOptions::new()
                    .write(true)
                    .open(&log_path)
                    .and_then(|f| f.set_len(valid as u64))
                    .map_err(|e| Status::io_error(format!("Failed to truncate log: {e}")))?;
            }
            *cluster.wal.lock() = Some(wal::Writer::new(&log_path, options.sync_log)?);
        }
        Ok(cluster)
    }

    /// Replay the log at `path`. Returns the length of its intact prefix.
    fn replay(&self, path: &std::path::Path) -> Result<usize> {
        let mut reader = wal::Reader::new(path)?;
        let mut tables = self.tables.write();
        while let Some(entry) = reader.read_entry()? {
            Self::apply(&mut tables, &self.clock, entry)?;
            self.statistics.record_log_replay();
        }
        tracing::info!(
            entries = self.statistics.log_entries_replayed(),
            tables = tables.len(),
            "operation log replayed"
        );
        Ok(reader.offset())
    }

    /// Apply a logged operation to the catalog without re-logging it.
    fn apply(
        tables: &mut BTreeMap<TableName, TableState>,
        clock: &Clock,
        entry: LogEntry,
    ) -> Result<()> {
        let missing =
            |t: &TableName| Status::corruption(format!("log refers to unknown table '{t}'"));
        match entry {
            LogEntry::CreateTable { descriptor } => {
                tables.insert(descriptor.name().clone(), TableState::new(descriptor));
            }
            LogEntry::ModifyTable { descriptor } => {
                let state = tables
                    .get_mut(descriptor.name())
                    .ok_or_else(|| missing(descriptor.name()))?;
                state.descriptor = descriptor;
            }
            LogEntry::SetEnabled { table, enabled } => {
                tables.get_mut(&table).ok_or_else(|| missing(&table))?.enabled = enabled;
            }
            LogEntry::DeleteTable { table } => {
                tables.remove(&table).ok_or_else(|| missing(&table))?;
            }
            LogEntry::Mutate { table, entries } => {
                let state = tables.get(&table).ok_or_else(|| missing(&table))?;
                for (key, value) in entries {
                    clock.observe(key.timestamp);
                    state.store.add(key, value);
                }
            }
        }
        Ok(())
    }

    fn log(&self, entry: &LogEntry) -> Result<()> {
        if let Some(writer) = self.wal.lock().as_mut() {
            writer.append(entry)?;
            self.statistics.record_log_append();
        }
        Ok(())
    }

    /// Stop serving. Idempotent.
    pub fn shutdown(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            registry::deregister(&self.address(), self);
            if let Some(writer) = self.wal.lock().as_mut()
                && let Err(e) = writer.sync()
            {
                tracing::warn!(error = %e, "failed to sync operation log on shutdown");
            }
            tracing::info!(address = %self.address(), "cluster stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// A client config that resolves to this cluster.
    pub fn client_config(&self) -> ClusterConfig {
        ClusterConfig::new(self.host.clone(), self.port)
    }

    pub fn statistics(&self) -> &Arc<Statistics> {
        &self.statistics
    }

    fn ensure_running(&self) -> Result<()> {
        if self.is_running() {
            Ok(())
        } else {
            self.statistics.record_error();
            Err(Status::io_error(format!(
                "cluster at {} is not serving",
                self.address()
            )))
        }
    }

    fn failed<T>(&self, status: Status) -> Result<T> {
        self.statistics.record_error();
        Err(status)
    }

    // ---- Admin operations ----

    pub(crate) fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        self.ensure_running()?;
        let tables = self.tables.read();
        Ok(tables.values().map(|s| s.descriptor.clone()).collect())
    }

    pub(crate) fn table_exists(&self, name: &TableName) -> Result<bool> {
        self.ensure_running()?;
        Ok(self.tables.read().contains_key(name))
    }

    pub(crate) fn get_descriptor(&self, name: &TableName) -> Result<TableDescriptor> {
        self.ensure_running()?;
        match self.tables.read().get(name) {
            Some(state) => Ok(state.descriptor.clone()),
            None => self.failed(Status::table_not_found(name)),
        }
    }

    pub(crate) fn create_table(&self, descriptor: &TableDescriptor) -> Result<TableDescriptor> {
        self.ensure_running()?;
        descriptor.validate()?;

        let mut tables = self.tables.write();
        if tables.contains_key(descriptor.name()) {
            return self.failed(Status::table_exists(descriptor.name()));
        }
        let mut descriptor = descriptor.clone();
        descriptor.set_revision(1);

        self.log(&LogEntry::CreateTable {
            descriptor: descriptor.clone(),
        })?;
        tables.insert(descriptor.name().clone(), TableState::new(descriptor.clone()));
        self.statistics.record_table_created();
        tracing::info!(
            table = %descriptor.name(),
            families = ?descriptor.family_names(),
            "table created"
        );
        Ok(descriptor)
    }

    /// Replace a table's schema. `descriptor` must carry the current
    /// revision; anything older means the caller's copy is stale.
    pub(crate) fn modify_table(&self, descriptor: &TableDescriptor) -> Result<TableDescriptor> {
        self.ensure_running()?;
        descriptor.validate()?;

        let mut tables = self.tables.write();
        let Some(state) = tables.get_mut(descriptor.name()) else {
            return self.failed(Status::table_not_found(descriptor.name()));
        };
        if state.descriptor.revision() != descriptor.revision() {
            return self.failed(Status::concurrent_modification(format!(
                "descriptor of '{}' is at revision {}, got revision {}",
                descriptor.name(),
                state.descriptor.revision(),
                descriptor.revision()
            )));
        }
        let mut descriptor = descriptor.clone();
        descriptor.set_revision(state.descriptor.revision() + 1);

        self.log(&LogEntry::ModifyTable {
            descriptor: descriptor.clone(),
        })?;
        state.descriptor = descriptor.clone();
        self.statistics.record_table_modified();
        tracing::debug!(
            table = %descriptor.name(),
            revision = descriptor.revision(),
            "table modified"
        );
        Ok(descriptor)
    }

    /// Append one family in a single step under the catalog lock.
    pub(crate) fn add_column_family(
        &self,
        name: &TableName,
        family: ColumnFamilyDescriptor,
    ) -> Result<TableDescriptor> {
        self.ensure_running()?;
        let mut tables = self.tables.write();
        let Some(state) = tables.get_mut(name) else {
            return self.failed(Status::table_not_found(name));
        };
        let mut descriptor = state.descriptor.clone();
        descriptor.add_family(family)?;
        descriptor.set_revision(state.descriptor.revision() + 1);

        self.log(&LogEntry::ModifyTable {
            descriptor: descriptor.clone(),
        })?;
        state.descriptor = descriptor.clone();
        self.statistics.record_table_modified();
        Ok(descriptor)
    }

    pub(crate) fn set_enabled(&self, name: &TableName, enabled: bool) -> Result<()> {
        self.ensure_running()?;
        let mut tables = self.tables.write();
        let Some(state) = tables.get_mut(name) else {
            return self.failed(Status::table_not_found(name));
        };
        match (state.enabled, enabled) {
            (false, false) => return self.failed(Status::table_not_enabled(name)),
            (true, true) => {
                return self.failed(Status::invalid_argument(format!(
                    "table '{name}' is already enabled"
                )));
            }
            _ => {}
        }

        self.log(&LogEntry::SetEnabled {
            table: name.clone(),
            enabled,
        })?;
        state.enabled = enabled;
        tracing::debug!(table = %name, enabled, "table state changed");
        Ok(())
    }

    pub(crate) fn is_table_enabled(&self, name: &TableName) -> Result<bool> {
        self.ensure_running()?;
        match self.tables.read().get(name) {
            Some(state) => Ok(state.enabled),
            None => self.failed(Status::table_not_found(name)),
        }
    }

    pub(crate) fn delete_table(&self, name: &TableName) -> Result<()> {
        self.ensure_running()?;
        let mut tables = self.tables.write();
        let Some(state) = tables.get(name) else {
            return self.failed(Status::table_not_found(name));
        };
        if state.enabled {
            return self.failed(Status::table_not_disabled(name));
        }

        self.log(&LogEntry::DeleteTable {
            table: name.clone(),
        })?;
        tables.remove(name);
        self.statistics.record_table_dropped();
        tracing::info!(table = %name, "table deleted");
        Ok(())
    }

    // ---- Data operations ----

    /// Run `f` against an enabled table while holding the catalog read lock.
    fn with_enabled_table<T>(
        &self,
        name: &TableName,
        f: impl FnOnce(&TableDescriptor, &MemStore) -> Result<T>,
    ) -> Result<T> {
        self.ensure_running()?;
        let tables = self.tables.read();
        let Some(state) = tables.get(name) else {
            return self.failed(Status::table_not_found(name));
        };
        if !state.enabled {
            return self.failed(Status::table_not_enabled(name));
        }
        f(&state.descriptor, &state.store).inspect_err(|_| self.statistics.record_error())
    }

    fn check_families<'a>(
        descriptor: &TableDescriptor,
        families: impl IntoIterator<Item = &'a str>,
    ) -> Result<()> {
        for family in families {
            if !descriptor.has_family(family) {
                return Err(Status::no_such_column_family(descriptor.name(), family));
            }
        }
        Ok(())
    }

    pub(crate) fn put(&self, name: &TableName, put: &Put) -> Result<()> {
        put.validate()?;
        self.with_enabled_table(name, |descriptor, store| {
            Self::check_families(descriptor, put.columns().iter().map(|(f, _, _)| f.as_str()))?;

            let ts = self.clock.next();
            let entries: Vec<(CellKey, Bytes)> = put
                .columns()
                .iter()
                .map(|(family, qualifier, value)| {
                    let key = CellKey::new(
                        put.row().clone(),
                        family.clone(),
                        qualifier.clone(),
                        ts,
                        KeyType::Put,
                    );
                    (key, value.clone())
                })
                .collect();
            let bytes: usize = entries.iter().map(|(_, v)| v.len()).sum();

            self.log(&LogEntry::Mutate {
                table: name.clone(),
                entries: entries.clone(),
            })?;
            let cells = entries.len() as u64;
            for (key, value) in entries {
                store.add(key, value);
            }
            self.statistics.record_write(cells, bytes as u64);
            Ok(())
        })
    }

    pub(crate) fn delete(&self, name: &TableName, delete: &Delete) -> Result<()> {
        delete.validate()?;
        self.with_enabled_table(name, |descriptor, store| {
            Self::check_families(descriptor, delete.targets().iter().map(DeleteTarget::family))?;

            let ts = self.clock.next();
            let row = delete.row();
            let marker = |family: &str, qualifier: Bytes, ts: u64, key_type: KeyType| {
                (
                    CellKey::new(row.clone(), family, qualifier, ts, key_type),
                    Bytes::new(),
                )
            };

            let mut entries = Vec::new();
            if delete.is_row_delete() {
                for family in descriptor.family_names() {
                    entries.push(marker(family, Bytes::new(), ts, KeyType::DeleteFamily));
                }
            }
            for target in delete.targets() {
                match target {
                    DeleteTarget::LatestVersion { family, qualifier } => {
                        // Nothing to mask when the column has no visible version.
                        if let Some(latest) =
                            store.latest_timestamp(descriptor, row, family, qualifier)
                        {
                            entries.push(marker(
                                family.as_str(),
                                qualifier.clone(),
                                latest,
                                KeyType::Delete,
                            ));
                        }
                    }
                    DeleteTarget::AllVersions { family, qualifier } => {
                        entries.push(marker(
                            family.as_str(),
                            qualifier.clone(),
                            ts,
                            KeyType::DeleteColumn,
                        ));
                    }
                    DeleteTarget::Family { family } => {
                        entries.push(marker(
                            family.as_str(),
                            Bytes::new(),
                            ts,
                            KeyType::DeleteFamily,
                        ));
                    }
                }
            }
            if entries.is_empty() {
                return Ok(());
            }

            self.log(&LogEntry::Mutate {
                table: name.clone(),
                entries: entries.clone(),
            })?;
            let markers = entries.len() as u64;
            for (key, value) in entries {
                store.add(key, value);
            }
            self.statistics.record_delete(markers);
            Ok(())
        })
    }

    pub(crate) fn get(&self, name: &TableName, get: &Get) -> Result<RowResult> {
        self.with_enabled_table(name, |descriptor, store| {
            Self::check_families(descriptor, get.filter.families())?;
            let view = ReadView {
                descriptor,
                filter: &get.filter,
                max_versions: get.max_versions,
            };
            self.statistics.record_row_read();
            Ok(RowResult::new(get.row.clone(), store.read_row(&get.row, &view)))
        })
    }

    /// One scanner round trip: up to `limit` rows after `resume_after`.
    pub(crate) fn scan_batch(
        &self,
        name: &TableName,
        scan: &Scan,
        resume_after: Option<&Bytes>,
        limit: usize,
    ) -> Result<ScanBatch> {
        self.with_enabled_table(name, |descriptor, store| {
            Self::check_families(descriptor, scan.filter.families())?;
            let view = ReadView {
                descriptor,
                filter: &scan.filter,
                max_versions: scan.max_versions,
            };
            let batch = store.scan_rows(scan, &view, resume_after, limit.max(1));
            self.statistics.record_scanner_batch(batch.rows.len() as u64);
            Ok(batch)
        })
    }

    /// Approximate bytes held by a table's cells and markers.
    pub fn table_memory_usage(&self, name: &TableName) -> Option<usize> {
        self.tables
            .read()
            .get(name)
            .map(|s| s.store.approximate_memory_usage())
    }
}
