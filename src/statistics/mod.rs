use std::sync::atomic::{AtomicU64, Ordering};

/// Cluster-wide statistics
///
/// Atomic counters updated by the cluster as it serves requests.
#[derive(Debug, Default)]
pub struct Statistics {
    // Table lifecycle
    pub tables_created: AtomicU64,
    pub tables_modified: AtomicU64,
    pub tables_dropped: AtomicU64,

    // Cell traffic
    pub cells_written: AtomicU64,
    pub cells_deleted: AtomicU64,
    pub bytes_written: AtomicU64,
    pub rows_read: AtomicU64,

    // Scanners
    pub scanner_batches: AtomicU64,
    pub rows_scanned: AtomicU64,

    // Operation log
    pub log_appends: AtomicU64,
    pub log_entries_replayed: AtomicU64,

    pub num_errors: AtomicU64,
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    #[inline]
    pub fn record_table_created(&self) {
        self.tables_created.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_table_modified(&self) {
        self.tables_modified.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_table_dropped(&self) {
        self.tables_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write(&self, cells: u64, bytes: u64) {
        self.cells_written.fetch_add(cells, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_delete(&self, markers: u64) {
        self.cells_deleted.fetch_add(markers, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_row_read(&self) {
        self.rows_read.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_scanner_batch(&self, rows: u64) {
        self.scanner_batches.fetch_add(1, Ordering::Relaxed);
        self.rows_scanned.fetch_add(rows, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_log_append(&self) {
        self.log_appends.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_log_replay(&self) {
        self.log_entries_replayed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_error(&self) {
        self.num_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cells_written(&self) -> u64 {
        self.cells_written.load(Ordering::Relaxed)
    }

    pub fn cells_deleted(&self) -> u64 {
        self.cells_deleted.load(Ordering::Relaxed)
    }

    pub fn rows_scanned(&self) -> u64 {
        self.rows_scanned.load(Ordering::Relaxed)
    }

    pub fn scanner_batches(&self) -> u64 {
        self.scanner_batches.load(Ordering::Relaxed)
    }

    pub fn tables_created(&self) -> u64 {
        self.tables_created.load(Ordering::Relaxed)
    }

    pub fn tables_dropped(&self) -> u64 {
        self.tables_dropped.load(Ordering::Relaxed)
    }

    pub fn log_entries_replayed(&self) -> u64 {
        self.log_entries_replayed.load(Ordering::Relaxed)
    }

    pub fn num_errors(&self) -> u64 {
        self.num_errors.load(Ordering::Relaxed)
    }

    /// Average rows returned per scanner round trip.
    pub fn rows_per_batch(&self) -> f64 {
        let batches = self.scanner_batches();
        if batches == 0 {
            return 0.0;
        }
        self.rows_scanned() as f64 / batches as f64
    }

    /// Get a formatted statistics report
    pub fn report(&self) -> String {
        format!(
            "Cluster Statistics:\n\
            \n\
            Tables:\n\
            - Created:       {}\n\
            - Modified:      {}\n\
            - Dropped:       {}\n\
            \n\
            Cells:\n\
            - Written:       {}\n\
            - Deleted:       {}\n\
            - Bytes written: {}\n\
            - Rows read:     {}\n\
            \n\
            Scanners:\n\
            - Batches:       {}\n\
            - Rows scanned:  {}\n\
            - Rows/batch:    {:.2}\n\
            \n\
            Log:\n\
            - Appends:       {}\n\
            - Replayed:      {}\n\
            \n\
            Errors:          {}",
            self.tables_created(),
            self.tables_modified.load(Ordering::Relaxed),
            self.tables_dropped(),
            self.cells_written(),
            self.cells_deleted(),
            self.bytes_written.load(Ordering::Relaxed),
            self.rows_read.load(Ordering::Relaxed),
            self.scanner_batches(),
            self.rows_scanned(),
            self.rows_per_batch(),
            self.log_appends.load(Ordering::Relaxed),
            self.log_entries_replayed(),
            self.num_errors(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_basic() {
        let stats = Statistics::new();

        stats.record_write(3, 100);
        stats.record_write(1, 20);
        stats.record_delete(2);

        assert_eq!(stats.cells_written(), 4);
        assert_eq!(stats.cells_deleted(), 2);
        assert_eq!(stats.bytes_written.load(Ordering::Relaxed), 120);
    }

    #[test]
    fn test_rows_per_batch() {
        let stats = Statistics::new();
        assert_eq!(stats.rows_per_batch(), 0.0);

        stats.record_scanner_batch(3);
        stats.record_scanner_batch(1);
        assert_eq!(stats.rows_per_batch(), 2.0);
    }

    #[test]
    fn test_report() {
        let stats = Statistics::new();
        stats.record_table_created();
        let report = stats.report();
        assert!(report.contains("Created:       1"));
    }
}
