use std::{collections::VecDeque, sync::Arc};

use bytes::Bytes;

use crate::{
    cell::RowResult,
    client::connection::ConnectionInner,
    mutation::Scan,
    schema::TableName,
    util::Result,
};

/// Lazy iterator over the rows of a scan.
///
/// Rows are pulled from the cluster `caching` at a time. Once the range is
/// exhausted, an error has been yielded, or `close()` was called, the
/// scanner yields nothing more; it cannot be rewound.
pub struct ResultScanner {
    connection: Arc<ConnectionInner>,
    table: TableName,
    scan: Scan,
    caching: usize,
    buffer: VecDeque<RowResult>,
    /// Last row handed to the caller's buffer; the next batch starts after it
    last_row: Option<Bytes>,
    exhausted: bool,
}

impl ResultScanner {
    pub(crate) fn new(connection: Arc<ConnectionInner>, table: TableName, scan: Scan) -> Self {
        let caching = scan.caching.unwrap_or(connection.scanner_caching).max(1);
        ResultScanner {
            connection,
            table,
            scan,
            caching,
            buffer: VecDeque::new(),
            last_row: None,
            exhausted: false,
        }
    }

    fn fetch(&mut self) -> Result<()> {
        let cluster = self.connection.ensure_open()?;
        let batch =
            cluster.scan_batch(&self.table, &self.scan, self.last_row.as_ref(), self.caching)?;
        tracing::trace!(
            table = %self.table,
            rows = batch.rows.len(),
            more = batch.more,
            "scanner batch"
        );

        if let Some(last) = batch.rows.last() {
            self.last_row = Some(last.row().clone());
        }
        if !batch.more {
            self.exhausted = true;
        }
        self.buffer.extend(batch.rows);
        Ok(())
    }

    /// Stop the scan, dropping any buffered rows.
    pub fn close(&mut self) {
        self.exhausted = true;
        self.buffer.clear();
    }
}

impl Iterator for ResultScanner {
    type Item = Result<RowResult>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.buffer.pop_front() {
                return Some(Ok(row));
            }
            if self.exhausted {
                return None;
            }
            if let Err(e) = self.fetch() {
                self.close();
                return Some(Err(e));
            }
        }
    }
}
