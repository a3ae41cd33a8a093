use std::sync::Arc;

use crate::{
    cell::RowResult,
    client::{ResultScanner, connection::ConnectionInner},
    mutation::{Delete, Get, Put, Scan},
    schema::TableName,
    util::Result,
};

/// Row-level handle on one table.
pub struct Table {
    connection: Arc<ConnectionInner>,
    name: TableName,
}

impl Table {
    pub(crate) fn new(connection: Arc<ConnectionInner>, name: TableName) -> Self {
        Table { connection, name }
    }

    pub fn name(&self) -> &TableName {
        &self.name
    }

    pub fn put(&self, put: &Put) -> Result<()> {
        tracing::debug!(table = %self.name, columns = put.columns().len(), "put");
        self.connection.ensure_open()?.put(&self.name, put)
    }

    /// Apply puts in order, stopping at the first failure.
    pub fn put_all(&self, puts: &[Put]) -> Result<()> {
        puts.iter().try_for_each(|put| self.put(put))
    }

    pub fn delete(&self, delete: &Delete) -> Result<()> {
        tracing::debug!(table = %self.name, targets = delete.targets().len(), "delete");
        self.connection.ensure_open()?.delete(&self.name, delete)
    }

    pub fn get(&self, get: &Get) -> Result<RowResult> {
        self.connection.ensure_open()?.get(&self.name, get)
    }

    /// Open a scanner. No rows are fetched until the first `next()`.
    pub fn scanner(&self, scan: Scan) -> Result<ResultScanner> {
        self.connection.ensure_open()?;
        Ok(ResultScanner::new(
            Arc::clone(&self.connection),
            self.name.clone(),
            scan,
        ))
    }

    /// Scanner restricted to a single column.
    pub fn column_scanner(&self, family: &str, qualifier: &str) -> Result<ResultScanner> {
        self.scanner(Scan::new().add_column(family, qualifier))
    }
}
