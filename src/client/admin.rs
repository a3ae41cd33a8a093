use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    client::connection::ConnectionInner,
    cluster::Cluster,
    schema::{ColumnFamilyDescriptor, TableDescriptor, TableName},
    util::{Result, Status},
};

/// Administrative handle: table lifecycle and schema.
pub struct Admin {
    connection: Arc<ConnectionInner>,
    closed: AtomicBool,
}

impl Admin {
    pub(crate) fn new(connection: Arc<ConnectionInner>) -> Self {
        Admin {
            connection,
            closed: AtomicBool::new(false),
        }
    }

    fn cluster(&self) -> Result<&Arc<Cluster>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Status::closed("admin is closed"));
        }
        self.connection.ensure_open()
    }

    /// Table names in ascending order.
    pub fn list_table_names(&self) -> Result<Vec<TableName>> {
        Ok(self
            .list_tables()?
            .into_iter()
            .map(|d| d.name().clone())
            .collect())
    }

    pub fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        self.cluster()?.list_tables()
    }

    pub fn table_exists(&self, name: &TableName) -> Result<bool> {
        self.cluster()?.table_exists(name)
    }

    pub fn create_table(&self, descriptor: &TableDescriptor) -> Result<TableDescriptor> {
        self.cluster()?.create_table(descriptor)
    }

    pub fn get_descriptor(&self, name: &TableName) -> Result<TableDescriptor> {
        self.cluster()?.get_descriptor(name)
    }

    /// Submit a full descriptor. Fails with `ConcurrentModification` if the
    /// table changed since `descriptor` was fetched.
    pub fn modify_table(&self, descriptor: &TableDescriptor) -> Result<TableDescriptor> {
        self.cluster()?.modify_table(descriptor)
    }

    pub fn add_column_family(
        &self,
        name: &TableName,
        family: ColumnFamilyDescriptor,
    ) -> Result<TableDescriptor> {
        self.cluster()?.add_column_family(name, family)
    }

    pub fn disable_table(&self, name: &TableName) -> Result<()> {
        self.cluster()?.set_enabled(name, false)
    }

    pub fn enable_table(&self, name: &TableName) -> Result<()> {
        self.cluster()?.set_enabled(name, true)
    }

    pub fn is_table_enabled(&self, name: &TableName) -> Result<bool> {
        self.cluster()?.is_table_enabled(name)
    }

    /// Delete a disabled table and all its cells.
    pub fn delete_table(&self, name: &TableName) -> Result<()> {
        self.cluster()?.delete_table(name)
    }

    /// Release the handle. Idempotent.
    pub fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
