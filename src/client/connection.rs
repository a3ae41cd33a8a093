use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    client::{Admin, Table},
    cluster::{Cluster, registry},
    config::ClusterConfig,
    schema::TableName,
    util::{Result, Status},
};

pub(crate) struct ConnectionInner {
    pub(crate) cluster: Arc<Cluster>,
    pub(crate) scanner_caching: usize,
    closed: AtomicBool,
}

impl ConnectionInner {
    pub(crate) fn ensure_open(&self) -> Result<&Arc<Cluster>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Status::closed("connection is closed"));
        }
        Ok(&self.cluster)
    }
}

/// An open connection to a cluster.
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

impl Connection {
    /// Locate a cluster through the configured quorum.
    ///
    /// Fails with a connection error when no address in the quorum has a
    /// running cluster.
    pub fn open(config: &ClusterConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Status::connection(format!("invalid cluster config: {e}")))?;

        let addresses = config.addresses();
        let cluster = addresses
            .iter()
            .find_map(|address| registry::lookup(address))
            .ok_or_else(|| {
                Status::connection(format!(
                    "unable to reach a cluster at any of [{}]",
                    addresses.join(", ")
                ))
            })?;

        tracing::info!(address = %cluster.address(), "connection opened");
        Ok(Connection {
            inner: Arc::new(ConnectionInner {
                cluster,
                scanner_caching: config.scanner_caching,
                closed: AtomicBool::new(false),
            }),
        })
    }

    pub fn admin(&self) -> Result<Admin> {
        self.inner
            .ensure_open()
            .map_err(|e| Status::connection(format!("cannot create admin: {e}")))?;
        Ok(Admin::new(Arc::clone(&self.inner)))
    }

    /// A handle for row operations on `name`. The table is not checked
    /// until the first operation.
    pub fn table(&self, name: &TableName) -> Result<Table> {
        self.inner.ensure_open()?;
        Ok(Table::new(Arc::clone(&self.inner), name.clone()))
    }

    /// Close the connection. Idempotent.
    pub fn close(&self) -> Result<()> {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            tracing::info!(address = %self.inner.cluster.address(), "connection closed");
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub fn cluster_address(&self) -> String {
        self.inner.cluster.address()
    }
}
