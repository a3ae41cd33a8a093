//! Process-wide map from `host:port` to running clusters.
//!
//! Stands in for the coordination service a client asks to locate a
//! cluster. Entries are weak so a dropped cluster simply stops resolving.
use std::{
    collections::HashMap,
    sync::{Arc, LazyLock, Weak},
};

use parking_lot::Mutex;

use crate::{
    cluster::Cluster,
    util::{Result, Status},
};

/// First port handed out when a cluster asks for port 0.
const EPHEMERAL_PORT_START: u16 = 20_000;

static CLUSTERS: LazyLock<Mutex<HashMap<String, Weak<Cluster>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn address(host: &str, port: u16) -> String {
    format!("{host}:{port}")
}

/// Reserve `host:port` for `make`'s cluster. Port 0 picks an unused port.
/// The cluster is built while the registry is locked so two starts cannot
/// claim the same address.
pub(crate) fn register_with<F>(host: &str, port: u16, make: F) -> Result<Arc<Cluster>>
where
    F: FnOnce(u16) -> Result<Arc<Cluster>>,
{
    let mut clusters = CLUSTERS.lock();
    clusters.retain(|_, weak| weak.upgrade().is_some_and(|c| c.is_running()));

    let port = if port == 0 {
        (EPHEMERAL_PORT_START..=u16::MAX)
            .find(|p| !clusters.contains_key(&address(host, *p)))
            .ok_or_else(|| Status::io_error("No free port left"))?
    } else if clusters.contains_key(&address(host, port)) {
        return Err(Status::invalid_argument(format!(
            "Address {} is already in use",
            address(host, port)
        )));
    } else {
        port
    };

    let cluster = make(port)?;
    clusters.insert(address(host, port), Arc::downgrade(&cluster));
    Ok(cluster)
}

/// The running cluster registered at `address`, if any.
pub fn lookup(address: &str) -> Option<Arc<Cluster>> {
    CLUSTERS
        .lock()
        .get(address)
        .and_then(Weak::upgrade)
        .filter(|c| c.is_running())
}

pub(crate) fn deregister(address: &str, cluster: &Cluster) {
    let mut clusters = CLUSTERS.lock();
    let same = clusters
        .get(address)
        .is_some_and(|weak| std::ptr::eq(weak.as_ptr(), cluster));
    if same {
        clusters.remove(address);
    }
}
