use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::util::{Result, Status};

pub const DEFAULT_QUORUM_HOST: &str = "localhost";
pub const DEFAULT_CLIENT_PORT: u16 = 2181;
pub const DEFAULT_SCANNER_CACHING: usize = 100;

/// Where a client looks for a cluster and how it talks to it.
///
/// Every host in `quorum` is tried, in order, at `client_port`; the first
/// address with a live cluster wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub quorum: Vec<String>,
    pub client_port: u16,
    /// Rows fetched from the cluster per scanner round trip.
    pub scanner_caching: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig {
            quorum: vec![DEFAULT_QUORUM_HOST.to_string()],
            client_port: DEFAULT_CLIENT_PORT,
            scanner_caching: DEFAULT_SCANNER_CACHING,
        }
    }
}

impl ClusterConfig {
    pub fn new(host: impl Into<String>, client_port: u16) -> Self {
        ClusterConfig {
            quorum: vec![host.into()],
            client_port,
            ..Default::default()
        }
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Status::io_error(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let config: ClusterConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a comma separated host list, as in `zk1,zk2,zk3`.
    pub fn set_quorum(&mut self, hosts: &str) {
        self.quorum = hosts
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect();
    }

    pub fn validate(&self) -> Result<()> {
        if self.quorum.is_empty() {
            return Err(Status::invalid_argument("quorum must name at least one host"));
        }
        if self.scanner_caching == 0 {
            return Err(Status::invalid_argument("scanner_caching must be positive"));
        }
        Ok(())
    }

    /// The `host:port` addresses to try, in quorum order.
    pub fn addresses(&self) -> Vec<String> {
        self.quorum
            .iter()
            .map(|host| format!("{host}:{}", self.client_port))
            .collect()
    }
}

/// Options for the embedded cluster.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub host: String,
    pub port: u16,
    /// Directory holding the operation log. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    /// fsync the operation log after every append.
    pub sync_log: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        ServerOptions {
            host: DEFAULT_QUORUM_HOST.to_string(),
            port: DEFAULT_CLIENT_PORT,
            data_dir: None,
            sync_log: false,
        }
    }
}

impl ServerOptions {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ServerOptions {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Options for a cluster that the given client config will find first.
    pub fn for_client(config: &ClusterConfig) -> Self {
        let host = config
            .quorum
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_QUORUM_HOST.to_string());
        ServerOptions::new(host, config.client_port)
    }
}
