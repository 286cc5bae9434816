//! Join configuration
//!
//! Static scheme/port pairs for the client and peer protocols, discovery
//! tuning and output options. Loaded from an optional YAML file and then
//! overridden from the command line.

use crate::error::{JoinError, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Default etcd client port
pub const DEFAULT_CLIENT_PORT: u16 = 2379;

/// Default etcd peer port
pub const DEFAULT_PEER_PORT: u16 = 2380;

/// Default path of the membership API on a client URL
pub const DEFAULT_MEMBERS_PATH: &str = "/v2/members";

/// A scheme and port pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// URL scheme (http, https)
    pub scheme: String,
    /// TCP port
    pub port: u16,
}

impl Endpoint {
    pub fn new(scheme: &str, port: u16) -> Self {
        Self {
            scheme: scheme.to_string(),
            port,
        }
    }

    /// Build a URL for this endpoint on the given address
    pub fn url(&self, addr: IpAddr) -> String {
        format!("{}://{}", self.scheme, SocketAddr::new(addr, self.port))
    }
}

/// Discovery probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Per-probe timeout in milliseconds
    pub timeout_ms: u64,
    /// Fail instead of bootstrapping when every candidate answered with
    /// something other than connection refused or a timeout
    pub strict: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            strict: false,
        }
    }
}

/// Output line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `export KEY=VALUE`, suitable for `eval`
    #[default]
    Shell,
    /// `KEY=VALUE`, suitable for an environment file
    Env,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Line format
    pub format: OutputFormat,
    /// Prefix for every emitted key
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Shell,
            prefix: "ETCD_".to_string(),
        }
    }
}

/// Join configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    /// Client API scheme and port
    pub client: Endpoint,
    /// Peer protocol scheme and port
    pub peer: Endpoint,
    /// Membership API path on a client URL
    pub members_path: String,
    /// Discovery settings
    pub discovery: DiscoveryConfig,
    /// Output settings
    pub output: OutputConfig,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            client: Endpoint::new("http", DEFAULT_CLIENT_PORT),
            peer: Endpoint::new("http", DEFAULT_PEER_PORT),
            members_path: DEFAULT_MEMBERS_PATH.to_string(),
            discovery: DiscoveryConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl JoinConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string and validate it
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: JoinConfig =
            serde_yaml::from_str(content).map_err(|e| JoinError::Yaml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that cannot produce usable URLs
    pub fn validate(&self) -> Result<()> {
        for (label, endpoint) in [("client", &self.client), ("peer", &self.peer)] {
            if endpoint.scheme.is_empty() {
                return Err(JoinError::InvalidConfig(format!(
                    "{} scheme must not be empty",
                    label
                )));
            }
            if endpoint.port == 0 {
                return Err(JoinError::InvalidConfig(format!(
                    "{} port must not be 0",
                    label
                )));
            }
        }

        if !self.members_path.starts_with('/') {
            return Err(JoinError::InvalidConfig(format!(
                "members_path must start with '/': {}",
                self.members_path
            )));
        }

        if self.discovery.timeout_ms == 0 {
            return Err(JoinError::InvalidConfig(
                "discovery timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Per-probe discovery timeout
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery.timeout_ms)
    }

    /// Membership endpoint for a client URL
    pub fn members_url(&self, client_url: &str) -> String {
        format!(
            "{}{}",
            client_url.trim_end_matches('/'),
            self.members_path
        )
    }
}
