//! Bootstrap configuration output
//!
//! Renders the reconciliation decision as `KEY=VALUE` lines for etcd's
//! environment. Callers commonly `eval` this output, so a failed run prints
//! only [`FAILURE_SENTINEL`].

use crate::cluster::{ClusterState, PeerCandidate, Reconciliation};
use crate::config::{OutputConfig, OutputFormat};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::error;

/// The only line printed when the run fails
pub const FAILURE_SENTINEL: &str = "false";

/// Computed etcd bootstrap configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub name: String,
    pub listen_peer_urls: String,
    pub initial_advertise_peer_urls: String,
    pub listen_client_urls: String,
    pub advertise_client_urls: String,
    pub initial_cluster_state: ClusterState,
    pub initial_cluster: String,
}

impl BootstrapConfig {
    /// Build the configuration for this node from the reconciliation result
    pub fn new(node: &PeerCandidate, result: &Reconciliation) -> Self {
        Self {
            name: node.member_id.clone(),
            listen_peer_urls: node.peer_url.clone(),
            initial_advertise_peer_urls: node.peer_url.clone(),
            listen_client_urls: node.client_url.clone(),
            advertise_client_urls: node.client_url.clone(),
            initial_cluster_state: result.state(),
            initial_cluster: result.initial_cluster(),
        }
    }

    /// Key/value pairs in output order, keys without prefix
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("NAME", self.name.clone()),
            ("LISTEN_PEER_URLS", self.listen_peer_urls.clone()),
            (
                "INITIAL_ADVERTISE_PEER_URLS",
                self.initial_advertise_peer_urls.clone(),
            ),
            ("LISTEN_CLIENT_URLS", self.listen_client_urls.clone()),
            ("ADVERTISE_CLIENT_URLS", self.advertise_client_urls.clone()),
            (
                "INITIAL_CLUSTER_STATE",
                self.initial_cluster_state.to_string(),
            ),
            ("INITIAL_CLUSTER", self.initial_cluster.clone()),
        ]
    }

    /// Render every entry as one line
    pub fn render(&self, output: &OutputConfig) -> String {
        let mut rendered = String::new();

        for (key, value) in self.entries() {
            let line = match output.format {
                OutputFormat::Shell => {
                    format!("export {}{}={}", output.prefix, key, shell_quote(&value))
                }
                OutputFormat::Env => format!("{}{}={}", output.prefix, key, value),
            };
            rendered.push_str(&line);
            rendered.push('\n');
        }

        rendered
    }
}

/// Turn the outcome of a run into stdout text and an exit status. A failed
/// run is logged and prints nothing but the sentinel line.
pub fn finish(result: Result<String>) -> (String, u8) {
    match result {
        Ok(rendered) => (rendered, 0),
        Err(e) => {
            error!("{}", e);
            (format!("{}\n", FAILURE_SENTINEL), 1)
        }
    }
}

/// Quote a value for a POSIX shell if it contains anything unsafe
fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.:/=,@[]%+".contains(c));

    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
