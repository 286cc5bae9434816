//! End-to-end bootstrap: fleet lookup, peer resolution, reconciliation

use crate::cluster::{MembershipApi, PeerResolver, Reconciler};
use crate::error::{JoinError, Result};
use crate::fleet::FleetProvider;
use crate::output::BootstrapConfig;
use std::net::IpAddr;
use tracing::info;

/// This node's identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    /// Member name (instance ID)
    pub name: String,
    /// Private address; taken from the fleet entry when not set
    pub private_ip: Option<IpAddr>,
}

impl NodeIdentity {
    pub fn new(name: &str, private_ip: Option<IpAddr>) -> Self {
        Self {
            name: name.to_string(),
            private_ip,
        }
    }
}

/// Compute the bootstrap configuration for `node`
pub async fn bootstrap<F, M>(
    node: &NodeIdentity,
    fleet: &F,
    reconciler: &Reconciler<M>,
) -> Result<BootstrapConfig>
where
    F: FleetProvider + ?Sized,
    M: MembershipApi,
{
    info!("Finding fleet members for {}", node.name);
    let members = fleet.members(&node.name).await?;

    let entry = members
        .iter()
        .find(|m| m.id == node.name)
        .ok_or_else(|| JoinError::NotInFleet(node.name.clone()))?;

    // The fleet address is what other members see in the initial cluster
    let private_ip = match node.private_ip {
        Some(ip) if entry.is_in_service() && ip != entry.private_ip => {
            return Err(JoinError::InvalidConfig(format!(
                "private address {} does not match fleet address {} of {}",
                ip, entry.private_ip, node.name
            )));
        }
        Some(ip) => ip,
        None => entry.private_ip,
    };

    let resolver = PeerResolver::new(reconciler.config());
    let candidates = resolver.resolve(&node.name, &members)?;
    let this_node = resolver.candidate(&node.name, private_ip);

    let result = reconciler
        .reconcile(&node.name, &this_node.peer_url, &candidates)
        .await?;

    Ok(BootstrapConfig::new(&this_node, &result))
}
