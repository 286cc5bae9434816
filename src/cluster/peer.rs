//! Peer resolution
//!
//! Turns fleet members into cluster peer candidates with concrete client and
//! peer URLs.

use crate::config::{Endpoint, JoinConfig};
use crate::error::{JoinError, Result};
use crate::fleet::FleetMember;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::IpAddr;
use tracing::{debug, warn};

/// A fleet member that may take part in the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerCandidate {
    /// Member name (fleet identity)
    pub member_id: String,
    /// Client API URL
    pub client_url: String,
    /// Peer protocol URL
    pub peer_url: String,
}

/// Builds peer candidates from fleet members
#[derive(Debug, Clone)]
pub struct PeerResolver {
    client: Endpoint,
    peer: Endpoint,
}

impl PeerResolver {
    /// Create a resolver from the configured endpoints
    pub fn new(config: &JoinConfig) -> Self {
        Self {
            client: config.client.clone(),
            peer: config.peer.clone(),
        }
    }

    /// Build the candidate for a single address
    pub fn candidate(&self, member_id: &str, addr: IpAddr) -> PeerCandidate {
        PeerCandidate {
            member_id: member_id.to_string(),
            client_url: self.client.url(addr),
            peer_url: self.peer.url(addr),
        }
    }

    /// Resolve the in-service fleet members into candidates, preserving
    /// fleet order
    pub fn resolve(&self, self_id: &str, fleet: &[FleetMember]) -> Result<Vec<PeerCandidate>> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for member in fleet.iter().filter(|m| m.is_in_service()) {
            if !seen.insert(member.id.as_str()) {
                warn!("Ignoring duplicate fleet member {}", member.id);
                continue;
            }
            candidates.push(self.candidate(&member.id, member.private_ip));
        }

        if candidates.is_empty() {
            return Err(JoinError::EmptyFleet);
        }

        if !seen.contains(self_id) {
            warn!("{} is not in service; it will not be part of a new cluster", self_id);
        }

        debug!("Found peers: {:?}", candidates);
        Ok(candidates)
    }
}
