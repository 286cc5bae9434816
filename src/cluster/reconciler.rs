//! Cluster discovery and membership reconciliation
//!
//! Decides whether this node bootstraps a new cluster or joins an existing
//! one. Discovery asks each candidate in turn for its member list and stops
//! at the first answer. Joining removes members that are no longer in the
//! fleet, registers this node and re-reads the member list. A node that is
//! already registered by name skips both mutations, so re-running after a
//! partial failure is safe.

use super::membership::{AddOutcome, Member, MembershipApi, Probe};
use super::peer::PeerCandidate;
use crate::config::JoinConfig;
use crate::error::{JoinError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Initial cluster state for the new member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterState {
    New,
    Existing,
}

impl ClusterState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterState::New => "new",
            ClusterState::Existing => "existing",
        }
    }
}

impl std::fmt::Display for ClusterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry of the initial cluster list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialMember {
    pub name: String,
    pub peer_url: String,
}

impl InitialMember {
    pub fn new(name: &str, peer_url: &str) -> Self {
        Self {
            name: name.to_string(),
            peer_url: peer_url.to_string(),
        }
    }
}

/// Reconciliation decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reconciliation {
    /// No cluster answered; bootstrap from every candidate
    NewCluster { initial_members: Vec<InitialMember> },
    /// Joined the cluster with this member list
    JoinedCluster { initial_members: Vec<InitialMember> },
}

impl Reconciliation {
    pub fn state(&self) -> ClusterState {
        match self {
            Reconciliation::NewCluster { .. } => ClusterState::New,
            Reconciliation::JoinedCluster { .. } => ClusterState::Existing,
        }
    }

    pub fn initial_members(&self) -> &[InitialMember] {
        match self {
            Reconciliation::NewCluster { initial_members }
            | Reconciliation::JoinedCluster { initial_members } => initial_members,
        }
    }

    /// `name=peerURL` pairs joined by commas
    pub fn initial_cluster(&self) -> String {
        self.initial_members()
            .iter()
            .map(|m| format!("{}={}", m.name, m.peer_url))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// A cluster found during discovery
#[derive(Debug, Clone)]
struct ExistingCluster {
    members_url: String,
    members: Vec<Member>,
}

/// Reconciles this node against the cluster
pub struct Reconciler<M: MembershipApi> {
    api: M,
    config: JoinConfig,
}

impl<M: MembershipApi> Reconciler<M> {
    /// Create a new reconciler
    pub fn new(api: M, config: JoinConfig) -> Self {
        Self { api, config }
    }

    /// Get the membership API
    pub fn api(&self) -> &M {
        &self.api
    }

    /// Get the configuration
    pub fn config(&self) -> &JoinConfig {
        &self.config
    }

    /// Discover the cluster and bootstrap or join it
    pub async fn reconcile(
        &self,
        self_id: &str,
        self_peer_url: &str,
        candidates: &[PeerCandidate],
    ) -> Result<Reconciliation> {
        if candidates.is_empty() {
            return Err(JoinError::EmptyFleet);
        }

        match self.discover(candidates).await? {
            None => {
                info!("Creating new cluster");
                let initial_members = candidates
                    .iter()
                    .map(|c| InitialMember::new(&c.member_id, &c.peer_url))
                    .collect();
                Ok(Reconciliation::NewCluster { initial_members })
            }
            Some(cluster) => {
                let initial_members = self
                    .join(self_id, self_peer_url, candidates, cluster)
                    .await?;
                Ok(Reconciliation::JoinedCluster { initial_members })
            }
        }
    }

    /// Probe candidates in order; the first one that answers wins
    async fn discover(&self, candidates: &[PeerCandidate]) -> Result<Option<ExistingCluster>> {
        let timeout = self.config.probe_timeout();
        let mut refused = false;
        let mut last_failure = None;

        for candidate in candidates {
            let members_url = self.config.members_url(&candidate.client_url);

            match self.api.probe(&members_url, timeout).await {
                Probe::Found(members) => {
                    info!("Found existing cluster at {}", members_url);
                    return Ok(Some(ExistingCluster {
                        members_url,
                        members,
                    }));
                }
                Probe::Refused(reason) => {
                    debug!("No cluster at {}: {}", members_url, reason);
                    refused = true;
                }
                Probe::Failed(reason) => {
                    debug!("Probe of {} failed: {}", members_url, reason);
                    last_failure = Some(format!("{}: {}", members_url, reason));
                }
            }
        }

        if self.config.discovery.strict && !refused {
            if let Some(failure) = last_failure {
                return Err(JoinError::ClusterUnreachable(failure));
            }
        }

        Ok(None)
    }

    async fn join(
        &self,
        self_id: &str,
        self_peer_url: &str,
        candidates: &[PeerCandidate],
        cluster: ExistingCluster,
    ) -> Result<Vec<InitialMember>> {
        let ExistingCluster {
            members_url,
            members,
        } = cluster;

        debug!("Members of {}: {:?}", members_url, members);

        if members.iter().any(|m| m.name == self_id) {
            info!("{} is already a member of the cluster", self_id);
            return Ok(initial_members(&members, self_id, self_peer_url, candidates));
        }

        let stale = members
            .iter()
            .filter(|m| is_stale(m, self_peer_url, candidates));
        for member in stale {
            info!("Removing bad member {} ({})", member.name, member.id);
            self.api.remove(&members_url, &member.id).await?;
        }

        info!("Joining existing cluster");
        let peer_urls = vec![self_peer_url.to_string()];
        match self.api.add(&members_url, self_id, &peer_urls).await? {
            AddOutcome::Added => info!("Added {} at {}", self_id, self_peer_url),
            AddOutcome::AlreadyMember => info!("{} was already registered", self_peer_url),
        }

        let members = self.api.list(&members_url).await?;
        Ok(initial_members(&members, self_id, self_peer_url, candidates))
    }
}

/// The candidate a member record refers to. Members that were added but
/// have not started yet carry no name and are matched by peer URL.
fn candidate_for<'a>(
    member: &Member,
    candidates: &'a [PeerCandidate],
) -> Option<&'a PeerCandidate> {
    if member.name.is_empty() {
        candidates
            .iter()
            .find(|c| member.peer_urls.iter().any(|url| *url == c.peer_url))
    } else {
        candidates.iter().find(|c| c.member_id == member.name)
    }
}

/// A member is stale when it maps to no candidate. An unnamed record
/// carrying this node's peer URL is this node's own earlier registration.
fn is_stale(member: &Member, self_peer_url: &str, candidates: &[PeerCandidate]) -> bool {
    if member.name.is_empty() && member.peer_urls.iter().any(|url| url == self_peer_url) {
        return false;
    }
    candidate_for(member, candidates).is_none()
}

/// Map the cluster's member list to initial cluster entries, keeping the
/// cluster's order. This node is always present in the result.
fn initial_members(
    members: &[Member],
    self_id: &str,
    self_peer_url: &str,
    candidates: &[PeerCandidate],
) -> Vec<InitialMember> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for member in members {
        let name = if !member.name.is_empty() {
            member.name.as_str()
        } else if member.peer_urls.iter().any(|url| url == self_peer_url) {
            self_id
        } else if let Some(candidate) = candidate_for(member, candidates) {
            candidate.member_id.as_str()
        } else {
            warn!("Skipping unnamed member {} {:?}", member.id, member.peer_urls);
            continue;
        };

        let Some(peer_url) = member.peer_urls.first() else {
            warn!("Skipping member {} without peer URLs", name);
            continue;
        };

        if !seen.insert(name.to_string()) {
            warn!("Skipping duplicate member {}", name);
            continue;
        }

        result.push(InitialMember::new(name, peer_url));
    }

    if !seen.contains(self_id) {
        result.push(InitialMember::new(self_id, self_peer_url));
    }

    result
}
