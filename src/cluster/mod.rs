//! etcd cluster discovery and membership reconciliation
//!
//! This module resolves fleet members into peer candidates and decides
//! whether this node bootstraps a new cluster or joins an existing one.

pub mod membership;
pub mod peer;
pub mod reconciler;

#[cfg(test)]
pub(crate) mod fake;

pub use membership::{AddOutcome, HttpMembershipClient, Member, MembershipApi, Probe};
pub use peer::{PeerCandidate, PeerResolver};
pub use reconciler::{ClusterState, InitialMember, Reconciler, Reconciliation};
