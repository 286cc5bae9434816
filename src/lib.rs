//! etcd-join - bootstrap configuration for etcd cluster members
//!
//! etcd-join runs once when a node starts. It looks up the node's fleet,
//! decides whether an etcd cluster already exists and either seeds a new
//! cluster or joins the existing one:
//!
//! - Peer resolution from fleet membership
//! - Cluster discovery over the membership API
//! - Stale member cleanup and self registration
//! - `KEY=VALUE` output for etcd's environment

pub mod bootstrap;
pub mod cluster;
pub mod config;
pub mod error;
pub mod fleet;
pub mod output;

pub use bootstrap::{bootstrap, NodeIdentity};
pub use error::{JoinError, Result};
