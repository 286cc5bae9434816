//! Fleet membership
//!
//! The fleet is the set of machines that may run a cluster member. This
//! module defines the provider seam and a file-backed provider.

pub mod member;
pub mod provider;
pub mod static_file;

pub use member::{FleetMember, LifecycleState};
pub use provider::FleetProvider;
pub use static_file::StaticFleet;
