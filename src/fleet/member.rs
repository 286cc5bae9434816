//! Fleet member descriptors

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Lifecycle state of a fleet member, as reported by autoscaling groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    #[default]
    Pending,
    #[serde(rename = "Pending:Wait")]
    PendingWait,
    #[serde(rename = "Pending:Proceed")]
    PendingProceed,
    InService,
    Standby,
    Terminating,
    #[serde(rename = "Terminating:Wait")]
    TerminatingWait,
    #[serde(rename = "Terminating:Proceed")]
    TerminatingProceed,
    Terminated,
    Detaching,
    Detached,
    EnteringStandby,
    Quarantined,
}

/// A machine in the fleet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetMember {
    /// Member identity (instance ID)
    pub id: String,
    /// Private network address
    pub private_ip: IpAddr,
    /// Lifecycle state
    #[serde(default)]
    pub lifecycle_state: LifecycleState,
}

impl FleetMember {
    pub fn new(id: &str, private_ip: IpAddr, lifecycle_state: LifecycleState) -> Self {
        Self {
            id: id.to_string(),
            private_ip,
            lifecycle_state,
        }
    }

    /// Check if the member is in service
    pub fn is_in_service(&self) -> bool {
        self.lifecycle_state == LifecycleState::InService
    }
}
