//! Fleet provider seam

use super::member::FleetMember;
use crate::error::Result;
use async_trait::async_trait;

/// Source of fleet membership
///
/// Implementations answer "which machines share a fleet with `self_id`"
/// from whatever inventory they front: a cloud API, a service registry or
/// a static file.
#[async_trait]
pub trait FleetProvider: Send + Sync {
    /// List the members of the fleet that `self_id` belongs to, in a stable
    /// order. Members that are not in service are included; callers filter.
    async fn members(&self, self_id: &str) -> Result<Vec<FleetMember>>;
}
