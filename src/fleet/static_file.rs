//! File-backed fleet provider
//!
//! Reads the fleet from a YAML (or JSON) document:
//!
//! ```yaml
//! members:
//!   - id: i-0a1
//!     private_ip: 10.0.0.1
//!     lifecycle_state: InService
//! ```

use super::member::FleetMember;
use super::provider::FleetProvider;
use crate::error::{JoinError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fleet document layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetDocument {
    #[serde(default)]
    pub members: Vec<FleetMember>,
}

/// Fleet provider backed by a static document
#[derive(Debug, Clone)]
pub struct StaticFleet {
    /// Source path, for diagnostics
    source: Option<PathBuf>,
    /// Members in document order
    members: Vec<FleetMember>,
}

impl StaticFleet {
    /// Create a provider from an in-memory member list
    pub fn new(members: Vec<FleetMember>) -> Self {
        Self {
            source: None,
            members,
        }
    }

    /// Load a fleet document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let document: FleetDocument = serde_yaml::from_str(&content)
            .map_err(|e| JoinError::Fleet(format!("{}: {}", path.display(), e)))?;

        debug!(
            "Loaded {} fleet members from {}",
            document.members.len(),
            path.display()
        );

        Ok(Self {
            source: Some(path.to_path_buf()),
            members: document.members,
        })
    }

    /// Look up a member by identity
    pub fn get(&self, id: &str) -> Option<&FleetMember> {
        self.members.iter().find(|m| m.id == id)
    }
}

#[async_trait]
impl FleetProvider for StaticFleet {
    async fn members(&self, self_id: &str) -> Result<Vec<FleetMember>> {
        if self.get(self_id).is_none() {
            let source = self
                .source
                .as_ref()
                .map(|p| format!(" ({})", p.display()))
                .unwrap_or_default();
            return Err(JoinError::NotInFleet(format!("{}{}", self_id, source)));
        }

        Ok(self.members.clone())
    }
}
