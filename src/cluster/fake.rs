//! In-memory membership API for tests

use super::membership::{AddOutcome, Member, MembershipApi, Probe};
use crate::error::{JoinError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// A recorded membership call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Probe(String),
    List(String),
    Add(String, String),
    Remove(String, String),
}

/// A single cluster reachable through some members URLs
#[derive(Default)]
pub struct FakeMembership {
    answering: HashSet<String>,
    failing: HashMap<String, String>,
    members: Mutex<Vec<Member>>,
    remove_status: HashMap<String, u16>,
    add_status: Option<u16>,
    list_status: Option<u16>,
    calls: Mutex<Vec<Call>>,
}

impl FakeMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cluster state shared by every answering URL
    pub fn with_members(self, members: Vec<Member>) -> Self {
        *self.members.lock().unwrap() = members;
        self
    }

    /// Probes of this URL find the cluster
    pub fn answering(mut self, url: &str) -> Self {
        self.answering.insert(url.to_string());
        self
    }

    /// Probes of this URL fail with something other than a refusal
    pub fn failing(mut self, url: &str, reason: &str) -> Self {
        self.failing.insert(url.to_string(), reason.to_string());
        self
    }

    /// Removing this member ID returns `status`
    pub fn remove_returns(mut self, id: &str, status: u16) -> Self {
        self.remove_status.insert(id.to_string(), status);
        self
    }

    /// Adding returns `status`
    pub fn add_returns(mut self, status: u16) -> Self {
        self.add_status = Some(status);
        self
    }

    /// Listing (outside of probes) returns `status`
    pub fn list_returns(mut self, status: u16) -> Self {
        self.list_status = Some(status);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Add(..) | Call::Remove(..)))
            .collect()
    }

    pub fn members(&self) -> Vec<Member> {
        self.members.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MembershipApi for FakeMembership {
    async fn probe(&self, members_url: &str, _timeout: Duration) -> Probe {
        self.record(Call::Probe(members_url.to_string()));

        if self.answering.contains(members_url) {
            Probe::Found(self.members())
        } else if let Some(reason) = self.failing.get(members_url) {
            Probe::Failed(reason.clone())
        } else {
            Probe::Refused("connection refused".to_string())
        }
    }

    async fn list(&self, members_url: &str) -> Result<Vec<Member>> {
        self.record(Call::List(members_url.to_string()));

        match self.list_status {
            Some(status) => Err(JoinError::mutation("listing members", status, "")),
            None => Ok(self.members()),
        }
    }

    async fn add(
        &self,
        members_url: &str,
        name: &str,
        peer_urls: &[String],
    ) -> Result<AddOutcome> {
        self.record(Call::Add(members_url.to_string(), name.to_string()));

        match self.add_status.unwrap_or(201) {
            409 => Ok(AddOutcome::AlreadyMember),
            status if (200..300).contains(&status) => {
                let mut members = self.members.lock().unwrap();
                let id = format!("m{}", members.len() + 1);
                members.push(Member {
                    id,
                    name: String::new(),
                    peer_urls: peer_urls.to_vec(),
                    client_urls: Vec::new(),
                });
                Ok(AddOutcome::Added)
            }
            status => Err(JoinError::mutation("joining cluster", status, "")),
        }
    }

    async fn remove(&self, members_url: &str, id: &str) -> Result<()> {
        self.record(Call::Remove(members_url.to_string(), id.to_string()));

        let status = self.remove_status.get(id).copied().unwrap_or(204);
        if status != 204 {
            return Err(JoinError::mutation("deleting bad member", status, ""));
        }

        self.members.lock().unwrap().retain(|m| m.id != id);
        Ok(())
    }
}
