//! etcd membership API client
//!
//! Three calls against `<client URL>/v2/members`: list, add and remove. The
//! discovery probe is a list with a timeout whose failures are classified
//! instead of surfaced.

use crate::error::{JoinError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// A member record as reported by the cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Cluster-assigned member ID
    #[serde(default)]
    pub id: String,
    /// Member name; empty until an added member has started
    #[serde(default)]
    pub name: String,
    /// Advertised peer URLs
    #[serde(default, rename = "peerURLs")]
    pub peer_urls: Vec<String>,
    /// Advertised client URLs
    #[serde(default, rename = "clientURLs")]
    pub client_urls: Vec<String>,
}

/// Member list response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembersResponse {
    pub members: Vec<Member>,
}

/// Member add request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMemberRequest {
    pub name: String,
    #[serde(rename = "peerURLs")]
    pub peer_urls: Vec<String>,
}

/// Result of a discovery probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The candidate is part of a cluster with these members
    Found(Vec<Member>),
    /// Connection refused or timed out
    Refused(String),
    /// Any other failure: error status, bad body, transport error
    Failed(String),
}

/// Outcome of a member add
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyMember,
}

/// Operations on a cluster's membership API
#[async_trait]
pub trait MembershipApi: Send + Sync {
    /// Read the member list with a timeout, classifying any failure
    async fn probe(&self, members_url: &str, timeout: Duration) -> Probe;

    /// Read the member list
    async fn list(&self, members_url: &str) -> Result<Vec<Member>>;

    /// Register a member
    async fn add(
        &self,
        members_url: &str,
        name: &str,
        peer_urls: &[String],
    ) -> Result<AddOutcome>;

    /// Remove a member by its cluster-assigned ID
    async fn remove(&self, members_url: &str, id: &str) -> Result<()>;
}

/// Membership API over HTTP
#[derive(Debug, Clone)]
pub struct HttpMembershipClient {
    client: reqwest::Client,
}

impl HttpMembershipClient {
    /// Create a new client
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| JoinError::Http(e.to_string()))?;

        Ok(Self { client })
    }
}

fn classify(err: &reqwest::Error) -> Probe {
    if err.is_connect() || err.is_timeout() {
        Probe::Refused(err.to_string())
    } else {
        Probe::Failed(err.to_string())
    }
}

#[async_trait]
impl MembershipApi for HttpMembershipClient {
    async fn probe(&self, members_url: &str, timeout: Duration) -> Probe {
        let response = match self.client.get(members_url).timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) => return classify(&e),
        };

        let status = response.status();
        if !status.is_success() {
            return Probe::Failed(format!("status {}", status));
        }

        match response.json::<MembersResponse>().await {
            Ok(body) => Probe::Found(body.members),
            Err(e) => classify(&e),
        }
    }

    async fn list(&self, members_url: &str) -> Result<Vec<Member>> {
        let response = self
            .client
            .get(members_url)
            .send()
            .await
            .map_err(|e| JoinError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(JoinError::mutation(
                "listing members",
                status.as_u16(),
                response.text().await.unwrap_or_default(),
            ));
        }

        let body: MembersResponse = response
            .json()
            .await
            .map_err(|e| JoinError::Http(e.to_string()))?;

        Ok(body.members)
    }

    async fn add(
        &self,
        members_url: &str,
        name: &str,
        peer_urls: &[String],
    ) -> Result<AddOutcome> {
        let request = AddMemberRequest {
            name: name.to_string(),
            peer_urls: peer_urls.to_vec(),
        };

        let response = self
            .client
            .post(members_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| JoinError::Http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Ok(AddOutcome::AlreadyMember);
        }
        if !status.is_success() {
            return Err(JoinError::mutation(
                "joining cluster",
                status.as_u16(),
                response.text().await.unwrap_or_default(),
            ));
        }

        debug!("Add member response: {}", status);
        Ok(AddOutcome::Added)
    }

    async fn remove(&self, members_url: &str, id: &str) -> Result<()> {
        let url = format!("{}/{}", members_url.trim_end_matches('/'), id);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| JoinError::Http(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            return Err(JoinError::mutation(
                "deleting bad member",
                status.as_u16(),
                response.text().await.unwrap_or_default(),
            ));
        }

        Ok(())
    }
}
