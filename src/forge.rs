//! Hosting platform abstraction layer
//!
//! The sync engine only talks to the platform through [`Forge`]. The
//! production implementation shells out to the GitHub CLI
//! ([`crate::github::GhCli`]); tests substitute mocks.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Repository identity, rendered as `owner/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(owner, name))
            }
            _ => Err(anyhow!("Invalid repository identity '{}', expected owner/name", s)),
        }
    }
}

/// A fork and the upstream repository it was created from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkPair {
    pub fork: RepoId,
    pub upstream: RepoId,
}

#[derive(Debug, Deserialize)]
struct OwnerEntry {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ParentEntry {
    owner: OwnerEntry,
    name: String,
}

/// One element of `gh repo list --json owner,name,parent`
#[derive(Debug, Deserialize)]
struct ListEntry {
    owner: OwnerEntry,
    name: String,
    parent: ParentEntry,
}

/// Parse the JSON emitted by `gh repo list --json owner,name,parent`.
///
/// Order is preserved. A missing parent makes the whole listing malformed.
pub fn parse_fork_listing(json: &str) -> serde_json::Result<Vec<ForkPair>> {
    let entries: Vec<ListEntry> = serde_json::from_str(json)?;

    Ok(entries
        .into_iter()
        .map(|entry| ForkPair {
            fork: RepoId::new(entry.owner.login, entry.name),
            upstream: RepoId::new(entry.parent.owner.login, entry.parent.name),
        })
        .collect())
}

/// Operations the sync engine needs from a hosting platform
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    /// Public forks owned by `org`, each paired with its upstream
    async fn list_forks(&self, org: &str) -> Result<Vec<ForkPair>>;

    /// Every branch of `repo`, sorted, deduplicated, without empty names
    async fn list_branches(&self, repo: &RepoId) -> Result<Vec<String>>;

    /// Update `branch` of `fork` to match the same branch of `upstream`
    async fn sync_branch(
        &self,
        fork: &RepoId,
        upstream: &RepoId,
        branch: &str,
        force: bool,
    ) -> Result<()>;

    /// Delete `branch` from `repo`
    async fn delete_branch(&self, repo: &RepoId, branch: &str) -> Result<()>;
}
