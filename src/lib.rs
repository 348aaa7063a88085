//! forksync - Keep organization forks in sync with their upstreams
//!
//! forksync lists the public forks of an organization, syncs every upstream
//! branch into each fork, and offers to delete fork branches that no longer
//! exist upstream.
//!
//! ## Modules
//!
//! - [`config`]: Configuration layering (defaults, YAML file, environment)
//! - [`forge`]: Platform abstraction and repository identities
//! - [`github`]: `gh` CLI implementation of the platform abstraction
//! - [`branches`]: Branch list normalization and diffing
//! - [`prompt`]: Interactive and automatic deletion decisions
//! - [`sync`]: The sync and prune engine
//! - [`health`]: Preflight checks

pub mod branches;
pub mod config;
pub mod forge;
pub mod github;
pub mod health;
pub mod prompt;
pub mod sync;

pub use config::Config;
pub use forge::{ForkPair, Forge, RepoId};
pub use github::{GhCli, GhError};
pub use health::HealthCheck;
pub use prompt::{AutoConfirm, Confirm, PromptConfirm};
pub use sync::{BranchResult, SyncEngine, SyncSummary};
