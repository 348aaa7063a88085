//! Sync Engine - Orchestrates fork synchronization and pruning
//!
//! For every fork of the configured organization the engine syncs each
//! upstream branch into the fork, then offers to delete the fork branches that
//! no longer exist upstream. Everything runs sequentially: one pair, one
//! branch, one platform call at a time.

use crate::branches::removed_branches;
use crate::forge::{ForkPair, Forge, RepoId};
use crate::prompt::Confirm;
use crate::Config;
use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// What happened to a single branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchResult {
    /// Fork branch was updated from upstream
    Synced { branch: String },
    /// Sync command failed; later branches were still attempted
    SyncFailed { branch: String, error: String },
    /// Fork-only branch was deleted
    Deleted { branch: String },
    /// Fork-only branch was left in place
    Kept { branch: String },
    /// Delete command failed, usually protection or permissions
    DeleteFailed { branch: String, error: String },
    /// Dry run: the action was reported but not performed
    Planned { branch: String, action: PlannedAction },
}

/// Action a dry run would have taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    Sync,
    Delete,
    Prompt,
}

/// Outcome of processing one fork/upstream pair
#[derive(Debug, Clone)]
pub struct PairReport {
    pub pair: ForkPair,
    pub results: Vec<BranchResult>,
    /// Set when the pair could not be processed at all
    pub error: Option<String>,
}

impl PairReport {
    fn new(pair: ForkPair) -> Self {
        Self {
            pair,
            results: Vec::new(),
            error: None,
        }
    }
}

/// Results from a complete sync run
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub total_pairs: usize,
    pub failed_pairs: usize,
    pub synced: usize,
    pub sync_failed: usize,
    pub deleted: usize,
    pub kept: usize,
    pub delete_failed: usize,
    pub planned: usize,
    pub duration: Duration,
    pub reports: Vec<PairReport>,
}

impl SyncSummary {
    /// Compile counters from per-pair reports
    pub fn compile(reports: Vec<PairReport>, duration: Duration) -> Self {
        let mut summary = Self {
            total_pairs: reports.len(),
            failed_pairs: 0,
            synced: 0,
            sync_failed: 0,
            deleted: 0,
            kept: 0,
            delete_failed: 0,
            planned: 0,
            duration,
            reports: Vec::new(),
        };

        for report in &reports {
            if report.error.is_some() {
                summary.failed_pairs += 1;
            }
            for result in &report.results {
                match result {
                    BranchResult::Synced { .. } => summary.synced += 1,
                    BranchResult::SyncFailed { .. } => summary.sync_failed += 1,
                    BranchResult::Deleted { .. } => summary.deleted += 1,
                    BranchResult::Kept { .. } => summary.kept += 1,
                    BranchResult::DeleteFailed { .. } => summary.delete_failed += 1,
                    BranchResult::Planned { .. } => summary.planned += 1,
                }
            }
        }

        summary.reports = reports;
        summary
    }
}

/// The sync engine, generic over the hosting platform
pub struct SyncEngine<F> {
    config: Config,
    forge: F,
}

impl<F: Forge> SyncEngine<F> {
    /// Create a new sync engine with the given configuration
    pub fn new(config: Config, forge: F) -> Self {
        Self { config, forge }
    }

    /// Get configuration for external inspection
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// List the organization's forks. Any failure here is fatal to the run.
    pub async fn discover(&self) -> Result<Vec<ForkPair>> {
        info!("Listing public forks of {}", self.config.org);

        let pairs = self
            .forge
            .list_forks(&self.config.org)
            .await
            .context("Failed to discover forks")?;

        info!("Found {} forks", pairs.len());
        Ok(pairs)
    }

    /// Run a complete sync: discover forks, then sync and prune each in turn
    pub async fn run(&self, confirm: &mut dyn Confirm) -> Result<SyncSummary> {
        let start_time = Instant::now();

        let pairs = self.discover().await?;

        let mut reports = Vec::with_capacity(pairs.len());
        for pair in pairs {
            reports.push(self.sync_pair(pair, confirm).await);
        }

        let summary = SyncSummary::compile(reports, start_time.elapsed());

        info!(
            "Sync completed in {:.2}s: {} synced, {} sync failures, {} deleted, {} kept",
            summary.duration.as_secs_f64(),
            summary.synced,
            summary.sync_failed,
            summary.deleted,
            summary.kept
        );

        Ok(summary)
    }

    /// Sync every upstream branch into the fork, then prune fork-only branches.
    ///
    /// Never fails: problems are recorded in the returned report.
    pub async fn sync_pair(&self, pair: ForkPair, confirm: &mut dyn Confirm) -> PairReport {
        info!("=== Sync {} from {} ===", pair.fork, pair.upstream);

        let mut report = PairReport::new(pair);

        let upstream_branches = match self.forge.list_branches(&report.pair.upstream).await {
            Ok(branches) => branches,
            Err(e) => {
                error!("Skipping {}: {:#}", report.pair.fork, e);
                report.error = Some(format!("{:#}", e));
                return report;
            }
        };

        self.sync_branches(&report.pair, &upstream_branches, &mut report.results)
            .await;

        let fork_branches = match self.forge.list_branches(&report.pair.fork).await {
            Ok(branches) => branches,
            Err(e) => {
                error!("Cannot check {} for removed branches: {:#}", report.pair.fork, e);
                report.error = Some(format!("{:#}", e));
                return report;
            }
        };

        self.prune_branches(
            &report.pair.fork,
            &fork_branches,
            &upstream_branches,
            confirm,
            &mut report.results,
        )
        .await;

        report
    }

    /// Sync each upstream branch in order; a failure never stops the batch
    async fn sync_branches(
        &self,
        pair: &ForkPair,
        upstream_branches: &[String],
        results: &mut Vec<BranchResult>,
    ) {
        for branch in upstream_branches {
            info!("Syncing branch: {}", branch);

            if self.config.dry_run {
                info!("Would sync {} into {} (dry run)", branch, pair.fork);
                results.push(BranchResult::Planned {
                    branch: branch.clone(),
                    action: PlannedAction::Sync,
                });
                continue;
            }

            match self
                .forge
                .sync_branch(&pair.fork, &pair.upstream, branch, self.config.force)
                .await
            {
                Ok(()) => results.push(BranchResult::Synced {
                    branch: branch.clone(),
                }),
                Err(e) => {
                    error!("Failed to sync {}: {:#}", branch, e);
                    results.push(BranchResult::SyncFailed {
                        branch: branch.clone(),
                        error: format!("{:#}", e),
                    });
                }
            }
        }
    }

    /// Offer to delete fork branches that no longer exist upstream
    async fn prune_branches(
        &self,
        fork: &RepoId,
        fork_branches: &[String],
        upstream_branches: &[String],
        confirm: &mut dyn Confirm,
        results: &mut Vec<BranchResult>,
    ) {
        let removed = removed_branches(fork_branches, upstream_branches);

        if removed.is_empty() {
            info!("No extra branches to consider deleting");
            return;
        }

        info!("Branches existing in fork but deleted upstream:");
        for branch in &removed {
            info!("  - {}", branch);
        }

        for branch in removed {
            if self.config.dry_run && !self.config.non_interactive {
                info!("Would ask whether to delete '{}' (dry run)", branch);
                results.push(BranchResult::Planned {
                    branch,
                    action: PlannedAction::Prompt,
                });
                continue;
            }

            let question = format!("? Delete branch '{}' from {} (y/N): ", branch, fork);
            let delete = match confirm.confirm(&question) {
                Ok(answer) => answer,
                Err(e) => {
                    warn!("No answer for '{}', keeping it: {:#}", branch, e);
                    false
                }
            };

            if !delete {
                info!("Kept '{}'", branch);
                results.push(BranchResult::Kept { branch });
                continue;
            }

            if self.config.dry_run {
                info!("Would delete '{}' from {} (dry run)", branch, fork);
                results.push(BranchResult::Planned {
                    branch,
                    action: PlannedAction::Delete,
                });
                continue;
            }

            match self.forge.delete_branch(fork, &branch).await {
                Ok(()) => {
                    info!("Deleted '{}'", branch);
                    results.push(BranchResult::Deleted { branch });
                }
                Err(e) => {
                    warn!(
                        "Failed to delete {}, maybe protected or permission denied: {:#}",
                        branch, e
                    );
                    results.push(BranchResult::DeleteFailed {
                        branch,
                        error: format!("{:#}", e),
                    });
                }
            }
        }
    }
}
