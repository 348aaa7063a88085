//! Preflight checks for forksync
//!
//! Verifies the GitHub CLI can be run and is logged in before any fork is
//! touched.

use crate::github::GhCli;

/// Result of system health checks
#[derive(Debug, Clone)]
pub struct HealthCheck {
    /// GitHub CLI installation status
    pub gh: CheckResult,
    /// GitHub CLI authentication status
    pub gh_auth: CheckResult,
}

/// Result of an individual health check
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    fn ok_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: Some(details.into()),
        }
    }

    fn ok(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: None,
        }
    }

    fn error_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details: Some(details.into()),
        }
    }
}

impl HealthCheck {
    /// Run all health checks
    pub async fn run(gh: &GhCli) -> Self {
        let gh_check = Self::check_gh(gh).await;

        // Auth can only be checked once the binary itself runs
        let gh_auth = if gh_check.passed {
            Self::check_gh_auth(gh).await
        } else {
            CheckResult::error_with_details(
                "GitHub CLI authentication not checked",
                "gh must be installed first",
            )
        };

        Self {
            gh: gh_check,
            gh_auth,
        }
    }

    /// Check if all checks passed
    pub fn all_passed(&self) -> bool {
        self.gh.passed && self.gh_auth.passed
    }

    async fn check_gh(gh: &GhCli) -> CheckResult {
        match gh.version().await {
            Ok(version) => CheckResult::ok_with_details("GitHub CLI installed", version),
            Err(e) => CheckResult::error_with_details(
                format!("GitHub CLI not usable at '{}'", gh.program()),
                format!("{}\nInstall gh: https://cli.github.com", e),
            ),
        }
    }

    async fn check_gh_auth(gh: &GhCli) -> CheckResult {
        match gh.auth_status().await {
            Ok(()) => CheckResult::ok("GitHub CLI authenticated"),
            Err(e) => CheckResult::error_with_details(
                "GitHub CLI authentication failed",
                format!("{}\nRun: gh auth login", e),
            ),
        }
    }

    /// Get all checks as a slice for iteration
    pub fn all_checks(&self) -> [(&'static str, &CheckResult); 2] {
        [("GitHub CLI", &self.gh), ("Authentication", &self.gh_auth)]
    }
}
