use anyhow::{Context, Result};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command as AsyncCommand;
use tracing::debug;

use crate::branches::parse_branch_list;
use crate::config::Config;
use crate::forge::{parse_fork_listing, ForkPair, Forge, RepoId};

/// Failure of a single `gh` invocation
#[derive(Debug, Error)]
pub enum GhError {
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`gh {args}` failed ({}): {stderr}", describe_exit(.code))]
    Failed {
        args: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`gh {args}` produced non-UTF-8 output")]
    InvalidOutput { args: String },

    #[error("Malformed fork listing: {0}")]
    MalformedListing(#[from] serde_json::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// GitHub CLI wrapper implementing [`Forge`]
///
/// Every call is a direct process spawn with an explicit argument vector, so
/// repository and branch names never pass through a shell.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: String,
    list_limit: u32,
}

impl GhCli {
    /// Create a client using the executable and limits from `config`
    pub fn new(config: &Config) -> Self {
        Self {
            program: config.gh.path.clone(),
            list_limit: config.gh.list_limit,
        }
    }

    /// Executable this client invokes
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run `gh` with `args`, returning trimmed stdout on success
    async fn run(&self, args: &[String]) -> std::result::Result<String, GhError> {
        let joined = args.join(" ");
        debug!("Running: {} {}", self.program, joined);

        let output = AsyncCommand::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| GhError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GhError::Failed {
                args: joined,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout =
            String::from_utf8(output.stdout).map_err(|_| GhError::InvalidOutput { args: joined })?;

        Ok(stdout.trim().to_string())
    }

    /// First line of `gh --version`
    pub async fn version(&self) -> std::result::Result<String, GhError> {
        let out = self.run(&["--version".to_string()]).await?;
        Ok(out.lines().next().unwrap_or_default().to_string())
    }

    /// Check that `gh` has a logged-in account
    pub async fn auth_status(&self) -> std::result::Result<(), GhError> {
        self.run(&args(["auth", "status"])).await.map(|_| ())
    }

    fn list_forks_args(&self, org: &str) -> Vec<String> {
        args([
            "repo",
            "list",
            org,
            "--fork",
            "--visibility",
            "public",
            "--json",
            "owner,name,parent",
            "--limit",
            &self.list_limit.to_string(),
        ])
    }
}

fn args<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn list_branches_args(repo: &RepoId) -> Vec<String> {
    args([
        "api",
        &format!("repos/{}/branches", repo),
        "--paginate",
        "--jq",
        ".[].name",
    ])
}

fn sync_branch_args(fork: &RepoId, upstream: &RepoId, branch: &str, force: bool) -> Vec<String> {
    let mut argv = args([
        "repo",
        "sync",
        &fork.to_string(),
        "--source",
        &upstream.to_string(),
        "--branch",
        branch,
    ]);
    if force {
        argv.push("--force".to_string());
    }
    argv
}

/// Bytes that would change how `gh api` parses a ref path segment
const REF_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encode each `/`-separated segment of a branch name, keeping the separators
fn encode_ref_path(branch: &str) -> String {
    branch
        .split('/')
        .map(|segment| utf8_percent_encode(segment, REF_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn delete_branch_args(repo: &RepoId, branch: &str) -> Vec<String> {
    args([
        "api",
        "-X",
        "DELETE",
        &format!("repos/{}/git/refs/heads/{}", repo, encode_ref_path(branch)),
    ])
}

#[async_trait]
impl Forge for GhCli {
    async fn list_forks(&self, org: &str) -> Result<Vec<ForkPair>> {
        let json = self
            .run(&self.list_forks_args(org))
            .await
            .with_context(|| format!("Failed to list forks for organization {}", org))?;

        let pairs = parse_fork_listing(&json)
            .map_err(GhError::from)
            .with_context(|| format!("Failed to parse fork listing for organization {}", org))?;

        debug!("Found {} forks in {}", pairs.len(), org);
        Ok(pairs)
    }

    async fn list_branches(&self, repo: &RepoId) -> Result<Vec<String>> {
        let out = self
            .run(&list_branches_args(repo))
            .await
            .with_context(|| format!("Failed to list branches of {}", repo))?;

        Ok(parse_branch_list(&out))
    }

    async fn sync_branch(
        &self,
        fork: &RepoId,
        upstream: &RepoId,
        branch: &str,
        force: bool,
    ) -> Result<()> {
        self.run(&sync_branch_args(fork, upstream, branch, force))
            .await?;
        Ok(())
    }

    async fn delete_branch(&self, repo: &RepoId, branch: &str) -> Result<()> {
        self.run(&delete_branch_args(repo, branch)).await?;
        Ok(())
    }
}
