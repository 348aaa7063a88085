//! Common test utilities: a scripted stand-in for the `gh` executable

use assert_fs::prelude::*;
use assert_fs::TempDir;
use forksync::Config;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

/// A fake `gh` living in a temp dir.
///
/// Every invocation appends its argv (space-joined) to `calls.log`. Responses
/// come from files in the same directory:
/// - `forks.json` answers `repo list`
/// - `repos_<owner>_<name>_branches` answers the branch listing
/// - `syncfail_<branch>` makes `repo sync` of that branch fail
/// - `fail_repos_<owner>_<name>_git_refs_heads_<branch>` makes that delete fail
pub struct FakeGh {
    pub dir: TempDir,
}

impl FakeGh {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path().display().to_string();

        let script = format!(
            r#"#!/bin/sh
printf '%s\n' "$*" >> "{root}/calls.log"
case "$1" in
  --version) echo "gh version 2.0.0 (fake)"; exit 0 ;;
  auth) exit 0 ;;
esac
if [ "$1" = "repo" ] && [ "$2" = "list" ]; then
  cat "{root}/forks.json" 2>/dev/null || {{ echo "GraphQL: Could not resolve to an Organization" >&2; exit 1; }}
  exit 0
fi
if [ "$1" = "repo" ] && [ "$2" = "sync" ]; then
  if [ -f "{root}/syncfail_$7" ]; then echo "can't sync: branches have diverged" >&2; exit 1; fi
  exit 0
fi
if [ "$1" = "api" ] && [ "$2" = "-X" ]; then
  key=$(printf '%s' "$4" | tr '/' '_')
  if [ -f "{root}/fail_$key" ]; then echo "HTTP 403: Resource not accessible by integration" >&2; exit 1; fi
  exit 0
fi
if [ "$1" = "api" ]; then
  key=$(printf '%s' "$2" | tr '/' '_')
  if [ -f "{root}/$key" ]; then cat "{root}/$key"; exit 0; fi
  echo "HTTP 404: Not Found" >&2
  exit 1
fi
echo "unknown command: $*" >&2
exit 2
"#
        );

        let gh = dir.child("gh");
        gh.write_str(&script).expect("Failed to write fake gh");
        let mut perms = std::fs::metadata(gh.path())
            .expect("Failed to stat fake gh")
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(gh.path(), perms).expect("Failed to chmod fake gh");

        Self { dir }
    }

    pub fn gh_path(&self) -> PathBuf {
        self.dir.path().join("gh")
    }

    /// Configuration pointing at this fake, non-interactive by default
    pub fn config(&self, delete_removed: bool) -> Config {
        let mut config = Config::default();
        config.org = "my-forks".to_string();
        config.non_interactive = true;
        config.delete_removed = delete_removed;
        config.gh.path = self.gh_path().display().to_string();
        config
    }

    pub fn forks_json(&self, json: &str) {
        self.dir
            .child("forks.json")
            .write_str(json)
            .expect("Failed to write forks.json");
    }

    /// Register one fork of `owner/name` under `my-forks`
    pub fn single_fork(&self, owner: &str, name: &str) {
        self.forks_json(&format!(
            r#"[{{"owner":{{"login":"my-forks"}},"name":"{name}","parent":{{"owner":{{"login":"{owner}"}},"name":"{name}"}}}}]"#
        ));
    }

    pub fn branches(&self, repo: &str, raw_output: &str) {
        let key = format!("repos/{}/branches", repo).replace('/', "_");
        self.dir
            .child(key)
            .write_str(raw_output)
            .expect("Failed to write branch list");
    }

    pub fn fail_sync(&self, branch: &str) {
        self.dir
            .child(format!("syncfail_{}", branch))
            .touch()
            .expect("Failed to mark sync failure");
    }

    pub fn fail_delete(&self, repo: &str, branch: &str) {
        let key = format!("repos/{}/git/refs/heads/{}", repo, branch).replace('/', "_");
        self.dir
            .child(format!("fail_{}", key))
            .touch()
            .expect("Failed to mark delete failure");
    }

    /// Every recorded invocation, in order
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with(prefix))
            .collect()
    }
}
