use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the organization whose forks are synced
pub const ENV_ORG: &str = "SYNC_ORG";
/// Environment variable selecting non-interactive mode
pub const ENV_NON_INTERACTIVE: &str = "SYNC_NON_INTERACTIVE";
/// Environment variable answering deletion prompts in non-interactive mode
pub const ENV_DELETE_REMOVED: &str = "SYNC_DELETE_REMOVED";
/// Environment variable toggling `--force` on `gh repo sync`
pub const ENV_FORCE: &str = "SYNC_FORCE";

const TRUTHY: [&str; 4] = ["1", "true", "yes", "y"];

/// Main configuration structure for forksync
///
/// Built once at startup and passed by reference to every component.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Organization whose public forks are synchronized
    #[serde(default = "default_org")]
    pub org: String,

    /// Never prompt; answer deletion questions with `delete_removed`
    #[serde(default)]
    pub non_interactive: bool,

    /// Answer used for every deletion question in non-interactive mode
    #[serde(default)]
    pub delete_removed: bool,

    /// Pass `--force` to `gh repo sync`
    #[serde(default = "default_true")]
    pub force: bool,

    /// Report what would happen without syncing or deleting anything
    #[serde(default)]
    pub dry_run: bool,

    /// GitHub CLI settings
    #[serde(default)]
    pub gh: GhConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GitHub CLI configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GhConfig {
    /// Path or name of the `gh` executable
    #[serde(default = "default_gh_path")]
    pub path: String,

    /// Maximum number of forks requested from `gh repo list`
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log level used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,
}

// Default value functions
fn default_org() -> String {
    "tbxark-fork".to_string()
}
fn default_true() -> bool {
    true
}
fn default_gh_path() -> String {
    "gh".to_string()
}
fn default_list_limit() -> u32 {
    1000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GhConfig {
    fn default() -> Self {
        Self {
            path: default_gh_path(),
            list_limit: default_list_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            color: default_true(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            org: default_org(),
            non_interactive: false,
            delete_removed: false,
            force: default_true(),
            dry_run: false,
            gh: GhConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Parse a boolean flag value.
///
/// `1`, `true`, `yes` and `y` (any case) are true. An unset or blank value
/// yields `default`; any other value is false.
pub fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(str::trim) {
        None | Some("") => default,
        Some(v) => TRUTHY.iter().any(|t| v.eq_ignore_ascii_case(t)),
    }
}

impl Config {
    /// Load the file layer: an explicit path must exist, the XDG default may not
    pub fn load_file_layer(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Self::default_config_path()?;
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    tracing::debug!("No config file at {:?}, using defaults", default_path);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.expand_paths()?;

        Ok(config)
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("forksync").join("config.yml"))
    }

    /// Expand `~` and environment variables in the gh executable path
    pub fn expand_paths(&mut self) -> Result<()> {
        self.gh.path = shellexpand::full(&self.gh.path)
            .context("Failed to expand gh path")?
            .into_owned();

        Ok(())
    }

    /// Apply the SYNC_* environment variables on top of the current values
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply SYNC_* overrides using `lookup` as the environment
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(org) = lookup(ENV_ORG).filter(|v| !v.trim().is_empty()) {
            self.org = org.trim().to_string();
        }

        self.non_interactive =
            parse_bool(lookup(ENV_NON_INTERACTIVE).as_deref(), self.non_interactive);
        self.delete_removed = parse_bool(lookup(ENV_DELETE_REMOVED).as_deref(), self.delete_removed);
        self.force = parse_bool(lookup(ENV_FORCE).as_deref(), self.force);
    }
}
