use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use forksync::config::LoggingConfig;
use forksync::health::CheckResult;
use forksync::sync::{BranchResult, SyncSummary};
use forksync::{AutoConfirm, Config, Confirm, GhCli, HealthCheck, PromptConfirm, SyncEngine};

#[derive(Parser)]
#[command(name = "forksync")]
#[command(about = "Keep organization forks in sync with their upstream repositories")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Organization whose forks are synced (overrides SYNC_ORG)
    #[arg(long, global = true)]
    org: Option<String>,

    /// Never prompt; answer deletion questions with --delete-removed
    #[arg(long, global = true)]
    non_interactive: bool,

    /// Delete fork-only branches when running non-interactively
    #[arg(long, global = true)]
    delete_removed: bool,

    /// Sync without --force; diverged branches fail instead of being overwritten
    #[arg(long, global = true)]
    no_force: bool,

    /// Report what would be synced or deleted without changing anything
    #[arg(long, global = true)]
    dry_run: bool,

    /// Path to the gh executable
    #[arg(long, global = true)]
    gh: Option<String>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Sync every fork from its upstream and prune removed branches (default)
    Sync,

    /// List the forks that would be synced
    List,

    /// Check that the GitHub CLI is installed and authenticated
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;

    init_logging(cli.verbose, &config.logging);
    info!("Starting forksync v{}", env!("CARGO_PKG_VERSION"));

    let gh = GhCli::new(&config);

    match cli.command.unwrap_or(Commands::Sync) {
        Commands::Sync => cmd_sync(&config, gh).await,
        Commands::List => cmd_list(&config, gh).await,
        Commands::Doctor => cmd_doctor(&gh).await,
    }
}

/// Layer configuration: defaults, config file, SYNC_* environment, then flags
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_file_layer(cli.config.as_deref())?;

    config.apply_env();

    if let Some(org) = &cli.org {
        config.org = org.clone();
    }
    if let Some(gh) = &cli.gh {
        config.gh.path = gh.clone();
        config.expand_paths()?;
    }
    config.non_interactive |= cli.non_interactive;
    config.delete_removed |= cli.delete_removed;
    config.dry_run |= cli.dry_run;
    if cli.no_force {
        config.force = false;
    }

    Ok(config)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool, logging: &LoggingConfig) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(logging.color))
        .with(filter)
        .init();
}

/// Sync all forks of the configured organization
async fn cmd_sync(config: &Config, gh: GhCli) -> Result<()> {
    let version = gh
        .version()
        .await
        .context("GitHub CLI is not available. Run: forksync doctor")?;
    info!("Using {}", version);

    if config.dry_run {
        println!("🔍 Dry run mode - nothing will be synced or deleted");
    }
    if !config.force {
        println!("🐢 Force sync disabled - diverged branches will fail");
    }

    let mut confirm: Box<dyn Confirm> = if config.non_interactive {
        Box::new(AutoConfirm::new(config.delete_removed))
    } else {
        Box::new(PromptConfirm::stdio())
    };

    let engine = SyncEngine::new(config.clone(), gh);
    let summary = engine.run(confirm.as_mut()).await?;

    print_summary(&summary);
    Ok(())
}

/// List the forks that would be synced
async fn cmd_list(config: &Config, gh: GhCli) -> Result<()> {
    let engine = SyncEngine::new(config.clone(), gh);
    let pairs = engine.discover().await?;

    println!("Forks of {} ({}):", config.org, pairs.len());
    for pair in pairs {
        println!("  📁 {} <- {}", pair.fork, pair.upstream);
    }

    Ok(())
}

/// System health check and diagnostics
async fn cmd_doctor(gh: &GhCli) -> Result<()> {
    let health = HealthCheck::run(gh).await;
    print_health_report(&health);

    if !health.all_passed() {
        bail!("Some checks failed");
    }
    Ok(())
}

fn print_summary(summary: &SyncSummary) {
    println!("\n🎉 Synchronization Complete!");
    println!("   📊 Forks processed: {}", summary.total_pairs);
    println!("   ✅ Branches synced: {}", summary.synced);
    println!("   ❌ Sync failures: {}", summary.sync_failed);
    println!("   🗑️  Branches deleted: {}", summary.deleted);
    println!("   📌 Branches kept: {}", summary.kept);
    println!("   ⚠️  Delete failures: {}", summary.delete_failed);
    if summary.planned > 0 {
        println!("   🔍 Planned actions (dry run): {}", summary.planned);
    }
    println!("   ⏱️  Duration: {:.2}s", summary.duration.as_secs_f64());

    if summary.failed_pairs > 0 || summary.sync_failed > 0 || summary.delete_failed > 0 {
        println!("\n🔍 Failed Operations:");
        for report in &summary.reports {
            if let Some(error) = &report.error {
                println!("   ❌ {}: {}", report.pair.fork, error);
            }
            for result in &report.results {
                match result {
                    BranchResult::SyncFailed { branch, error } => {
                        println!("   ❌ {} sync {}: {}", report.pair.fork, branch, error);
                    }
                    BranchResult::DeleteFailed { branch, error } => {
                        println!("   ⚠️  {} delete {}: {}", report.pair.fork, branch, error);
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Print health check report to stdout
fn print_health_report(health: &HealthCheck) {
    fn print_check(name: &str, result: &CheckResult) {
        println!("{}:", name);
        let icon = if result.passed { "✅" } else { "❌" };
        println!("  {} {}", icon, result.message);
        if let Some(details) = &result.details {
            for line in details.lines() {
                println!("     {}", line);
            }
        }
    }

    println!("🔍 forksync System Diagnostics");
    println!();

    for (name, result) in health.all_checks() {
        print_check(name, result);
        println!();
    }

    if health.all_passed() {
        println!("✅ All checks passed");
    } else {
        println!("❌ Some checks failed");
    }
}
