use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use helper_audit_cli::pipeline::{run_analysis, AnalyzeOptions};
use helper_audit_cli::policy::load_policy;
use helper_audit_cli::preview::plan_deletion;
use helper_audit_cli::store::JsonStateStore;

#[derive(Parser)]
#[command(name = "helper-audit")]
#[command(about = "Find orphaned Home Assistant helpers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze helper reachability and write the report files
    Analyze {
        /// Configuration directory to scan
        #[arg(long, default_value = "/config")]
        config_dir: PathBuf,

        /// States snapshot JSON (live entity/state table)
        #[arg(long)]
        states: PathBuf,

        /// Results directory (default: <config_dir>/helper_analysis)
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// JSON policy file overriding the tuned heuristic tables
        #[arg(long)]
        policy: Option<PathBuf>,
    },

    /// Plan deletion of orphaned helpers (dry run: preview + backup only)
    #[command(visible_alias = "plan")]
    Preview {
        /// Results directory produced by `analyze`
        #[arg(long, default_value = "/config/helper_analysis")]
        results_dir: PathBuf,

        /// States snapshot JSON (live entity/state table)
        #[arg(long)]
        states: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Analyze {
            config_dir,
            states,
            results_dir,
            policy,
        } => {
            let options = AnalyzeOptions {
                results_dir: results_dir.unwrap_or_else(|| config_dir.join("helper_analysis")),
                config_dir,
                policy: load_policy(policy.as_deref())?,
            };
            let store = Arc::new(JsonStateStore::load(&states)?);

            // The whole pipeline is blocking file I/O; keep it off the
            // scheduler threads.
            let output = tokio::task::spawn_blocking(move || run_analysis(&options, &*store))
                .await
                .context("analysis task panicked")??;

            let totals = &output.report.analysis;
            println!("Total helpers analyzed: {}", totals.total_helpers);
            println!("Actively used: {}", totals.referenced_count);
            println!("Dashboard-only: {}", totals.dashboard_only_count);
            println!("Potentially orphaned: {}", totals.orphaned_count);
            if totals.error_count > 0 {
                println!("Analysis errors: {}", totals.error_count);
            }
            if let Some(path) = &output.emitted.json_report {
                println!("Report: {}", path.display());
            }
            if let Some(path) = &output.emitted.orphaned_list {
                println!("Orphaned list: {}", path.display());
            }
        }
        Commands::Preview {
            results_dir,
            states,
        } => {
            let store = Arc::new(JsonStateStore::load(&states)?);
            let output =
                tokio::task::spawn_blocking(move || plan_deletion(&results_dir, &*store))
                    .await
                    .context("preview task panicked")??;

            println!("Helpers planned for deletion: {}", output.planned.len());
            if output.missing > 0 {
                println!("Already gone: {}", output.missing);
            }
            if let Some(path) = &output.preview_file {
                println!("Preview: {}", path.display());
            }
            if let Some(path) = &output.backup_file {
                println!("Backup: {}", path.display());
            }
        }
    }

    Ok(())
}
