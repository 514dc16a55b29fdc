//! vcsbind CLI - plan and apply VCS bindings for a workspace file

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use vcsbind::pass::{self, PassMode, PassReport};
use vcsbind::{Drift, FixSuggestion, MemoryStore, StateFile, VcsError, Workspace};

const DEFAULT_STATE_FILE: &str = "vcsbind.state.json";

#[derive(Parser)]
#[command(name = "vcsbind")]
#[command(about = "Resolve and reconcile VCS integration bindings")]
#[command(version)]
struct Cli {
    /// Show debug logs (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a workspace file
    Validate {
        /// Path to the workspace YAML file
        file: PathBuf,
    },

    /// Show what apply would change
    Plan {
        /// Path to the workspace YAML file
        file: PathBuf,

        /// State file to compare against
        #[arg(short, long, default_value = DEFAULT_STATE_FILE)]
        state: PathBuf,
    },

    /// Resolve bindings and persist the ones that changed
    Apply {
        /// Path to the workspace YAML file
        file: PathBuf,

        /// State file to read and update
        #[arg(short, long, default_value = DEFAULT_STATE_FILE)]
        state: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Validate { file } => validate_workspace(&file).await,
        Commands::Plan { file, state } => run_pass(&file, &state, PassMode::Plan).await,
        Commands::Apply { file, state } => run_pass(&file, &state, PassMode::Apply).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

async fn read_workspace(file: &Path) -> Result<Workspace, VcsError> {
    let yaml = tokio::fs::read_to_string(file).await?;
    Workspace::from_yaml(&yaml)
}

async fn validate_workspace(file: &Path) -> Result<(), VcsError> {
    let workspace = read_workspace(file).await?;
    workspace.validate()?;

    println!("{} Workspace '{}' is valid", "✓".green(), file.display());
    println!("  Spaces: {}", workspace.space_tree().len());
    println!("  Integrations: {}", workspace.integrations.len());
    println!("  Lookups: {}", workspace.lookups.len());
    println!("  Stacks: {}", workspace.stacks.len());
    println!("  Modules: {}", workspace.modules.len());

    Ok(())
}

async fn run_pass(file: &Path, state_path: &Path, mode: PassMode) -> Result<(), VcsError> {
    let workspace = read_workspace(file).await?;
    let store = MemoryStore::from_state(StateFile::load(state_path)?);
    let serial_before = store.serial();

    let report = pass::run(&workspace, &store, mode)?;
    print_report(&report);

    if mode == PassMode::Apply && store.serial() != serial_before {
        store.to_state().save(state_path)?;
    }

    match mode {
        PassMode::Plan => println!(
            "{} {} to change, {} unchanged",
            "Plan:".cyan().bold(),
            report.change_count(),
            report.outcomes.len() - report.change_count()
        ),
        PassMode::Apply => println!(
            "{} {} changed, {} unchanged (serial {})",
            "Apply:".cyan().bold(),
            report.change_count(),
            report.outcomes.len() - report.change_count(),
            store.serial()
        ),
    }
    Ok(())
}

fn print_report(report: &PassReport) {
    for outcome in &report.outcomes {
        let binding = &outcome.binding;
        let line = format!(
            "{} {} = {}",
            binding.entity,
            binding.kind.block_name(),
            binding.resolved_id
        );
        match &outcome.drift {
            Drift::Unchanged => println!("  {} {}", "=".dimmed(), line),
            Drift::Created => println!("  {} {}", "+".green(), line),
            Drift::IdChanged { from, .. } => println!("  {} {} (was {})", "~".yellow(), line, from),
            Drift::KindChanged { from, .. } => {
                println!("  {} {} (replaces {})", "~".yellow(), line, from.block_name())
            }
        }
    }
}
