//! Traveller Construction - Development Tools

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use traveller_tools::commands;

#[derive(Parser)]
#[command(name = "traveller-tools")]
#[command(about = "Development tools for stored Traveller builds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and regenerate every stored build
    Validate {
        /// Path to the store directory
        path: PathBuf,
        /// RON rule policy applied in place of each build's own
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// List stored builds
    List {
        /// Path to the store directory
        path: PathBuf,
    },
    /// Print the manifest of one build
    Manifest {
        /// Path to the store directory
        path: PathBuf,
        /// Object id
        id: String,
    },
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path, rules } => {
            tracing::info!("Validating builds in: {}", path.display());
            let rules = match rules.as_deref().map(commands::load_rules).transpose() {
                Ok(rules) => rules,
                Err(e) => {
                    tracing::error!("Failed to load rules: {e}");
                    return ExitCode::FAILURE;
                }
            };
            match commands::validate_directory(&path, rules) {
                Ok(report) => {
                    for warning in &report.warnings {
                        println!("warning: {warning}");
                    }
                    for failure in &report.failures {
                        println!("error: {failure}");
                    }
                    println!(
                        "{} checked, {} failed, {} warnings",
                        report.checked,
                        report.failures.len(),
                        report.warnings.len()
                    );
                    if report.is_success() {
                        tracing::info!("Validation passed");
                        ExitCode::SUCCESS
                    } else {
                        tracing::error!("Validation failed");
                        ExitCode::FAILURE
                    }
                }
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::List { path } => match commands::list_directory(&path) {
            Ok(objects) => {
                for object in objects {
                    let marker = if object.read_only { "\tread-only" } else { "" };
                    println!("{}\t{}\t{}{marker}", object.id, object.name, object.kind);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!("Listing failed: {e}");
                ExitCode::FAILURE
            }
        },
        Commands::Manifest { path, id } => match commands::render_manifest(&path, &id) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!("Manifest failed: {e}");
                ExitCode::FAILURE
            }
        },
    }
}
