use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use typical::report::{render_human, render_json};
use typical::{load_config, run_check};

#[derive(Parser)]
#[command(name = "typical")]
#[command(about = "Check Typical schema files for cross-file consistency", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze schema files and report diagnostics
    Check {
        /// Files or directories to check
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Configuration file (defaults to ./typical.toml when present)
        #[arg(short, long, env = "TYPICAL_CONFIG")]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Human)]
        format: Format,

        /// Exit unsuccessfully on warnings too
        #[arg(long)]
        deny_warnings: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Human,
    Json,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.debug {
        tracing::Level::TRACE
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_target(cli.debug) // Show target module in debug mode
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            paths,
            config,
            format,
            deny_warnings,
        } => {
            let cwd = std::env::current_dir()?;
            let config = load_config(config.as_deref(), &cwd)?;
            let report = run_check(&paths, config)?;

            match format {
                Format::Human => print!("{}", render_human(&report)),
                Format::Json => println!("{}", render_json(&report)?),
            }

            Ok(if report.failed(deny_warnings) {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}
