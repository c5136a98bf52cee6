#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode};
use quire_core::config::{self, EffectiveConfig};
use quire_core::error::ErrorCode;
use quire_core::order::ReorderError;
use std::env;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "quire: keep forum posts, sections and galleries in order",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output (alias for `--format json`).
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Explicit output choice from flags, if any.
    fn format_flag(&self) -> Option<&'static str> {
        if self.json {
            Some(OutputMode::Json.as_str())
        } else {
            self.format.map(OutputMode::as_str)
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Create .quire/ with a default config and a migrated store",
        after_help = "EXAMPLES:\n    quire init"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        about = "Put some members of one group first, in the given order",
        after_help = "EXAMPLES:\n    # Move posts 12 and 9 to the top of continuity 3\n    quire reorder post 12 9 --actor 1\n\n    # Reorder inside a section\n    quire reorder post 40 41 --section 7 --actor 1"
    )]
    Reorder(cmd::reorder::ReorderArgs),

    #[command(
        about = "Print one group in position order",
        after_help = "EXAMPLES:\n    quire list post --parent 3\n    quire list gallery --parent 8 --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        about = "Renumber one group 0..n without changing its order",
        after_help = "EXAMPLES:\n    quire compact section --parent 3 --actor 1"
    )]
    Compact(cmd::compact::CompactArgs),

    #[command(
        about = "Report groups whose positions are not exactly 0..n",
        after_help = "EXAMPLES:\n    quire check\n    quire check post --broken"
    )]
    Check(cmd::check::CheckArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("QUIRE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "quire=debug,info"
        } else {
            "quire=info,warn"
        })
    });

    let format = env::var("QUIRE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Map a command failure to its stable code.
fn classify(err: &anyhow::Error) -> CliError {
    if let Some(reorder) = err.downcast_ref::<ReorderError>() {
        return CliError::from(reorder);
    }
    if let Some(missing) = err.downcast_ref::<cmd::NotInitialized>() {
        return CliError::new(ErrorCode::NotInitialized, missing.to_string());
    }
    if let Some(broken) = err.downcast_ref::<cmd::check::BrokenGroups>() {
        return CliError::new(ErrorCode::CorruptOrdering, broken.to_string());
    }
    CliError::new(ErrorCode::InternalUnexpected, format!("{err:#}"))
}

fn run(
    cli: &Cli,
    output: OutputMode,
    effective: &EffectiveConfig,
    project_root: &Path,
) -> anyhow::Result<()> {
    let project = &effective.project;

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, output, project_root),
        Commands::Reorder(args) => cmd::reorder::run_reorder(args, output, project, project_root),
        Commands::List(args) => cmd::list::run_list(args, output, project, project_root),
        Commands::Compact(args) => cmd::compact::run_compact(args, output, project, project_root),
        Commands::Check(args) => cmd::check::run_check(args, output, project, project_root),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let effective = match config::resolve_config(&project_root, cli.format_flag()) {
        Ok(effective) => effective,
        Err(err) => {
            let mode = cli.format_flag().map_or(OutputMode::Text, OutputMode::from_resolved);
            output::render_error(mode, &CliError::new(ErrorCode::ConfigParseError, format!("{err:#}")))?;
            return Ok(ExitCode::FAILURE);
        }
    };
    let output = OutputMode::from_resolved(&effective.resolved_output);

    match run(&cli, output, &effective, &project_root) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            tracing::debug!(error = %format!("{err:#}"), "command failed");
            output::render_error(output, &classify(&err))?;
            Ok(ExitCode::FAILURE)
        }
    }
}
