mod cli;
mod config;
mod host;
mod logging;
mod process;
mod report;
mod workflow;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::output::{ConsoleHandler, OutputHandler, QuietHandler};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stagerun")]
#[command(about = "Staged runner for declarative shell task workflows")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress normal output
    #[arg(long, global = true)]
    quiet: bool,

    /// Write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Write logs to a timestamped file under the user config directory
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workflow definition file
    Run {
        /// Workflow definition JSON file
        file: PathBuf,

        /// Maximum number of concurrently running tasks (defaults to the
        /// CPU count)
        #[arg(short = 't', long = "threads", default_value_t = 0)]
        threads: usize,
    },

    /// Validate a workflow definition without running it
    Validate {
        /// Workflow definition JSON file
        file: PathBuf,
    },
}

impl Commands {
    fn file(&self) -> &PathBuf {
        match self {
            Commands::Run { file, .. } | Commands::Validate { file } => file,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = if let Some(path) = cli.log_file.clone() {
        Some(path)
    } else if cli.log {
        let stem = cli
            .command
            .file()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("workflow");
        Some(logging::default_log_path(stem)?)
    } else {
        None
    };
    logging::init_logging(cli.debug, cli.quiet, log_file)?;

    let handler: Box<dyn OutputHandler> = if cli.quiet {
        Box::new(QuietHandler)
    } else {
        Box::new(ConsoleHandler)
    };

    let exit_code = match cli.command {
        Commands::Run { file, threads } => {
            cli::commands::run_workflow(&file, threads, handler.as_ref())
                .await
                .map_err(|e| anyhow::anyhow!(e))?
        }
        Commands::Validate { file } => cli::commands::validate_workflow(&file, handler.as_ref()),
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
