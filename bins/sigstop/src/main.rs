use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use sigstop_common::{ControlSignal, Pid};
use sigstop_process::ProcessTable;

mod commands;
mod config;

use config::SigstopConfig;

/// Suspend and resume processes, optionally with all their descendants
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// procfs root (overrides config)
    #[arg(long, value_name = "DIR")]
    proc_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send SIGSTOP to a process (by pid or name)
    Stop(SignalArgs),
    /// Send SIGCONT to a process (by pid or name)
    Resume(SignalArgs),
    /// List processes
    List {
        /// Only processes with exactly this name
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List the direct children of a process
    Children {
        pid: Pid,
        #[arg(long)]
        json: bool,
    },
    /// Show all descendants of a process
    Tree {
        pid: Pid,
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug)]
struct SignalArgs {
    /// Pid or executable name
    target: String,

    /// Also signal every descendant
    #[arg(short = 'c', long, conflicts_with = "no_children")]
    children: bool,

    /// Signal only the target itself
    #[arg(long)]
    no_children: bool,
}

impl SignalArgs {
    fn include_children(&self, default: bool) -> bool {
        if self.children {
            true
        } else if self.no_children {
            false
        } else {
            default
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let mut config = match &args.config {
        Some(path) => SigstopConfig::load_from_file(path)?,
        None => SigstopConfig::default(),
    };

    if let Some(root) = args.proc_root {
        config.proc_root = root;
    }

    initialize_logging(args.debug, &config.log_level);
    debug!("Using process table at {}", config.proc_root.display());

    let table = ProcessTable::with_root(&config.proc_root).protect(Pid::current());
    let mut out = io::stdout().lock();

    match args.command {
        Command::Stop(signal_args) => commands::signal(
            &table,
            &signal_args.target,
            ControlSignal::Stop,
            signal_args.include_children(config.include_children),
            &mut out,
        ),
        Command::Resume(signal_args) => commands::signal(
            &table,
            &signal_args.target,
            ControlSignal::Continue,
            signal_args.include_children(config.include_children),
            &mut out,
        ),
        Command::List { name, json } => {
            commands::list(&table, name.as_deref(), json, &mut out).map(|_| true)
        }
        Command::Children { pid, json } => {
            commands::children(&table, pid, json, &mut out).map(|_| true)
        }
        Command::Tree { pid, json } => commands::tree(&table, pid, json, &mut out).map(|_| true),
    }
}

fn initialize_logging(debug: bool, configured_level: &str) {
    let level = if debug { "debug" } else { configured_level };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
