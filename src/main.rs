//! CLI entry point for the resolveurl tool.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use resolveurl_core::VerbositySetting;
use resolveurl_core::config::{LoadedConfig, load_default_file_config, load_file_config};
use tracing::debug;

mod cli;
mod commands;

use cli::{Cli, Command};

/// Process exit outcome; any failed URL exits with code 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    Success,
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::from(2),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => load_file_config(path).map(|config| LoadedConfig {
            path: Some(path.clone()),
            config,
            loaded_from_file: true,
        }),
        None => load_default_file_config(),
    };

    init_tracing(&cli, loaded.as_ref().ok().and_then(|l| l.config.verbosity));
    let loaded = loaded.context("Failed to load configuration")?;

    debug!(?cli, "CLI arguments parsed");
    debug!(
        path = ?loaded.path,
        loaded_from_file = loaded.loaded_from_file,
        "Configuration resolved"
    );

    let exit = match &cli.command {
        Command::Resolve(args) => {
            commands::run_resolve_command(args, &loaded.config).await?
        }
        Command::List(args) => {
            commands::run_list_command(args, &loaded.config)?;
            ProcessExit::Success
        }
        Command::Serve(args) => {
            commands::run_serve_command(args, &loaded.config).await?;
            ProcessExit::Success
        }
    };
    Ok(exit.into())
}

/// Installs the log subscriber on stderr.
///
/// Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > default (info)
fn init_tracing(cli: &Cli, configured: Option<VerbositySetting>) {
    let default_level = default_log_level(cli.quiet, cli.verbose, configured);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_log_level(quiet: bool, verbose: u8, configured: Option<VerbositySetting>) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => match configured {
            Some(VerbositySetting::Quiet) => "error",
            Some(VerbositySetting::Verbose | VerbositySetting::Debug) => "debug",
            Some(VerbositySetting::Default) | None => "info",
        },
        1 => "debug",
        _ => "trace",
    }
}
