//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Resolve hosting-page and embed URLs into direct media URLs.
#[derive(Parser, Debug)]
#[command(name = "resolveurl")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve URLs given as arguments, or one per line on stdin
    Resolve(ResolveArgs),
    /// List registered resolvers
    List(ListArgs),
    /// Run the HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
pub struct ResolveArgs {
    /// URLs to resolve (reads stdin when omitted)
    pub urls: Vec<String>,

    /// Maximum concurrent resolutions (1-100)
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,

    /// Per-resolver timeout in seconds (1-600)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=600))]
    pub timeout: Option<u64>,

    /// Maximum resolvers tried per URL (1-1000)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=1000))]
    pub max_candidates: Option<u16>,

    /// Skip resolvers flagged universal
    #[arg(long)]
    pub no_universal: bool,

    /// Skip resolvers that need an interactive popup
    #[arg(long)]
    pub no_popups: bool,

    /// Fail instead of picking the first stream when a page offers several
    #[arg(long)]
    pub no_auto_pick: bool,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only show enabled resolvers
    #[arg(long)]
    pub enabled_only: bool,

    /// Only show resolvers claiming a matching domain
    #[arg(long, value_name = "QUERY")]
    pub domain: Option<String>,

    /// Print descriptors as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind (default from config, else 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (default from config, else 5000)
    #[arg(long)]
    pub port: Option<u16>,
}
