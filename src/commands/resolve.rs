//! Resolve command handler: batch-resolve URLs from arguments or stdin.

use std::io::{self, IsTerminal, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use resolveurl_core::resolver::{BatchCoordinator, BatchReport, DispatchOptions, Dispatcher};
use resolveurl_core::{FileConfig, ResolutionOutcome};
use tracing::{info, warn};

use super::registry_from_config;
use crate::ProcessExit;
use crate::cli::ResolveArgs;

pub async fn run_resolve_command(args: &ResolveArgs, config: &FileConfig) -> Result<ProcessExit> {
    let urls = if args.urls.is_empty() {
        if io::stdin().is_terminal() {
            info!("No input provided. Pass URLs as arguments or pipe them via stdin.");
            info!("Example: echo 'https://youtu.be/dQw4w9WgXcQ' | resolveurl resolve");
            return Ok(ProcessExit::Success);
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read URLs from stdin")?;
        parse_url_lines(&buffer)
    } else {
        parse_url_lines(&args.urls.join("\n"))
    };

    if urls.is_empty() {
        info!("No URLs found in input");
        return Ok(ProcessExit::Success);
    }

    let registry = registry_from_config(config);
    let dispatcher = Arc::new(Dispatcher::new(registry, dispatch_options(args, config)));
    let concurrency = args
        .concurrency
        .map_or_else(|| config.concurrency_or_default(), usize::from);
    let batch = BatchCoordinator::new(dispatcher, concurrency)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_signal = Arc::clone(&interrupted);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupted_signal.store(true, Ordering::SeqCst);
        }
    });

    info!(urls = urls.len(), concurrency, "Resolving");
    let report = batch.resolve_many_until(urls, interrupted).await;
    if report.interrupted {
        warn!("Interrupted; unfinished URLs are reported as cancelled");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(determine_exit_outcome(&report))
}

/// Applies CLI overrides on top of the file configuration.
fn dispatch_options(args: &ResolveArgs, config: &FileConfig) -> DispatchOptions {
    let mut options = config.dispatch_options();
    if args.no_universal {
        options.allow_universal = false;
    }
    if args.no_popups {
        options.allow_popups = false;
    }
    if args.no_auto_pick {
        options.auto_pick = false;
    }
    if let Some(secs) = args.timeout {
        options.candidate_timeout = Duration::from_secs(secs);
    }
    if let Some(max) = args.max_candidates {
        options.max_candidates = Some(usize::from(max));
    }
    options
}

/// Splits input into URLs, skipping blank lines and `#` comments.
fn parse_url_lines(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn print_report(report: &BatchReport) {
    for outcome in &report.outcomes {
        println!("{}", render_outcome_row(outcome));
    }
    println!(
        "Resolved {}/{} URL(s){}",
        report.successful(),
        report.total(),
        if report.interrupted { " (interrupted)" } else { "" }
    );
}

fn render_outcome_row(outcome: &ResolutionOutcome) -> String {
    match (&outcome.resolved_url, &outcome.resolver_used) {
        (Some(resolved), Some(resolver)) => {
            format!("OK    {} -> {resolved} [{resolver}]", outcome.original_url)
        }
        _ => {
            let category = outcome.category().map_or("unknown", |c| c.as_str());
            format!(
                "FAIL  {} ({category}): {}",
                outcome.original_url,
                outcome.message()
            )
        }
    }
}

/// Maps a batch report to the process exit outcome.
fn determine_exit_outcome(report: &BatchReport) -> ProcessExit {
    if report.failed() == 0 {
        ProcessExit::Success
    } else {
        ProcessExit::Failure
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use resolveurl_core::ResolveError;

    use super::*;

    #[test]
    fn test_parse_url_lines_skips_blanks_and_comments() {
        let urls = parse_url_lines("  https://a.example/1 \n\n# note\nhttps://b.example/2\n");
        assert_eq!(urls, vec!["https://a.example/1", "https://b.example/2"]);
    }

    #[test]
    fn test_dispatch_options_cli_overrides_config() {
        let config = FileConfig {
            candidate_timeout_secs: Some(20),
            max_candidates: Some(9),
            ..FileConfig::default()
        };
        let args = ResolveArgs {
            no_universal: true,
            timeout: Some(4),
            ..ResolveArgs::default()
        };
        let options = dispatch_options(&args, &config);
        assert!(!options.allow_universal);
        assert!(options.allow_popups);
        assert!(options.auto_pick);
        assert_eq!(options.candidate_timeout, Duration::from_secs(4));
        assert_eq!(options.max_candidates, Some(9));
    }

    #[test]
    fn test_render_outcome_rows() {
        let ok = ResolutionOutcome::resolved(
            "https://a.example/v",
            "https://cdn.example/v.mp4",
            "DirectLink",
            HashMap::new(),
            Vec::new(),
        );
        assert_eq!(
            render_outcome_row(&ok),
            "OK    https://a.example/v -> https://cdn.example/v.mp4 [DirectLink]"
        );

        let failed = ResolutionOutcome::failed(
            "https://b.example",
            &ResolveError::no_resolver("https://b.example"),
            Vec::new(),
        );
        let row = render_outcome_row(&failed);
        assert!(row.starts_with("FAIL  https://b.example (no_resolver_found)"));
    }

    #[test]
    fn test_exit_outcome_failure_when_any_failed() {
        let ok = ResolutionOutcome::resolved("u", "r", "X", HashMap::new(), Vec::new());
        let failed = ResolutionOutcome::failed("v", &ResolveError::no_resolver("v"), Vec::new());

        let all_ok = BatchReport {
            outcomes: vec![ok.clone()],
            interrupted: false,
        };
        assert_eq!(determine_exit_outcome(&all_ok), ProcessExit::Success);

        let mixed = BatchReport {
            outcomes: vec![ok, failed],
            interrupted: false,
        };
        assert_eq!(determine_exit_outcome(&mixed), ProcessExit::Failure);

        let empty = BatchReport {
            outcomes: Vec::new(),
            interrupted: false,
        };
        assert_eq!(determine_exit_outcome(&empty), ProcessExit::Success);
    }
}
