//! Concurrent resolution of many URLs with bounded parallelism.
//!
//! The [`BatchCoordinator`] runs each URL through the shared [`Dispatcher`]
//! in its own task, at most `concurrency` at a time. Outcomes come back in
//! input order regardless of completion order, and one URL's failure never
//! affects another.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::outcome::{ErrorCategory, OutcomeError, ResolutionOutcome};
use super::{Dispatcher, ResolveError};

/// Minimum allowed concurrency.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency.
pub const MAX_CONCURRENCY: usize = 100;

/// Concurrency used when the CPU count cannot be determined.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 10;

const INTERRUPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Returns the default batch concurrency: CPU cores, clamped to the allowed range.
#[must_use]
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map_or(DEFAULT_BATCH_CONCURRENCY, std::num::NonZeroUsize::get)
        .clamp(MIN_CONCURRENCY, MAX_CONCURRENCY)
}

/// Error type for batch coordinator construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// Outcomes of one batch run, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// One outcome per input URL, same order as the input.
    pub outcomes: Vec<ResolutionOutcome>,
    /// True if the batch was cancelled before every URL finished.
    pub interrupted: bool,
}

impl BatchReport {
    /// Returns the number of outcomes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns the number of successful outcomes.
    #[must_use]
    pub fn successful(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.success).count()
    }

    /// Returns the number of failed outcomes.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total() - self.successful()
    }
}

/// Resolves batches of URLs concurrently.
#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    dispatcher: Arc<Dispatcher>,
    semaphore: Arc<Semaphore>,
    concurrency: usize,
}

impl BatchCoordinator {
    /// Creates a coordinator with the given concurrency limit.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InvalidConcurrency`] if `concurrency` is outside
    /// `1..=100`.
    pub fn new(dispatcher: Arc<Dispatcher>, concurrency: usize) -> Result<Self, BatchError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(BatchError::InvalidConcurrency { value: concurrency });
        }
        Ok(Self {
            dispatcher,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        })
    }

    /// Returns the concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the dispatcher each URL is resolved with.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Resolves every URL, returning outcomes in input order.
    pub async fn resolve_many(&self, urls: Vec<String>) -> Vec<ResolutionOutcome> {
        let never = Arc::new(AtomicBool::new(false));
        self.resolve_many_until(urls, never).await.outcomes
    }

    /// Resolves every URL until `interrupted` is set.
    ///
    /// Once the flag is set no new URL starts, in-flight resolutions are
    /// aborted, and every URL without a finished outcome is reported as
    /// cancelled.
    #[instrument(skip(self, urls, interrupted), fields(total = urls.len(), concurrency = self.concurrency))]
    pub async fn resolve_many_until(
        &self,
        urls: Vec<String>,
        interrupted: Arc<AtomicBool>,
    ) -> BatchReport {
        let mut slots: Vec<Option<ResolutionOutcome>> = vec![None; urls.len()];
        let mut handles: Vec<(usize, JoinHandle<ResolutionOutcome>)> = Vec::with_capacity(urls.len());

        for (index, url) in urls.iter().enumerate() {
            if interrupted.load(Ordering::SeqCst) {
                break;
            }

            // Race the permit against the interrupt flag so a cancel during a
            // full-concurrency wait takes effect immediately.
            let Some(permit) = self.acquire_permit(&interrupted).await else {
                break;
            };

            let dispatcher = Arc::clone(&self.dispatcher);
            let url = url.clone();
            debug!(index, url = %url, "Starting batch item");
            handles.push((
                index,
                tokio::spawn(async move {
                    let _permit = permit;
                    dispatcher.resolve(&url).await
                }),
            ));
        }

        for (index, mut handle) in handles {
            let joined = tokio::select! {
                biased;
                result = &mut handle => Some(result),
                () = wait_for_interrupt(&interrupted) => None,
            };
            match joined {
                Some(Ok(outcome)) => slots[index] = Some(outcome),
                Some(Err(join_error)) => {
                    warn!(index, error = %join_error, "Batch task ended abnormally");
                    slots[index] = Some(ResolutionOutcome::failed_with(
                        urls[index].trim(),
                        OutcomeError {
                            category: ErrorCategory::Internal,
                            message: format!("resolution task failed: {join_error}"),
                            tried: Vec::new(),
                        },
                        Vec::new(),
                    ));
                }
                None => handle.abort(),
            }
        }

        let was_interrupted = interrupted.load(Ordering::SeqCst);
        let outcomes: Vec<ResolutionOutcome> = slots
            .into_iter()
            .zip(&urls)
            .map(|(slot, url)| {
                slot.unwrap_or_else(|| {
                    let url = url.trim();
                    ResolutionOutcome::failed(url, &ResolveError::cancelled(url), Vec::new())
                })
            })
            .collect();

        let report = BatchReport {
            outcomes,
            interrupted: was_interrupted,
        };
        info!(
            total = report.total(),
            successful = report.successful(),
            failed = report.failed(),
            interrupted = report.interrupted,
            "Batch resolution complete"
        );
        report
    }

    async fn acquire_permit(&self, interrupted: &AtomicBool) -> Option<OwnedSemaphorePermit> {
        tokio::select! {
            biased;
            () = wait_for_interrupt(interrupted) => None,
            result = Arc::clone(&self.semaphore).acquire_owned() => match result {
                Ok(permit) => Some(permit),
                Err(_) => {
                    warn!("Batch semaphore closed; remaining URLs will be reported as cancelled");
                    None
                }
            },
        }
    }
}

async fn wait_for_interrupt(interrupted: &AtomicBool) {
    while !interrupted.load(Ordering::SeqCst) {
        tokio::time::sleep(INTERRUPT_POLL_INTERVAL).await;
    }
}
