use std::sync::Arc;

use crate::resolver::{BatchCoordinator, BatchError, DispatchOptions, Dispatcher, ResolverRegistry};

/// Shared handles for every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: Arc<ResolverRegistry>,
    pub dispatcher: Arc<Dispatcher>,
    pub batch: Arc<BatchCoordinator>,
}

impl AppState {
    /// Wires a dispatcher and batch coordinator around `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InvalidConcurrency`] for an out-of-range
    /// `concurrency`.
    pub fn new(
        registry: Arc<ResolverRegistry>,
        options: DispatchOptions,
        concurrency: usize,
    ) -> Result<Self, BatchError> {
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry), options));
        let batch = Arc::new(BatchCoordinator::new(Arc::clone(&dispatcher), concurrency)?);
        Ok(Self {
            registry,
            dispatcher,
            batch,
        })
    }
}
