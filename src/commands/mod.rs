//! CLI command handlers.

mod list;
mod resolve;
mod serve;

pub use list::run_list_command;
pub use resolve::run_resolve_command;
pub use serve::run_serve_command;

use std::sync::Arc;

use resolveurl_core::{FileConfig, ResolverRegistry, build_default_resolver_registry};
use tracing::debug;

/// Builds the built-in registry and applies the configured disabled list.
fn registry_from_config(config: &FileConfig) -> Arc<ResolverRegistry> {
    let registry = build_default_resolver_registry(&config.http_settings());
    let unknown = config.apply_disabled_resolvers(&registry);
    debug!(
        resolvers = registry.len(),
        enabled = registry.enabled().len(),
        unknown_disabled = unknown.len(),
        "Resolver registry ready"
    );
    Arc::new(registry)
}
