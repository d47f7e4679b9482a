//! Resolver registry shared by every concurrent resolution.
//!
//! The [`ResolverRegistry`] owns the registered plugins and their descriptors.
//! It is read-mostly: matching takes a short read lock to snapshot entries,
//! registration takes the write lock, and enable/disable flips a per-entry
//! atomic flag so readers observe either the old or the new visibility.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use tracing::{debug, info};

use super::{RegistryError, Resolver, ResolverDescriptor};

/// A registered plugin with its routing metadata.
pub(crate) struct RegistryEntry {
    pub(crate) descriptor: ResolverDescriptor,
    pub(crate) resolver: Arc<dyn Resolver>,
    /// Position in registration order, used as the final sort tie-break.
    pub(crate) order: usize,
    enabled: AtomicBool,
}

impl RegistryEntry {
    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Descriptor copy reflecting the current enabled flag.
    pub(crate) fn snapshot(&self) -> ResolverDescriptor {
        let mut descriptor = self.descriptor.clone();
        descriptor.enabled = self.is_enabled();
        descriptor
    }
}

/// The set of registered resolvers, in registration order.
pub struct ResolverRegistry {
    entries: RwLock<Vec<Arc<RegistryEntry>>>,
}

impl ResolverRegistry {
    /// Creates an empty resolver registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Registers a resolver under its own descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if the name is taken; the
    /// registry is left unchanged.
    pub fn register(&self, resolver: Arc<dyn Resolver>) -> Result<(), RegistryError> {
        let descriptor = resolver.descriptor();
        self.register_with(descriptor, resolver)
    }

    /// Registers a resolver under an explicit descriptor.
    ///
    /// Lets callers override routing metadata (priority, domains) without
    /// touching the plugin.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if the name is taken; the
    /// registry is left unchanged.
    #[tracing::instrument(skip(self, descriptor, resolver), fields(resolver_name = %descriptor.name))]
    pub fn register_with(
        &self,
        descriptor: ResolverDescriptor,
        resolver: Arc<dyn Resolver>,
    ) -> Result<(), RegistryError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.iter().any(|entry| entry.descriptor.name == descriptor.name) {
            return Err(RegistryError::DuplicateName {
                name: descriptor.name,
            });
        }

        debug!(
            name = %descriptor.name,
            priority = descriptor.priority,
            wildcard = descriptor.is_wildcard(),
            enabled = descriptor.enabled,
            "Registering resolver"
        );

        let order = entries.len();
        let enabled = AtomicBool::new(descriptor.enabled);
        entries.push(Arc::new(RegistryEntry {
            descriptor,
            resolver,
            order,
            enabled,
        }));
        Ok(())
    }

    /// Makes a resolver visible to matching. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown name.
    pub fn enable(&self, name: &str) -> Result<(), RegistryError> {
        self.set_enabled(name, true)
    }

    /// Hides a resolver from matching; it stays listed. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown name.
    pub fn disable(&self, name: &str) -> Result<(), RegistryError> {
        self.set_enabled(name, false)
    }

    fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), RegistryError> {
        let entries = self.read_entries();
        let entry = entries
            .iter()
            .find(|entry| entry.descriptor.name == name)
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })?;
        let previous = entry.enabled.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            info!(resolver = name, enabled, "Resolver visibility changed");
        }
        Ok(())
    }

    /// Returns every descriptor in registration order.
    #[must_use]
    pub fn all(&self) -> Vec<ResolverDescriptor> {
        self.read_entries()
            .iter()
            .map(|entry| entry.snapshot())
            .collect()
    }

    /// Returns the enabled descriptors in registration order.
    #[must_use]
    pub fn enabled(&self) -> Vec<ResolverDescriptor> {
        self.read_entries()
            .iter()
            .map(|entry| entry.snapshot())
            .filter(|descriptor| descriptor.enabled)
            .collect()
    }

    /// Returns the descriptor registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ResolverDescriptor> {
        self.read_entries()
            .iter()
            .find(|entry| entry.descriptor.name == name)
            .map(|entry| entry.snapshot())
    }

    /// Returns the number of registered resolvers, enabled or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Returns true if no resolvers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// Clones the entry handles so callers can release the lock before
    /// doing any work.
    pub(crate) fn entries(&self) -> Vec<Arc<RegistryEntry>> {
        self.read_entries().clone()
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, Vec<Arc<RegistryEntry>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.read_entries();
        let names: Vec<&str> = entries
            .iter()
            .map(|entry| entry.descriptor.name.as_str())
            .collect();
        f.debug_struct("ResolverRegistry")
            .field("resolver_count", &entries.len())
            .field("resolvers", &names)
            .finish()
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resolver::{MatchedUrl, ResolveContext, ResolveError, ResolvedUrl};
    use async_trait::async_trait;

    struct NamedResolver {
        descriptor: ResolverDescriptor,
    }

    #[async_trait]
    impl Resolver for NamedResolver {
        fn descriptor(&self) -> ResolverDescriptor {
            self.descriptor.clone()
        }

        async fn resolve(
            &self,
            matched: &MatchedUrl,
            _ctx: &ResolveContext,
        ) -> Result<ResolvedUrl, ResolveError> {
            Ok(ResolvedUrl::new(matched.url.clone()))
        }
    }

    fn named(name: &str) -> Arc<dyn Resolver> {
        Arc::new(NamedResolver {
            descriptor: ResolverDescriptor::new(name).with_domains(["example.com"]),
        })
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = ResolverRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_preserves_registration_order() {
        let registry = ResolverRegistry::new();
        registry.register(named("b")).unwrap();
        registry.register(named("a")).unwrap();
        registry.register(named("c")).unwrap();

        let names: Vec<String> = registry.all().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_register_duplicate_name_fails_and_leaves_registry_unchanged() {
        let registry = ResolverRegistry::new();
        registry.register(named("dup")).unwrap();

        let replacement = Arc::new(NamedResolver {
            descriptor: ResolverDescriptor::new("dup").with_priority(1),
        });
        let result = registry.register(replacement);
        assert_eq!(
            result,
            Err(RegistryError::DuplicateName {
                name: "dup".to_string()
            })
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("dup").unwrap().priority, 100);
    }

    #[test]
    fn test_register_with_overrides_descriptor() {
        let registry = ResolverRegistry::new();
        let descriptor = ResolverDescriptor::new("custom").with_priority(5);
        registry.register_with(descriptor, named("ignored")).unwrap();
        assert_eq!(registry.get("custom").unwrap().priority, 5);
        assert!(registry.get("ignored").is_none());
    }

    #[test]
    fn test_disable_hides_from_enabled_but_not_all() {
        let registry = ResolverRegistry::new();
        registry.register(named("one")).unwrap();
        registry.register(named("two")).unwrap();

        registry.disable("one").unwrap();
        registry.disable("one").unwrap();

        assert_eq!(registry.all().len(), 2);
        let enabled: Vec<String> = registry.enabled().into_iter().map(|d| d.name).collect();
        assert_eq!(enabled, vec!["two"]);
        assert!(!registry.get("one").unwrap().enabled);

        registry.enable("one").unwrap();
        registry.enable("one").unwrap();
        assert_eq!(registry.enabled().len(), 2);
    }

    #[test]
    fn test_enable_unknown_name_is_not_found() {
        let registry = ResolverRegistry::new();
        assert_eq!(
            registry.enable("missing"),
            Err(RegistryError::NotFound {
                name: "missing".to_string()
            })
        );
        assert!(matches!(
            registry.disable("missing"),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_initially_disabled_descriptor_is_listed_but_not_enabled() {
        let registry = ResolverRegistry::new();
        let resolver = Arc::new(NamedResolver {
            descriptor: ResolverDescriptor::new("off").with_enabled(false),
        });
        registry.register(resolver).unwrap();
        assert_eq!(registry.all().len(), 1);
        assert!(registry.enabled().is_empty());
    }

    #[test]
    fn test_registry_debug_shows_resolvers() {
        let registry = ResolverRegistry::new();
        registry.register(named("test-resolver")).unwrap();
        let debug_str = format!("{registry:?}");
        assert!(debug_str.contains("test-resolver"));
        assert!(debug_str.contains("resolver_count: 1"));
    }

    #[test]
    fn test_concurrent_toggle_and_read_is_consistent() {
        use std::thread;

        let registry = Arc::new(ResolverRegistry::new());
        registry.register(named("flip")).unwrap();
        registry.register(named("steady")).unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..200 {
                    if i % 2 == 0 {
                        registry.disable("flip").unwrap();
                        registry.enable("flip").unwrap();
                    } else {
                        let enabled = registry.enabled();
                        assert!(enabled.iter().any(|d| d.name == "steady"));
                        assert!(enabled.len() == 1 || enabled.len() == 2);
                        assert_eq!(registry.all().len(), 2);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.enabled().len(), 2);
    }
}
