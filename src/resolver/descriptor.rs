//! Static routing metadata for resolvers.
//!
//! A [`ResolverDescriptor`] says which URLs a resolver claims (domains and an
//! optional pattern), when it is tried (priority), and what kind of resolver it
//! is (capability flags). It carries no behavior.

use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};

use super::utils::canonical_host;

/// Priority given to descriptors that do not set one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Marker used in configuration and listings for "matches any domain".
pub const WILDCARD_DOMAIN: &str = "*";

/// A single domain claim of a resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DomainClaim {
    /// Matches every URL whose host is resolvable.
    Any,
    /// Matches this host and its subdomains (stored normalized).
    Host(String),
}

impl DomainClaim {
    /// Parses a configured domain string; `"*"` becomes [`DomainClaim::Any`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim() == WILDCARD_DOMAIN {
            Self::Any
        } else {
            Self::Host(canonical_host(raw))
        }
    }

    /// Returns the listing form of the claim.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Any => WILDCARD_DOMAIN,
            Self::Host(host) => host,
        }
    }
}

impl Serialize for DomainClaim {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Informational capability flags.
///
/// The dispatcher only looks at these when the caller's options ask it to
/// filter (`allow_universal`, `allow_popups`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Claims domains generically (e.g. debrid services).
    pub universal: bool,
    /// Needs an interactive, non-headless resolution path.
    pub popup: bool,
}

/// Routing metadata for one resolver.
#[derive(Debug, Clone)]
pub struct ResolverDescriptor {
    /// Unique name within a registry.
    pub name: String,
    /// Domains this resolver claims.
    pub domains: Vec<DomainClaim>,
    /// Optional case-insensitive pattern matched against the raw URL.
    pub pattern: Option<Regex>,
    /// Lower values are tried earlier; ties are allowed.
    pub priority: i32,
    /// Initial visibility when registered.
    pub enabled: bool,
    /// Capability flags.
    pub capabilities: Capabilities,
}

impl ResolverDescriptor {
    /// Creates an enabled descriptor with no claims and the default priority.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domains: Vec::new(),
            pattern: None,
            priority: DEFAULT_PRIORITY,
            enabled: true,
            capabilities: Capabilities::default(),
        }
    }

    /// Sets the claimed domains; `"*"` claims every domain.
    #[must_use]
    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.domains = domains
            .into_iter()
            .map(|domain| DomainClaim::parse(domain.as_ref()))
            .collect();
        self
    }

    /// Compiles and sets the URL pattern (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns the regex compile error for an invalid pattern.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        self.pattern = Some(regex);
        Ok(self)
    }

    /// Sets an already compiled pattern.
    #[must_use]
    pub fn with_regex(mut self, regex: Regex) -> Self {
        self.pattern = Some(regex);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the initial enabled state.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Marks the resolver as universal.
    #[must_use]
    pub fn universal(mut self) -> Self {
        self.capabilities.universal = true;
        self
    }

    /// Marks the resolver as requiring a popup.
    #[must_use]
    pub fn popup(mut self) -> Self {
        self.capabilities.popup = true;
        self
    }

    /// Returns true if any claim is the wildcard.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.domains.contains(&DomainClaim::Any)
    }

    /// Returns the serializable listing form.
    #[must_use]
    pub fn info(&self) -> DescriptorInfo {
        DescriptorInfo {
            name: self.name.clone(),
            domains: self.domains.clone(),
            pattern: self.pattern.as_ref().map(|p| p.as_str().to_string()),
            priority: self.priority,
            universal: self.capabilities.universal,
            popup: self.capabilities.popup,
            enabled: self.enabled,
        }
    }
}

/// Flat descriptor shape used by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorInfo {
    pub name: String,
    pub domains: Vec<DomainClaim>,
    pub pattern: Option<String>,
    pub priority: i32,
    pub universal: bool,
    pub popup: bool,
    pub enabled: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_defaults() {
        let descriptor = ResolverDescriptor::new("Example");
        assert_eq!(descriptor.priority, DEFAULT_PRIORITY);
        assert!(descriptor.enabled);
        assert!(descriptor.domains.is_empty());
        assert!(descriptor.pattern.is_none());
        assert_eq!(descriptor.capabilities, Capabilities::default());
    }

    #[test]
    fn test_with_domains_normalizes_and_detects_wildcard() {
        let descriptor = ResolverDescriptor::new("Mixed").with_domains(["WWW.Example.com", "*"]);
        assert_eq!(
            descriptor.domains,
            vec![
                DomainClaim::Host("example.com".to_string()),
                DomainClaim::Any
            ]
        );
        assert!(descriptor.is_wildcard());
    }

    #[test]
    fn test_with_pattern_is_case_insensitive() {
        let descriptor = ResolverDescriptor::new("YouTube")
            .with_pattern(r"youtu\.be/([a-z0-9_-]+)")
            .unwrap();
        assert!(descriptor.pattern.unwrap().is_match("https://YOUTU.BE/abc"));
    }

    #[test]
    fn test_with_pattern_rejects_invalid_regex() {
        assert!(ResolverDescriptor::new("Broken").with_pattern("(").is_err());
    }

    #[test]
    fn test_info_serializes_wildcard_marker() {
        let info = ResolverDescriptor::new("DirectLink")
            .with_domains(["*"])
            .with_priority(200)
            .universal()
            .info();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["name"], "DirectLink");
        assert_eq!(json["domains"], serde_json::json!(["*"]));
        assert_eq!(json["pattern"], serde_json::Value::Null);
        assert_eq!(json["priority"], 200);
        assert_eq!(json["universal"], true);
        assert_eq!(json["popup"], false);
        assert_eq!(json["enabled"], true);
    }
}
