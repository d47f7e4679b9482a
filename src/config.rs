//! File configuration for resolver defaults.
//!
//! Values come from a TOML file at `$XDG_CONFIG_HOME/resolveurl/config.toml`
//! (falling back to `$HOME/.config/resolveurl/config.toml`), or from an
//! explicit `--config` path. CLI flags override file values; file values
//! override built-in defaults.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::resolver::{
    DEFAULT_CANDIDATE_TIMEOUT, DispatchOptions, HttpSettings, MAX_CONCURRENCY, MIN_CONCURRENCY,
    ResolverRegistry, default_concurrency,
};

/// Default bind address for `serve`.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port for `serve`.
pub const DEFAULT_PORT: u16 = 5000;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unknown keys
    #[error("failed to parse config file '{}': {message}\n  Suggestion: Check the key names and value types in the file", path.display())]
    Parse {
        /// Path that was parsed
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// A value is outside its allowed range
    #[error("invalid config value for `{field}`: {value}. Expected range: {expected}")]
    Invalid {
        /// Offending key
        field: &'static str,
        /// Offending value
        value: String,
        /// Allowed range
        expected: &'static str,
    },
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbositySetting {
    #[default]
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }
}

/// TOML-backed file configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Try resolvers flagged `universal`.
    pub allow_universal: Option<bool>,
    /// Try resolvers flagged `popup`.
    pub allow_popups: Option<bool>,
    /// Let plugins pick the first of several streams.
    pub auto_pick: Option<bool>,
    /// Per-candidate budget in seconds (1..=600).
    pub candidate_timeout_secs: Option<u64>,
    /// Attempts per URL (1..=1000); unset tries every candidate.
    pub max_candidates: Option<usize>,
    /// Batch concurrency (1..=100).
    pub concurrency: Option<usize>,
    /// Resolvers hidden from matching at startup.
    #[serde(default)]
    pub disabled_resolvers: Vec<String>,
    /// Resolver HTTP connect timeout in seconds (1..=3600).
    pub resolver_connect_timeout_secs: Option<u64>,
    /// Resolver HTTP read timeout in seconds (1..=3600).
    pub resolver_read_timeout_secs: Option<u64>,
    /// Bind address for `serve`.
    pub host: Option<String>,
    /// Port for `serve`.
    pub port: Option<u16>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates config values against runtime and CLI constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("candidate_timeout_secs", self.candidate_timeout_secs, 1, 600, "1..=600")?;
        check_range("max_candidates", self.max_candidates, 1, 1000, "1..=1000")?;
        check_range(
            "concurrency",
            self.concurrency,
            MIN_CONCURRENCY,
            MAX_CONCURRENCY,
            "1..=100",
        )?;
        check_range(
            "resolver_connect_timeout_secs",
            self.resolver_connect_timeout_secs,
            1,
            3600,
            "1..=3600",
        )?;
        check_range(
            "resolver_read_timeout_secs",
            self.resolver_read_timeout_secs,
            1,
            3600,
            "1..=3600",
        )?;
        if let Some(host) = &self.host
            && host.trim().is_empty()
        {
            return Err(ConfigError::Invalid {
                field: "host",
                value: format!("{host:?}"),
                expected: "a non-empty address",
            });
        }
        Ok(())
    }

    /// Builds dispatcher options from file values and defaults.
    #[must_use]
    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            allow_universal: self.allow_universal.unwrap_or(true),
            allow_popups: self.allow_popups.unwrap_or(true),
            auto_pick: self.auto_pick.unwrap_or(true),
            candidate_timeout: self
                .candidate_timeout_secs
                .map_or(DEFAULT_CANDIDATE_TIMEOUT, Duration::from_secs),
            max_candidates: self.max_candidates,
        }
    }

    /// Builds resolver HTTP settings from file values and defaults.
    #[must_use]
    pub fn http_settings(&self) -> HttpSettings {
        let defaults = HttpSettings::default();
        HttpSettings {
            connect_timeout: self
                .resolver_connect_timeout_secs
                .map_or(defaults.connect_timeout, Duration::from_secs),
            read_timeout: self
                .resolver_read_timeout_secs
                .map_or(defaults.read_timeout, Duration::from_secs),
        }
    }

    /// Returns the configured batch concurrency or the CPU-based default.
    #[must_use]
    pub fn concurrency_or_default(&self) -> usize {
        self.concurrency.unwrap_or_else(default_concurrency)
    }

    /// Returns the configured bind address or [`DEFAULT_HOST`].
    #[must_use]
    pub fn host_or_default(&self) -> String {
        self.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    /// Returns the configured port or [`DEFAULT_PORT`].
    #[must_use]
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Disables the configured resolvers in `registry`.
    ///
    /// Unknown names are logged and returned; they are not fatal.
    pub fn apply_disabled_resolvers(&self, registry: &ResolverRegistry) -> Vec<String> {
        let mut unknown = Vec::new();
        for name in &self.disabled_resolvers {
            if registry.disable(name).is_err() {
                warn!(resolver = %name, "Config disables an unknown resolver; ignoring");
                unknown.push(name.clone());
            }
        }
        unknown
    }
}

fn check_range<T>(
    field: &'static str,
    value: Option<T>,
    min: T,
    max: T,
    expected: &'static str,
) -> Result<(), ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    match value {
        Some(value) if value < min || value > max => Err(ConfigError::Invalid {
            field,
            value: value.to_string(),
            expected,
        }),
        _ => Ok(()),
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config; defaults when no file was loaded.
    pub config: FileConfig,
    /// Indicates whether configuration was loaded from disk.
    pub loaded_from_file: bool,
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/resolveurl/config.toml`
/// 2. `$HOME/.config/resolveurl/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    config_path_from(env_var_non_empty_os("XDG_CONFIG_HOME"), env_var_non_empty_os("HOME"))
}

fn config_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    if let Some(xdg_config_home) = xdg_config_home {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("resolveurl")
                .join("config.toml"),
        );
    }
    Some(
        PathBuf::from(home?)
            .join(".config")
            .join("resolveurl")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
///
/// A missing file yields defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but is unreadable or invalid.
pub fn load_default_file_config() -> Result<LoadedConfig, ConfigError> {
    let path = resolve_default_config_path();
    match path.as_deref() {
        Some(path_ref) if path_ref.exists() => {
            let config = load_file_config(path_ref)?;
            Ok(LoadedConfig {
                path,
                config,
                loaded_from_file: true,
            })
        }
        _ => Ok(LoadedConfig {
            path,
            config: FileConfig::default(),
            loaded_from_file: false,
        }),
    }
}

/// Loads config from an explicit path; the file must exist.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file is missing, unreadable or invalid.
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    FileConfig::from_toml_str(&raw, path)
}
