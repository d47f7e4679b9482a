//! resolveurl Core Library
//!
//! This library turns hosting-page and embed URLs into direct, playable media
//! URLs through a registry of independently implemented resolver plugins.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`resolver`] - Descriptors, registry, matcher, dispatcher, batch coordinator and built-in plugins
//! - [`config`] - TOML file configuration for resolver defaults
//! - [`api`] - HTTP layer exposing resolution and registry management

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod resolver;
mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, FileConfig, LoadedConfig, VerbositySetting};
pub use resolver::{
    BatchCoordinator, BatchError, BatchReport, DispatchOptions, Dispatcher, HttpSettings,
    Matcher, RegistryError, ResolutionOutcome, ResolveError, Resolver, ResolverDescriptor,
    ResolverRegistry, build_default_resolver_registry,
};
