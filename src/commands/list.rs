//! List command handler: show registered resolvers.

use anyhow::Result;
use resolveurl_core::resolver::{Matcher, ResolverDescriptor};
use resolveurl_core::FileConfig;

use super::registry_from_config;
use crate::cli::ListArgs;

pub fn run_list_command(args: &ListArgs, config: &FileConfig) -> Result<()> {
    let registry = registry_from_config(config);

    let mut descriptors = match args.domain.as_deref() {
        Some(query) => Matcher::new(registry).search_domain(query),
        None => registry.all(),
    };
    if args.enabled_only {
        descriptors.retain(|descriptor| descriptor.enabled);
    }
    descriptors.sort_by_key(|descriptor| descriptor.name.to_lowercase());

    if args.json {
        let infos: Vec<_> = descriptors.iter().map(ResolverDescriptor::info).collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    if descriptors.is_empty() {
        println!("No resolvers match.");
        return Ok(());
    }
    for descriptor in &descriptors {
        println!("{}", render_descriptor_row(descriptor));
    }
    Ok(())
}

/// One listing row: name, priority, state, flags and claims.
pub(crate) fn render_descriptor_row(descriptor: &ResolverDescriptor) -> String {
    let state = if descriptor.enabled { "enabled" } else { "disabled" };
    let mut claims: Vec<&str> = descriptor.domains.iter().map(|claim| claim.as_str()).collect();
    if let Some(pattern) = &descriptor.pattern {
        claims.push(pattern.as_str());
    }
    let mut flags = Vec::new();
    if descriptor.capabilities.universal {
        flags.push("universal");
    }
    if descriptor.capabilities.popup {
        flags.push("popup");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(","))
    };
    format!(
        "{:<20} {:>5}  {:<8}{flags}  {}",
        descriptor.name,
        descriptor.priority,
        state,
        claims.join(" ")
    )
}
