// src/commands/requires.rs

//! Requires and options commands - the inputs handed to the package manager

use anyhow::{Context, Result};
use oblo_recipes::recipe::DependencyOverride;
use oblo_recipes::{Invocation, RecipeRegistry};

/// Print the requirement set, registering auxiliary descriptors first
///
/// `registry` is `None` when registration is disabled.
pub fn cmd_requires(
    invocation: &Invocation,
    registry: Option<&dyn RecipeRegistry>,
    json: bool,
) -> Result<()> {
    let requirements = match registry {
        Some(registry) => {
            let (requirements, registrations) = invocation
                .declare_requirements(registry)
                .with_context(|| "Failed to evaluate requirements")?;

            if !json {
                for (reference, outcome) in &registrations {
                    println!("Auxiliary {}: {}", reference, outcome);
                }
            }
            requirements
        }
        None => invocation
            .requirements()
            .with_context(|| "Failed to evaluate requirements")?,
    };

    if json {
        let out = serde_json::to_string_pretty(&requirements)
            .with_context(|| "Failed to serialize requirements")?;
        println!("{}", out);
        return Ok(());
    }

    println!(
        "{} for {}:",
        invocation.descriptor().reference(),
        invocation.settings()
    );
    for requirement in &requirements {
        println!("  {}", requirement);
    }
    println!("\n{} requirement(s)", requirements.len());

    Ok(())
}

/// Print the options pushed down to each required dependency
pub fn cmd_options(invocation: &Invocation, overrides: &[String], as_args: bool) -> Result<()> {
    let overrides = overrides
        .iter()
        .map(|s| DependencyOverride::parse(s))
        .collect::<oblo_recipes::Result<Vec<_>>>()
        .with_context(|| "Invalid dependency option")?;

    let requirements = invocation
        .requirements()
        .with_context(|| "Failed to evaluate requirements")?;
    let configured = invocation.configure(&requirements, &overrides);

    if as_args {
        println!("{}", configured.to_cli_args().join(" "));
        return Ok(());
    }

    if configured.is_empty() {
        println!("No dependency options for {}", invocation.descriptor().reference());
        return Ok(());
    }

    for (dependency, options) in configured.iter() {
        println!("{}:", dependency);
        for (key, value) in options {
            println!("  {} = {}", key, value);
        }
    }

    Ok(())
}
