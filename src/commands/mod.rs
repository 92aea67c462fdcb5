// src/commands/mod.rs
//! Command handlers for the oblo-recipes CLI

mod cook;
mod requires;
mod stage;
mod system;
mod validate;

pub use cook::{cmd_build, cmd_fetch, cmd_package, with_overrides};
pub use requires::{cmd_options, cmd_requires};
pub use stage::cmd_stage;
pub use system::cmd_completions;
pub use validate::{cmd_validate, cmd_versions};

use anyhow::{Context, Result};
use oblo_recipes::{Invocation, Settings};
use std::path::Path;

/// Load a descriptor for one run and report settings it does not declare
pub(crate) fn load_invocation(
    path: &Path,
    version: Option<&str>,
    settings: Settings,
    options: &[String],
) -> Result<Invocation> {
    let invocation = Invocation::load(path, version, settings, options)
        .with_context(|| format!("Failed to load descriptor: {}", path.display()))?;

    for mismatch in invocation.mismatches() {
        println!(
            "Warning: {} settings mismatch: {}",
            invocation.descriptor().reference(),
            mismatch
        );
    }

    Ok(invocation)
}
