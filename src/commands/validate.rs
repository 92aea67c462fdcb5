// src/commands/validate.rs

//! Validate command - check descriptors before handing them to the package manager

use anyhow::{Context, Result};
use oblo_recipes::recipe::{
    available_versions, instantiate, parse_descriptor_file, validate_descriptor,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Validate each descriptor file
///
/// # Arguments
/// * `descriptors` - Descriptor files to check
/// * `all_versions` - Also instantiate and check every version overlay
pub fn cmd_validate(descriptors: &[PathBuf], all_versions: bool) -> Result<()> {
    let mut failed = 0usize;

    for path in descriptors {
        match validate_one(path, all_versions) {
            Ok(warnings) => {
                if warnings == 0 {
                    println!("[OK] {}", path.display());
                } else {
                    println!("[OK] {} ({} warning(s))", path.display(), warnings);
                }
            }
            Err(e) => {
                println!("[FAILED] {}: {:#}", path.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} descriptor(s) failed validation", failed, descriptors.len());
    }

    info!("Validated {} descriptor(s)", descriptors.len());
    Ok(())
}

fn validate_one(path: &Path, all_versions: bool) -> Result<usize> {
    let template = parse_descriptor_file(path)
        .with_context(|| format!("Failed to parse descriptor: {}", path.display()))?;

    let mut warnings = validate_descriptor(&template).with_context(|| "Validation failed")?;

    if all_versions {
        for version in available_versions(&template) {
            let descriptor = instantiate(&template, version)?;
            let extra = validate_descriptor(&descriptor)
                .with_context(|| format!("Version {} failed validation", version))?;
            for warning in extra {
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
            }
        }
    }

    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    Ok(warnings.len())
}

/// List the versions a descriptor can be instantiated at
pub fn cmd_versions(path: &Path) -> Result<()> {
    let template = parse_descriptor_file(path)
        .with_context(|| format!("Failed to parse descriptor: {}", path.display()))?;

    println!("{}:", template.package.name);
    for version in available_versions(&template) {
        if version == template.package.version {
            println!("  {} (default)", version);
        } else {
            println!("  {}", version);
        }
    }

    Ok(())
}
