// src/staging/runtime.rs

//! Component-preserving staging for multi-component runtimes
//!
//! The .NET runtime is loaded through `hostfxr`, which locates the shared
//! framework relative to its own directory. Its components therefore land
//! in fixed subdirectories of the destination, for example:
//!
//! ```text
//! bin/Release/dotnet/host/fxr/9.0.4/libhostfxr.so
//! bin/Release/dotnet/shared/Microsoft.NETCore.App/9.0.4/libcoreclr.so
//! ```
//!
//! Every file of a component's binary directories is copied with its
//! relative path intact. Nothing from these components is flattened.

use crate::error::{Error, Result};
use crate::graph::ResolvedDependency;
use crate::recipe::RuntimeStaging;
use crate::staging::{copy_file, StagedFile};
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Ensure every mandated component was resolved
pub fn check_components(rule: &RuntimeStaging, dep: &ResolvedDependency) -> Result<()> {
    let missing: Vec<&str> = rule
        .components
        .keys()
        .filter(|c| !dep.components.contains_key(c.as_str()))
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::NotFound(format!(
            "{} is missing component(s): {}",
            dep.name,
            missing.join(", ")
        )))
    }
}

/// Subdirectory a component is staged into, with `%(version)s` expanded
pub fn component_subdir(template: &str, dep: &ResolvedDependency) -> String {
    template.replace("%(version)s", &dep.version)
}

/// Copy each component into its mandated subdirectory of `destination`
///
/// Each mandated subdirectory is created even when its component has no
/// files, so the loader always finds the layout it expects.
pub fn stage_components(
    rule: &RuntimeStaging,
    dep: &ResolvedDependency,
    destination: &Path,
) -> Result<Vec<StagedFile>> {
    check_components(rule, dep)?;

    let mut staged = Vec::new();

    for (component_name, template) in &rule.components {
        let component = &dep.components[component_name];
        let target_root = destination.join(component_subdir(template, dep));
        fs::create_dir_all(&target_root)?;

        debug!(
            "Staging {}:{} into {}",
            dep.name,
            component_name,
            target_root.display()
        );

        for dir in &component.bin_dirs {
            if !dir.is_absolute() {
                debug!("Skipping relative component dir {}", dir.display());
                continue;
            }
            if !dir.is_dir() {
                continue;
            }

            for entry in WalkDir::new(dir).sort_by_file_name() {
                let entry = entry.map_err(|e| {
                    Error::IoError(format!("Failed to walk {}: {}", dir.display(), e))
                })?;
                if entry.file_type().is_dir() {
                    continue;
                }

                let relative = entry
                    .path()
                    .strip_prefix(dir)
                    .map_err(|e| Error::IoError(e.to_string()))?;
                let target = target_root.join(relative);
                copy_file(entry.path(), &target)?;

                staged.push(StagedFile {
                    dependency: format!("{}:{}", dep.name, component_name),
                    source: entry.path().to_path_buf(),
                    destination: target,
                });
            }
        }
    }

    Ok(staged)
}
