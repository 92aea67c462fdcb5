// src/recipe/variants.rs

//! Version-keyed descriptor templates
//!
//! One descriptor file describes every supported version of a package. The
//! base tables describe the default version; `[versions."x.y.z"]` overlays
//! replace or extend the parts that differ.

use crate::error::{Error, Result};
use crate::recipe::format::Descriptor;
use tracing::debug;

/// All versions a descriptor can be instantiated at
pub fn available_versions(descriptor: &Descriptor) -> Vec<&str> {
    let mut versions = vec![descriptor.package.version.as_str()];
    for v in descriptor.versions.keys() {
        if !versions.contains(&v.as_str()) {
            versions.push(v.as_str());
        }
    }
    versions
}

/// Instantiate a descriptor template at a specific version
///
/// The returned descriptor has its overlay applied and an empty
/// `versions` table.
pub fn instantiate(template: &Descriptor, version: &str) -> Result<Descriptor> {
    let overlay = template.versions.get(version);

    if overlay.is_none() && version != template.package.version {
        return Err(Error::NotFound(format!(
            "{} has no version {} (available: {})",
            template.package.name,
            version,
            available_versions(template).join(", ")
        )));
    }

    let mut descriptor = template.clone();
    descriptor.versions.clear();
    descriptor.package.version = version.to_string();

    let Some(overlay) = overlay else {
        return Ok(descriptor);
    };

    debug!("Applying version overlay {} for {}", version, template.package.name);

    if let Some(source) = &overlay.source {
        descriptor.source = Some(source.clone());
    }

    for entry in &overlay.requires {
        match descriptor.requires.iter_mut().find(|r| r.name == entry.name) {
            Some(existing) => *existing = entry.clone(),
            None => descriptor.requires.push(entry.clone()),
        }
    }

    for (dependency, options) in &overlay.dependency_options {
        let target = descriptor
            .dependency_options
            .entry(dependency.clone())
            .or_default();
        for (key, value) in options {
            target.insert(key.clone(), value.clone());
        }
    }

    for (key, value) in &overlay.variables {
        descriptor.variables.insert(key.clone(), value.clone());
    }

    Ok(descriptor)
}
