// src/recipe/parser.rs

//! Descriptor file parsing and validation

use crate::error::{Error, Result};
use crate::recipe::format::{Descriptor, SourceSection};
use crate::recipe::requirements::{duplicate_names, Condition};
use std::path::Path;

/// Parse a descriptor from a TOML string
pub fn parse_descriptor(content: &str) -> Result<Descriptor> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid descriptor: {}", e)))
}

/// Parse a descriptor from a file
pub fn parse_descriptor_file(path: &Path) -> Result<Descriptor> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read descriptor {}: {}", path.display(), e)))?;

    parse_descriptor(&content)
}

/// Validate a descriptor for completeness and correctness
///
/// Returns warnings for questionable but usable descriptors; hard problems
/// (duplicate pins, bad conditions, bad patterns) are errors.
pub fn validate_descriptor(descriptor: &Descriptor) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if descriptor.package.name.is_empty() {
        return Err(Error::ParseError("Descriptor name cannot be empty".to_string()));
    }
    if descriptor.package.version.is_empty() {
        return Err(Error::ParseError("Descriptor version cannot be empty".to_string()));
    }

    // Every version of the template must be free of duplicate pins
    if let Some(name) = duplicate_names(&descriptor.requires).into_iter().next() {
        return Err(Error::DuplicateRequirement(name));
    }
    for (version, overlay) in &descriptor.versions {
        if let Some(name) = duplicate_names(&overlay.requires).into_iter().next() {
            return Err(Error::ParseError(format!(
                "Version {} pins '{}' more than once",
                version, name
            )));
        }
    }

    for entry in descriptor
        .requires
        .iter()
        .chain(descriptor.versions.values().flat_map(|o| o.requires.iter()))
    {
        if entry.version.is_empty() {
            return Err(Error::ParseError(format!(
                "Requirement '{}' has no version",
                entry.name
            )));
        }

        if let Some(when) = &entry.when {
            check_condition(descriptor, when, &entry.name)?;
        }
    }

    let declared = descriptor.declared_requirement_names();
    for dependency in descriptor.dependency_options.keys() {
        if !declared.contains(&dependency.as_str()) {
            warnings.push(format!(
                "Options for '{}' will be ignored: it is never required",
                dependency
            ));
        }
    }

    for aux in &descriptor.auxiliary {
        if aux.path.is_empty() {
            return Err(Error::ParseError(format!(
                "Auxiliary recipe {}/{} has no path",
                aux.name, aux.version
            )));
        }
        if let Some(when) = &aux.when {
            check_condition(descriptor, when, &aux.name)?;
        }
        if !declared.contains(&aux.name.as_str()) {
            warnings.push(format!(
                "Auxiliary recipe '{}' is registered but never required",
                aux.name
            ));
        }
    }

    if let Some(staging) = &descriptor.staging {
        for pattern in &staging.patterns {
            glob::Pattern::new(pattern).map_err(|e| Error::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        }
        for runtime in &staging.runtime {
            if runtime.components.is_empty() {
                return Err(Error::ParseError(format!(
                    "Runtime staging for '{}' lists no components",
                    runtime.dependency
                )));
            }
            if !declared.contains(&runtime.dependency.as_str()) {
                warnings.push(format!(
                    "Runtime staging for '{}' will never run: it is never required",
                    runtime.dependency
                ));
            }
        }
    }

    for rule in &descriptor.artifacts {
        glob::Pattern::new(&rule.pattern).map_err(|e| Error::InvalidPattern {
            pattern: rule.pattern.clone(),
            reason: e.to_string(),
        })?;
    }

    let sources = descriptor
        .source
        .iter()
        .chain(descriptor.versions.values().filter_map(|o| o.source.as_ref()));
    for source in sources {
        match source {
            SourceSection::Archive { archive, checksum } => match checksum {
                Some(c) if !c.starts_with("sha256:") => {
                    return Err(Error::ParseError(format!(
                        "Invalid checksum format: {}. Expected sha256:...",
                        c
                    )));
                }
                Some(_) => {}
                None => warnings.push(format!("Archive {} has no checksum", archive)),
            },
            SourceSection::Git { git, rev } => {
                if rev.is_empty() {
                    return Err(Error::ParseError(format!(
                        "Git source {} has no pinned revision",
                        git
                    )));
                }
            }
        }
    }

    if descriptor.package.summary.is_none() {
        warnings.push("Missing package summary".to_string());
    }
    if descriptor.package.license.is_none() {
        warnings.push("Missing package license".to_string());
    }

    Ok(warnings)
}

/// A `when` condition must name a declared boolean option
fn check_condition(descriptor: &Descriptor, when: &str, subject: &str) -> Result<()> {
    let condition = Condition::parse(when)?;
    match descriptor.options.get(condition.option) {
        None => Err(Error::UnknownOption(condition.option.to_string())),
        Some(value) if !value.is_bool() => Err(Error::InvalidOption {
            option: condition.option.to_string(),
            reason: format!("used as a condition on '{}' but is not a boolean", subject),
        }),
        Some(_) => Ok(()),
    }
}
