// src/recipe/options.rs

//! Option values and dependency option configuration
//!
//! Two kinds of options flow through a descriptor:
//! - the descriptor's own options ([`OptionValues`]), which gate requirements
//! - options pushed down to each dependency ([`DependencyOptions`]), applied
//!   with overwrite semantics: the last write for a key wins

use crate::error::{Error, Result};
use crate::recipe::format::{Descriptor, OptionValue};
use crate::recipe::requirements::RequirementSet;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Resolved values of a descriptor's own options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionValues {
    values: BTreeMap<String, OptionValue>,
}

impl OptionValues {
    /// Take every option at its declared default
    pub fn from_defaults(descriptor: &Descriptor) -> Self {
        Self {
            values: descriptor.options.clone(),
        }
    }

    /// Apply `key=value` overrides on top of the defaults
    ///
    /// Overrides for boolean options must parse as booleans; overrides for
    /// choice options are taken verbatim.
    pub fn with_overrides(descriptor: &Descriptor, overrides: &[String]) -> Result<Self> {
        let mut values = Self::from_defaults(descriptor);

        for assignment in overrides {
            let (key, raw) = parse_assignment(assignment)?;
            let default = descriptor
                .options
                .get(key)
                .ok_or_else(|| Error::UnknownOption(key.to_string()))?;

            let value = match default {
                OptionValue::Bool(_) => OptionValue::Bool(parse_bool(key, raw)?),
                OptionValue::Choice(_) => OptionValue::Choice(raw.to_string()),
            };

            debug!("Option {} = {}", key, value);
            values.values.insert(key.to_string(), value);
        }

        Ok(values)
    }

    /// Get an option value
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    /// Read a boolean option
    pub fn is_enabled(&self, key: &str) -> Result<bool> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| Error::UnknownOption(key.to_string()))?;

        value.as_bool().ok_or_else(|| Error::InvalidOption {
            option: key.to_string(),
            reason: format!("'{}' is not a boolean", value),
        })
    }

    /// Iterate over all options in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Split `key=value`
pub fn parse_assignment(s: &str) -> Result<(&str, &str)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| Error::ParseError(format!("Expected key=value, got '{}'", s)))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(Error::ParseError(format!("Missing option name in '{}'", s)));
    }

    Ok((key, value.trim()))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidOption {
            option: key.to_string(),
            reason: format!("'{}' is not a boolean", raw),
        }),
    }
}

/// A user-supplied `dependency:key=value` override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyOverride {
    pub dependency: String,
    pub key: String,
    pub value: OptionValue,
}

impl DependencyOverride {
    /// Parse `dependency:key=value`
    ///
    /// `true`/`false` (any case) become toggles, anything else a choice.
    pub fn parse(s: &str) -> Result<Self> {
        let (target, raw) = parse_assignment(s)?;
        let (dependency, key) = target.split_once(':').ok_or_else(|| {
            Error::ParseError(format!("Expected dependency:key=value, got '{}'", s))
        })?;

        let value = match raw.to_ascii_lowercase().as_str() {
            "true" => OptionValue::Bool(true),
            "false" => OptionValue::Bool(false),
            _ => OptionValue::Choice(raw.to_string()),
        };

        Ok(Self {
            dependency: dependency.trim().to_string(),
            key: key.trim().to_string(),
            value,
        })
    }
}

/// Options applied to each dependency
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyOptions {
    entries: BTreeMap<String, BTreeMap<String, OptionValue>>,
}

impl DependencyOptions {
    /// Set an option, overwriting any previous value
    pub fn set(&mut self, dependency: &str, key: &str, value: OptionValue) {
        self.entries
            .entry(dependency.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Get one option of one dependency
    pub fn get(&self, dependency: &str, key: &str) -> Option<&OptionValue> {
        self.entries.get(dependency).and_then(|o| o.get(key))
    }

    /// All options of one dependency
    pub fn for_dependency(&self, dependency: &str) -> Option<&BTreeMap<String, OptionValue>> {
        self.entries.get(dependency)
    }

    /// Iterate over dependencies in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, OptionValue>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as package-manager option arguments (`-o name/*:key=value`)
    pub fn to_cli_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for (dependency, options) in &self.entries {
            for (key, value) in options {
                args.push("-o".to_string());
                args.push(format!("{}/*:{}={}", dependency, key, value));
            }
        }
        args
    }
}

/// Apply option blocks to every dependency present in the requirement set
///
/// Descriptor blocks are applied first, then user overrides in order; each
/// write replaces the previous value for that key. Blocks naming a library
/// outside the requirement set are skipped.
pub fn configure_options(
    descriptor: &Descriptor,
    requirements: &RequirementSet,
    overrides: &[DependencyOverride],
) -> DependencyOptions {
    let mut configured = DependencyOptions::default();

    for (dependency, options) in &descriptor.dependency_options {
        if !requirements.contains(dependency) {
            warn!(
                "Skipping options for '{}': not in the requirement set",
                dependency
            );
            continue;
        }
        for (key, value) in options {
            configured.set(dependency, key, value.clone());
        }
    }

    for o in overrides {
        if !requirements.contains(&o.dependency) {
            warn!(
                "Skipping option override {}:{}: not in the requirement set",
                o.dependency, o.key
            );
            continue;
        }
        configured.set(&o.dependency, &o.key, o.value.clone());
    }

    configured
}
