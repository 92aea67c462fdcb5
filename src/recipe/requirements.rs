// src/recipe/requirements.rs

//! Requirement set evaluation
//!
//! A descriptor's requirement set is a pure function of its option values.
//! Conditional entries are evaluated once; the resulting [`RequirementSet`]
//! is immutable for the rest of the invocation.

use crate::error::{Error, Result};
use crate::recipe::format::{Descriptor, RequirementEntry};
use crate::recipe::options::OptionValues;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// A pinned dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub name: String,
    pub version: String,
    /// Supersedes transitive requests for the same library
    #[serde(rename = "override")]
    pub overrides: bool,
}

impl Requirement {
    /// Create a requirement
    pub fn new(name: impl Into<String>, version: impl Into<String>, overrides: bool) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            overrides,
        }
    }

    /// `name/version` reference
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)?;
        if self.overrides {
            f.write_str(" (override)")?;
        }
        Ok(())
    }
}

/// Condition gating a requirement entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition<'a> {
    pub option: &'a str,
    pub negated: bool,
}

impl<'a> Condition<'a> {
    /// Parse `"opt"` or `"!opt"`
    pub fn parse(s: &'a str) -> Result<Self> {
        let s = s.trim();
        let (negated, option) = match s.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, s),
        };

        if option.is_empty() {
            return Err(Error::ParseError(format!("Empty condition: '{}'", s)));
        }

        Ok(Self { option, negated })
    }

    /// Evaluate against option values
    pub fn holds(&self, options: &OptionValues) -> Result<bool> {
        Ok(options.is_enabled(self.option)? != self.negated)
    }
}

/// Ordered, duplicate-free list of requirements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequirementSet {
    entries: Vec<Requirement>,
}

impl RequirementSet {
    /// Evaluate a descriptor's requirement entries against option values
    pub fn evaluate(descriptor: &Descriptor, options: &OptionValues) -> Result<Self> {
        let mut set = Self::default();

        for entry in &descriptor.requires {
            if !entry_applies(entry, options)? {
                continue;
            }
            set.push(Requirement::new(&entry.name, &entry.version, entry.overrides))?;
        }

        Ok(set)
    }

    /// Append a requirement, rejecting duplicate names
    pub fn push(&mut self, requirement: Requirement) -> Result<()> {
        if self.contains(&requirement.name) {
            return Err(Error::DuplicateRequirement(requirement.name));
        }
        self.entries.push(requirement);
        Ok(())
    }

    /// Check if a library is required
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|r| r.name == name)
    }

    /// Look up a requirement by library name
    pub fn get(&self, name: &str) -> Option<&Requirement> {
        self.entries.iter().find(|r| r.name == name)
    }

    /// Iterate in declaration order
    pub fn iter(&self) -> std::slice::Iter<'_, Requirement> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Library names in declaration order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|r| r.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a RequirementSet {
    type Item = &'a Requirement;
    type IntoIter = std::slice::Iter<'a, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn entry_applies(entry: &RequirementEntry, options: &OptionValues) -> Result<bool> {
    condition_holds(entry.when.as_deref(), options)
}

/// Evaluate an optional `when` condition; no condition always holds
pub fn condition_holds(when: Option<&str>, options: &OptionValues) -> Result<bool> {
    match when {
        Some(when) => Condition::parse(when)?.holds(options),
        None => Ok(true),
    }
}

/// Find names declared more than once in a descriptor's entries
pub fn duplicate_names(entries: &[RequirementEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dups = Vec::new();

    for entry in entries {
        if !seen.insert(entry.name.as_str()) && !dups.contains(&entry.name) {
            dups.push(entry.name.clone());
        }
    }

    dups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::parser::parse_descriptor;

    const DESCRIPTOR: &str = r#"
[package]
name = "oblo"
version = "0.1.0"

[options]
with_dotnet = true
with_tracy = false
renderer = "vulkan"

[[requires]]
name = "imgui"
version = "1.91.0-docking"

[[requires]]
name = "dotnet"
version = "9.0.4"
when = "with_dotnet"

[[requires]]
name = "tracy"
version = "0.11.1"
when = "with_tracy"

[[requires]]
name = "mimalloc"
version = "2.1.7"
when = "!with_tracy"
override = true
"#;

    #[test]
    fn test_evaluate_defaults() {
        let d = parse_descriptor(DESCRIPTOR).unwrap();
        let options = OptionValues::from_defaults(&d);
        let set = RequirementSet::evaluate(&d, &options).unwrap();

        assert_eq!(set.names(), vec!["imgui", "dotnet", "mimalloc"]);
        assert!(set.get("mimalloc").unwrap().overrides);
        assert!(!set.contains("tracy"));
    }

    #[test]
    fn test_evaluate_follows_options() {
        let d = parse_descriptor(DESCRIPTOR).unwrap();
        let options = OptionValues::with_overrides(
            &d,
            &["with_dotnet=False".to_string(), "with_tracy=True".to_string()],
        )
        .unwrap();
        let set = RequirementSet::evaluate(&d, &options).unwrap();

        assert_eq!(set.names(), vec!["imgui", "tracy"]);
    }

    #[test]
    fn test_condition_on_choice_option_fails() {
        let mut d = parse_descriptor(DESCRIPTOR).unwrap();
        d.requires[0].when = Some("renderer".into());
        let options = OptionValues::from_defaults(&d);

        let err = RequirementSet::evaluate(&d, &options).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { .. }));
    }

    #[test]
    fn test_condition_on_unknown_option_fails() {
        let mut d = parse_descriptor(DESCRIPTOR).unwrap();
        d.requires[0].when = Some("with_missing".into());
        let options = OptionValues::from_defaults(&d);

        let err = RequirementSet::evaluate(&d, &options).unwrap_err();
        assert!(matches!(err, Error::UnknownOption(_)));
    }

    #[test]
    fn test_push_rejects_duplicates() {
        let mut set = RequirementSet::default();
        set.push(Requirement::new("zlib", "1.3.1", false)).unwrap();

        let err = set.push(Requirement::new("zlib", "1.2.13", true)).unwrap_err();
        assert!(matches!(err, Error::DuplicateRequirement(name) if name == "zlib"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_condition_parse() {
        let c = Condition::parse("!with_x").unwrap();
        assert!(c.negated);
        assert_eq!(c.option, "with_x");
        assert!(Condition::parse("!").is_err());
        assert!(Condition::parse("  ").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Requirement::new("a", "1", false).to_string(), "a/1");
        assert_eq!(Requirement::new("a", "1", true).to_string(), "a/1 (override)");
    }

    #[test]
    fn test_duplicate_names() {
        let d = parse_descriptor(DESCRIPTOR).unwrap();
        assert!(duplicate_names(&d.requires).is_empty());

        let mut entries = d.requires.clone();
        entries.push(entries[0].clone());
        entries.push(entries[0].clone());
        assert_eq!(duplicate_names(&entries), vec!["imgui"]);
    }
}
