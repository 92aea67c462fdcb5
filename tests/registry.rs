// tests/registry.rs

//! Fail-open registration of auxiliary descriptors.

mod common;

use common::*;
use oblo_recipes::recipe::parse_descriptor;
use oblo_recipes::registry::{
    register_auxiliaries, CommandRegistry, ExportStatus, LocalRegistry, RecipeRegistry,
    Registration,
};
use oblo_recipes::config::RegistryMode;
use oblo_recipes::{Invocation, OptionValues, Result, ToolConfig};
use std::cell::Cell;
use std::path::Path;
use tempfile::TempDir;

const APP: &str = r#"
[package]
name = "app"
version = "1.0"

[[requires]]
name = "luau"
version = "0.653"

[[auxiliary]]
name = "luau"
version = "0.653"
path = "luau"
"#;

/// Registry whose export always reports a conflict
struct ConflictingRegistry {
    exports: Cell<usize>,
}

impl RecipeRegistry for ConflictingRegistry {
    fn is_known(&self, _name: &str, _version: &str) -> Result<bool> {
        Ok(false)
    }

    fn export(&self, _dir: &Path, _name: &str, _version: &str) -> Result<ExportStatus> {
        self.exports.set(self.exports.get() + 1);
        Ok(ExportStatus::AlreadyExists)
    }
}

#[test]
fn test_local_registration_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    write_tree(tmp.path(), &[("luau/recipe.toml", "[package]\nname = \"luau\"\n")]);
    let descriptor = parse_descriptor(APP).unwrap();
    let registry = LocalRegistry::new(tmp.path().join("cache"));

    let first = register_auxiliaries(
        &registry,
        &descriptor,
        &OptionValues::from_defaults(&descriptor),
        tmp.path(),
    );
    assert_eq!(first, vec![("luau/0.653".to_string(), Registration::Exported)]);

    let second = register_auxiliaries(
        &registry,
        &descriptor,
        &OptionValues::from_defaults(&descriptor),
        tmp.path(),
    );
    assert_eq!(second, vec![("luau/0.653".to_string(), Registration::AlreadyKnown)]);
}

#[test]
fn test_already_exists_counts_as_registered() {
    let tmp = TempDir::new().unwrap();
    let descriptor = parse_descriptor(APP).unwrap();
    let registry = ConflictingRegistry {
        exports: Cell::new(0),
    };

    let outcomes = register_auxiliaries(
        &registry,
        &descriptor,
        &OptionValues::from_defaults(&descriptor),
        tmp.path(),
    );
    assert!(outcomes[0].1.is_registered());
    assert_eq!(registry.exports.get(), 1);
}

#[test]
fn test_missing_package_manager_is_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let descriptor = parse_descriptor(APP).unwrap();
    let registry = CommandRegistry::new(tmp.path().join("no-such-binary"));

    let invocation = Invocation::new(
        descriptor.clone(),
        tmp.path(),
        linux("Release"),
        OptionValues::from_defaults(&descriptor),
    );
    let (reqs, outcomes) = invocation.declare_requirements(&registry).unwrap();

    assert_eq!(reqs.names(), vec!["luau"]);
    assert!(matches!(outcomes[0].1, Registration::Retryable(_)));
}

#[test]
fn test_package_manager_missing_from_path_is_not_fatal() {
    let tmp = TempDir::new().unwrap();
    write_tree(tmp.path(), &[("luau/recipe.toml", "[package]\nname = \"luau\"\n")]);
    let descriptor = parse_descriptor(APP).unwrap();

    let mut config = ToolConfig::default();
    config.package_manager.program = "oblo-missing-package-manager".to_string();
    let registry = config.registry_for(RegistryMode::Command);

    let invocation = Invocation::new(
        descriptor.clone(),
        tmp.path(),
        linux("Release"),
        OptionValues::from_defaults(&descriptor),
    );
    let (reqs, outcomes) = invocation.declare_requirements(registry.as_ref()).unwrap();

    assert_eq!(reqs.names(), vec!["luau"]);
    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0].1, Registration::Retryable(_)));
}

#[test]
fn test_failed_export_is_retried_next_run() {
    let tmp = TempDir::new().unwrap();
    let descriptor = parse_descriptor(APP).unwrap();
    let registry = LocalRegistry::new(tmp.path().join("cache"));

    // Recipe directory not there yet
    let outcomes = register_auxiliaries(
        &registry,
        &descriptor,
        &OptionValues::from_defaults(&descriptor),
        tmp.path(),
    );
    assert!(!outcomes[0].1.is_registered());

    write_tree(tmp.path(), &[("luau/recipe.toml", "[package]\n")]);
    let outcomes = register_auxiliaries(
        &registry,
        &descriptor,
        &OptionValues::from_defaults(&descriptor),
        tmp.path(),
    );
    assert_eq!(outcomes[0].1, Registration::Exported);
}
