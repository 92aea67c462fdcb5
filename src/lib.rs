// src/lib.rs

//! Build-dependency descriptors for the oblo engine
//!
//! Descriptors pin third-party library versions, push option toggles down to
//! those libraries and stage resolved outputs into a runnable tree. Dependency
//! resolution, version solving and binary caching belong to the external
//! package manager; this crate feeds it inputs and copies its outputs.
//!
//! # Architecture
//!
//! - Descriptors: TOML files with version-keyed overlays
//! - Settings: one immutable record per run (os, arch, compiler, build type)
//! - Requirements: pure function of the option values
//! - Staging: idempotent copies driven by the resolved graph
//! - Registry: fail-open export of auxiliary descriptors

pub mod config;
mod error;
pub mod graph;
pub mod hash;
pub mod lifecycle;
pub mod recipe;
pub mod registry;
pub mod settings;
pub mod staging;

pub use config::ToolConfig;
pub use error::{Error, Result};
pub use graph::{ResolvedDependency, ResolvedGraph};
pub use lifecycle::Invocation;
pub use recipe::{
    Descriptor, DependencyOptions, Kitchen, KitchenConfig, OptionValues, Requirement,
    RequirementSet,
};
pub use registry::{CommandRegistry, LocalRegistry, RecipeRegistry, Registration};
pub use settings::{Arch, Os, Settings};
pub use staging::{StagingReport, Stager};
