// src/recipe/mod.rs

//! Dependency descriptors for the oblo engine and its packaged libraries
//!
//! A descriptor declares:
//! - Identity and the settings axes it supports
//! - Pinned requirements, optionally gated on boolean options
//! - Options pushed down to each dependency
//! - Staging rules that assemble a runnable tree after resolution
//! - For packaging descriptors: a pinned source, build commands and
//!   install rules
//!
//! # Example Descriptor
//!
//! ```toml
//! [package]
//! name = "oblo"
//! version = "0.1.0"
//!
//! [options]
//! with_dotnet = true
//!
//! [[requires]]
//! name = "imgui"
//! version = "1.91.0-docking"
//!
//! [[requires]]
//! name = "dotnet"
//! version = "9.0.4"
//! when = "with_dotnet"
//!
//! [dependency_options.assimp]
//! shared = false
//!
//! [[staging.runtime]]
//! dependency = "dotnet"
//! components = { host = "dotnet/host/fxr/%(version)s" }
//! ```

mod format;
pub mod kitchen;
pub mod options;
pub mod parser;
pub mod requirements;
pub mod variants;

pub use format::{
    ArtifactRule, AuxiliaryRecipe, BuildSection, ComponentInfo, Descriptor, OptionValue,
    PackageInfo, PackageSection, RequirementEntry, RuntimeStaging, SettingsAxes, SourceSection,
    StagingLayout, StagingSection, VersionOverlay,
};
pub use kitchen::{FetchedSource, Kitchen, KitchenConfig, PackageResult};
pub use options::{configure_options, DependencyOptions, DependencyOverride, OptionValues};
pub use parser::{parse_descriptor, parse_descriptor_file, validate_descriptor};
pub use requirements::{Requirement, RequirementSet};
pub use variants::{available_versions, instantiate};
