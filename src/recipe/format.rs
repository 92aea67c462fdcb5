// src/recipe/format.rs

//! Descriptor file format definitions
//!
//! Descriptors are TOML files that pin third-party library versions, pass
//! option toggles to those libraries and describe how resolved outputs are
//! staged into a runnable tree. Packaging descriptors additionally carry a
//! pinned source, build commands and install rules.

use crate::settings::{Arch, Os, Settings};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A complete dependency and staging descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    /// Identity of the descriptor
    pub package: PackageSection,

    /// Axes under which the descriptor is valid
    #[serde(default)]
    pub settings: SettingsAxes,

    /// The descriptor's own options and their defaults
    #[serde(default)]
    pub options: BTreeMap<String, OptionValue>,

    /// Pinned requirements, in declaration order
    #[serde(default)]
    pub requires: Vec<RequirementEntry>,

    /// Options applied to each dependency before it builds
    ///
    /// Keyed by dependency name, then option key.
    #[serde(default)]
    pub dependency_options: BTreeMap<String, BTreeMap<String, OptionValue>>,

    /// Sub-descriptors to register with the package manager before resolving
    #[serde(default)]
    pub auxiliary: Vec<AuxiliaryRecipe>,

    /// Post-resolution staging rules (optional)
    #[serde(default)]
    pub staging: Option<StagingSection>,

    /// Pinned upstream source (packaging descriptors only)
    #[serde(default)]
    pub source: Option<SourceSection>,

    /// Build commands (optional)
    #[serde(default)]
    pub build: Option<BuildSection>,

    /// Rules copying build outputs into the package folder
    #[serde(default)]
    pub artifacts: Vec<ArtifactRule>,

    /// Consumption metadata written alongside packaged artifacts
    #[serde(default)]
    pub package_info: Option<PackageInfo>,

    /// Variables for substitution (optional)
    #[serde(default)]
    pub variables: HashMap<String, String>,

    /// Version-keyed overlays of this descriptor
    #[serde(default)]
    pub versions: BTreeMap<String, VersionOverlay>,
}

impl Descriptor {
    /// Substitute variables in a string
    ///
    /// Replaces `%(name)s` patterns with their values from:
    /// 1. Built-in variables (name, version)
    /// 2. Settings variables (os, arch, compiler, build_type), when given
    /// 3. Custom variables from the [variables] section
    pub fn substitute(&self, template: &str, settings: Option<&Settings>) -> String {
        let mut result = template.to_string();

        result = result.replace("%(version)s", &self.package.version);
        result = result.replace("%(name)s", &self.package.name);

        if let Some(settings) = settings {
            for (key, value) in settings.variables() {
                result = result.replace(&format!("%({})s", key), value);
            }
        }

        for (key, value) in &self.variables {
            result = result.replace(&format!("%({})s", key), value);
        }

        result
    }

    /// `name/version` reference of this descriptor
    pub fn reference(&self) -> String {
        format!("{}/{}", self.package.name, self.package.version)
    }

    /// Check whether the descriptor declares an option
    pub fn has_option(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    /// Names of all declared requirements, conditional ones included
    pub fn declared_requirement_names(&self) -> Vec<&str> {
        self.requires.iter().map(|r| r.name.as_str()).collect()
    }
}

/// Package identity section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    /// Descriptor name
    pub name: String,

    /// Descriptor version
    pub version: String,

    /// Short description
    #[serde(default)]
    pub summary: Option<String>,

    /// License identifier (SPDX)
    #[serde(default)]
    pub license: Option<String>,

    /// Homepage URL
    #[serde(default)]
    pub homepage: Option<String>,
}

/// Settings axes a descriptor supports
///
/// An empty axis means any value is accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsAxes {
    #[serde(default)]
    pub os: Vec<Os>,
    #[serde(default)]
    pub arch: Vec<Arch>,
    #[serde(default)]
    pub compiler: Vec<String>,
    #[serde(default)]
    pub build_type: Vec<String>,
}

impl SettingsAxes {
    /// Describe every axis the given settings fall outside of
    ///
    /// Returns an empty list when the settings are supported.
    pub fn mismatches(&self, settings: &Settings) -> Vec<String> {
        let mut out = Vec::new();

        if !self.os.is_empty() && !self.os.contains(&settings.os) {
            out.push(format!("os '{}' not in {:?}", settings.os, self.os));
        }
        if !self.arch.is_empty() && !self.arch.contains(&settings.arch) {
            out.push(format!("arch '{}' not in {:?}", settings.arch, self.arch));
        }
        if !self.compiler.is_empty() && !self.compiler.contains(&settings.compiler) {
            out.push(format!(
                "compiler '{}' not in {:?}",
                settings.compiler, self.compiler
            ));
        }
        if !self.build_type.is_empty() && !self.build_type.contains(&settings.build_type) {
            out.push(format!(
                "build_type '{}' not in {:?}",
                settings.build_type, self.build_type
            ));
        }

        out
    }

    /// Check whether the given settings are supported
    pub fn supports(&self, settings: &Settings) -> bool {
        self.mismatches(settings).is_empty()
    }
}

/// An option value: boolean toggle or enum choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Choice(String),
}

impl OptionValue {
    /// Get the boolean value, if this is a toggle
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Choice(_) => None,
        }
    }

    /// Check if this is a boolean toggle
    pub fn is_bool(&self) -> bool {
        matches!(self, OptionValue::Bool(_))
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(true) => f.write_str("True"),
            OptionValue::Bool(false) => f.write_str("False"),
            OptionValue::Choice(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Choice(s.to_string())
    }
}

/// A declared requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementEntry {
    /// Library name
    pub name: String,

    /// Pinned version
    pub version: String,

    /// Force this pin over transitive requests of the same library
    #[serde(default, rename = "override")]
    pub overrides: bool,

    /// Boolean option gating this entry: `"opt"` or `"!opt"`
    #[serde(default)]
    pub when: Option<String>,
}

/// A sub-descriptor registered before resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryRecipe {
    /// Name the sub-descriptor is registered under
    pub name: String,

    /// Version the sub-descriptor is registered under
    pub version: String,

    /// Directory of the sub-descriptor, relative to this descriptor
    pub path: String,

    /// Boolean option gating the registration, like `requires.when`
    #[serde(default)]
    pub when: Option<String>,
}

/// Output layout of the staging destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagingLayout {
    /// One subdirectory per output configuration (`bin/Debug`, `bin/Release`, ...)
    #[default]
    MultiConfig,
    /// Everything directly in the destination
    Flat,
}

/// Post-resolution staging section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingSection {
    /// Destination layout
    #[serde(default)]
    pub layout: StagingLayout,

    /// Destination directory, relative to the output root
    #[serde(default = "default_destination")]
    pub destination: String,

    /// Extra file patterns copied on top of the OS dynamic-library patterns
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Dependencies staged with a fixed component layout instead of flattening
    #[serde(default)]
    pub runtime: Vec<RuntimeStaging>,
}

impl Default for StagingSection {
    fn default() -> Self {
        Self {
            layout: StagingLayout::default(),
            destination: default_destination(),
            patterns: Vec::new(),
            runtime: Vec::new(),
        }
    }
}

fn default_destination() -> String {
    "bin".to_string()
}

/// Component-preserving staging for a multi-component runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeStaging {
    /// Dependency whose components are staged
    pub dependency: String,

    /// Component name → subdirectory under the destination
    ///
    /// Supports `%(version)s`, replaced with the dependency's resolved version.
    pub components: BTreeMap<String, String>,
}

/// Pinned upstream source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceSection {
    /// Archive fetched by URL
    Archive {
        /// Archive URL, supports `%(var)s` substitution
        archive: String,
        /// Checksum (`sha256:...`)
        #[serde(default)]
        checksum: Option<String>,
    },
    /// Git repository checked out at a pinned revision
    Git {
        /// Repository URL
        git: String,
        /// Commit hash or tag
        rev: String,
    },
}

/// Build instructions section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildSection {
    /// Configure command
    #[serde(default)]
    pub configure: Option<String>,

    /// Build command
    #[serde(default)]
    pub make: Option<String>,

    /// Install command
    #[serde(default)]
    pub install: Option<String>,

    /// Environment variables to set during build
    #[serde(default)]
    pub environment: HashMap<String, String>,

    /// Working directory within source (relative path)
    #[serde(default)]
    pub workdir: Option<String>,
}

/// Copy rule from the build tree into the package folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRule {
    /// Glob matched against paths relative to `from`
    pub pattern: String,

    /// Source directory relative to the build tree
    #[serde(default)]
    pub from: String,

    /// Destination directory relative to the package folder
    #[serde(default)]
    pub to: String,

    /// Keep the relative path below `from` (otherwise flatten)
    #[serde(default = "default_keep_path")]
    pub keep_path: bool,
}

fn default_keep_path() -> bool {
    true
}

/// Consumption metadata for downstream users of a package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    #[serde(default)]
    pub bindirs: Vec<String>,
    #[serde(default)]
    pub libdirs: Vec<String>,
    #[serde(default)]
    pub includedirs: Vec<String>,
    /// Named sub-components with their own directories
    #[serde(default)]
    pub components: BTreeMap<String, ComponentInfo>,
}

/// Directories of one named component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInfo {
    #[serde(default)]
    pub bindirs: Vec<String>,
    #[serde(default)]
    pub libdirs: Vec<String>,
    #[serde(default)]
    pub includedirs: Vec<String>,
}

/// Per-version overrides of a descriptor template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionOverlay {
    /// Replaces the base source
    #[serde(default)]
    pub source: Option<SourceSection>,

    /// Replaces base entries of the same name, appends the rest
    #[serde(default)]
    pub requires: Vec<RequirementEntry>,

    /// Overwrites base dependency options key by key
    #[serde(default)]
    pub dependency_options: BTreeMap<String, BTreeMap<String, OptionValue>>,

    /// Overwrites base variables
    #[serde(default)]
    pub variables: HashMap<String, String>,
}
