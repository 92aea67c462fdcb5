// src/graph.rs

//! Resolved dependency graph handed over by the package manager
//!
//! The package manager resolves, builds or fetches every requirement and
//! reports where each one landed. This module only reads that report; it
//! never resolves anything itself.
//!
//! # Format
//!
//! ```json
//! {
//!   "dependencies": {
//!     "assimp": {
//!       "version": "5.4.3",
//!       "package_folder": "/home/me/.pkgs/p/assimp1a2b/p",
//!       "lib_dirs": ["/home/me/.pkgs/p/assimp1a2b/p/lib"],
//!       "bin_dirs": ["/home/me/.pkgs/p/assimp1a2b/p/bin"]
//!     },
//!     "dotnet": {
//!       "version": "9.0.4",
//!       "components": {
//!         "host": { "bin_dirs": ["/home/me/.pkgs/p/dotnet9f/p/host/fxr/9.0.4"] },
//!         "runtime": { "bin_dirs": ["/home/me/.pkgs/p/dotnet9f/p/shared/Microsoft.NETCore.App/9.0.4"] }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Directories are kept exactly as reported. Relative entries are legal in
//! the report and are filtered out by staging.

use crate::error::{Error, Result};
use crate::recipe::{PackageInfo, RequirementSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Directories of one named component of a resolved dependency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedComponent {
    #[serde(default)]
    pub lib_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub bin_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
}

/// One resolved dependency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependency {
    /// Filled from the map key when loading
    #[serde(skip)]
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub package_folder: Option<PathBuf>,
    #[serde(default)]
    pub lib_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub bin_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub components: BTreeMap<String, ResolvedComponent>,
}

impl ResolvedDependency {
    /// Create a dependency with no directories
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Build a dependency from a package folder and its consumption metadata
    pub fn from_package_info(
        name: impl Into<String>,
        version: impl Into<String>,
        package_folder: &Path,
        info: &PackageInfo,
    ) -> Self {
        let join = |dirs: &[String]| -> Vec<PathBuf> {
            dirs.iter().map(|d| package_folder.join(d)).collect()
        };

        let components = info
            .components
            .iter()
            .map(|(name, c)| {
                (
                    name.clone(),
                    ResolvedComponent {
                        lib_dirs: join(&c.libdirs),
                        bin_dirs: join(&c.bindirs),
                        include_dirs: join(&c.includedirs),
                    },
                )
            })
            .collect();

        Self {
            name: name.into(),
            version: version.into(),
            package_folder: Some(package_folder.to_path_buf()),
            lib_dirs: join(&info.libdirs),
            bin_dirs: join(&info.bindirs),
            include_dirs: join(&info.includedirs),
            components,
        }
    }

    /// Library directories followed by binary directories
    pub fn output_dirs(&self) -> impl Iterator<Item = &PathBuf> {
        self.lib_dirs.iter().chain(self.bin_dirs.iter())
    }
}

/// Every dependency the package manager resolved for one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedGraph {
    #[serde(default)]
    dependencies: BTreeMap<String, ResolvedDependency>,
}

impl ResolvedGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a graph report from JSON
    pub fn from_json(content: &str) -> Result<Self> {
        let mut graph: Self = serde_json::from_str(content)
            .map_err(|e| Error::ParseError(format!("Invalid dependency graph: {}", e)))?;

        for (name, dep) in graph.dependencies.iter_mut() {
            dep.name = name.clone();
        }

        Ok(graph)
    }

    /// Load a graph report from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read graph {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::ParseError(format!("Failed to serialize graph: {}", e)))
    }

    /// Add or replace a dependency
    pub fn insert(&mut self, dependency: ResolvedDependency) {
        self.dependencies.insert(dependency.name.clone(), dependency);
    }

    /// Look up a dependency by name
    pub fn get(&self, name: &str) -> Option<&ResolvedDependency> {
        self.dependencies.get(name)
    }

    /// Iterate in name order
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.dependencies.values()
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Requirements the report does not cover, or covers at another version
    pub fn unresolved(&self, requirements: &RequirementSet) -> Vec<String> {
        requirements
            .iter()
            .filter_map(|req| match self.get(&req.name) {
                None => Some(format!("{} is missing", req.reference())),
                Some(dep) if dep.version != req.version => Some(format!(
                    "{} resolved as {}",
                    req.reference(),
                    dep.version
                )),
                Some(_) => None,
            })
            .collect()
    }
}
