// src/config.rs
//! Configuration file parsing for the oblo-recipes tool
//!
//! Supports TOML configuration files with the following sections:
//! - [package_manager] - Binary used to probe and export descriptors
//! - [registry] - Where auxiliary descriptors are registered
//! - [kitchen] - Source cache and build parallelism
//!
//! Every section is optional; command-line flags override file values.

use crate::recipe::KitchenConfig;
use crate::registry::{CommandRegistry, LocalRegistry, RecipeRegistry};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
pub struct ToolConfig {
    /// Package manager settings
    #[serde(default)]
    pub package_manager: PackageManagerSection,

    /// Registry settings
    #[serde(default)]
    pub registry: RegistrySection,

    /// Kitchen settings
    #[serde(default)]
    pub kitchen: KitchenSection,
}

#[derive(Debug, Deserialize)]
pub struct PackageManagerSection {
    /// Program name or path
    #[serde(default = "default_program")]
    pub program: String,
}

impl Default for PackageManagerSection {
    fn default() -> Self {
        Self {
            program: default_program(),
        }
    }
}

fn default_program() -> String {
    "conan".to_string()
}

/// How auxiliary descriptors are registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryMode {
    /// Shell out to the package manager
    #[default]
    Command,
    /// Copy into a plain directory tree
    Local,
}

impl std::str::FromStr for RegistryMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "command" => Ok(RegistryMode::Command),
            "local" => Ok(RegistryMode::Local),
            other => Err(format!("unknown registry mode '{}' (command, local)", other)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RegistrySection {
    #[serde(default)]
    pub mode: RegistryMode,

    /// Root of the local registry (local mode only)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KitchenSection {
    /// Directory for downloaded archives and checkouts
    #[serde(default)]
    pub source_cache: Option<PathBuf>,

    /// Parallel build jobs (default: available parallelism)
    #[serde(default)]
    pub jobs: Option<u32>,
}

impl ToolConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ToolConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load an explicit file, or the default file if it exists
    ///
    /// A missing default file yields the default configuration; a missing
    /// explicit file is an error.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => {
                debug!("Using config file {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.package_manager.program.trim().is_empty() {
            anyhow::bail!("package_manager.program must not be empty");
        }

        if self.kitchen.jobs == Some(0) {
            anyhow::bail!("kitchen.jobs must be at least 1");
        }

        Ok(())
    }

    /// Build the kitchen configuration, applying file values over defaults
    pub fn kitchen_config(&self) -> KitchenConfig {
        let mut config = KitchenConfig::default();
        if let Some(cache) = &self.kitchen.source_cache {
            config.source_cache = cache.clone();
        }
        if let Some(jobs) = self.kitchen.jobs {
            config.jobs = jobs;
        }
        config
    }

    /// Root of the local registry
    pub fn local_registry_path(&self) -> PathBuf {
        self.registry.path.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|d| d.join("oblo-recipes").join("registry"))
                .unwrap_or_else(|| PathBuf::from(".oblo-recipes/registry"))
        })
    }

    /// Construct the registry for `mode`
    ///
    /// A package manager missing from PATH is not fatal: probes and exports
    /// then fail per auxiliary and are reported as retryable.
    pub fn registry_for(&self, mode: RegistryMode) -> Box<dyn RecipeRegistry> {
        match mode {
            RegistryMode::Command => {
                let program = &self.package_manager.program;
                match CommandRegistry::locate(program) {
                    Ok(registry) => Box::new(registry),
                    Err(e) => {
                        warn!("Package manager '{}' not found: {}", program, e);
                        Box::new(CommandRegistry::new(program))
                    }
                }
            }
            RegistryMode::Local => Box::new(LocalRegistry::new(self.local_registry_path())),
        }
    }

    /// Construct the registry selected by the configuration file
    pub fn registry(&self) -> Box<dyn RecipeRegistry> {
        self.registry_for(self.registry.mode)
    }
}

/// `<config dir>/oblo-recipes/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("oblo-recipes").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ToolConfig::default();
        assert_eq!(config.package_manager.program, "conan");
        assert_eq!(config.registry.mode, RegistryMode::Command);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
[package_manager]
program = "/opt/conan/bin/conan"

[registry]
mode = "local"
path = "/tmp/registry"

[kitchen]
source_cache = "/tmp/sources"
jobs = 3
"#;
        let config: ToolConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.registry.mode, RegistryMode::Local);
        assert_eq!(config.local_registry_path(), PathBuf::from("/tmp/registry"));

        let kitchen = config.kitchen_config();
        assert_eq!(kitchen.source_cache, PathBuf::from("/tmp/sources"));
        assert_eq!(kitchen.jobs, 3);
    }

    #[test]
    fn test_invalid_config() {
        let config: ToolConfig = toml::from_str("[kitchen]\njobs = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config: ToolConfig = toml::from_str("[package_manager]\nprogram = \"\"\n").unwrap();
        assert!(config.validate().is_err());

        assert!(toml::from_str::<ToolConfig>("[registry]\nmode = \"remote\"\n").is_err());
    }

    #[test]
    fn test_load_missing_explicit_file() {
        assert!(ToolConfig::load_or_default(Some(Path::new("/nonexistent/config.toml"))).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[registry]\nmode = \"local\"\n").unwrap();
        let config = ToolConfig::load(file.path()).unwrap();
        assert_eq!(config.registry.mode, RegistryMode::Local);
    }

    #[test]
    fn test_registry_mode_override() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config: ToolConfig = toml::from_str(&format!(
            "[package_manager]\nprogram = \"oblo-missing-package-manager\"\n\n[registry]\nmode = \"local\"\npath = \"{}\"\n",
            tmp.path().display()
        ))
        .unwrap();

        // The file selects the local registry, which accepts any probe
        assert!(config.registry().is_known("luau", "0.653").is_ok());

        // Command mode keeps the missing program and fails per probe
        let registry = config.registry_for(RegistryMode::Command);
        assert!(registry.is_known("luau", "0.653").is_err());
    }

    #[test]
    fn test_registry_mode_from_str() {
        assert_eq!("local".parse::<RegistryMode>().unwrap(), RegistryMode::Local);
        assert!("remote".parse::<RegistryMode>().is_err());
    }
}
