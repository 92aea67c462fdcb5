// src/registry/local.rs

//! Directory-backed registry for offline use
//!
//! Each registered descriptor is a copy of its recipe directory at
//! `<root>/<name>/<version>/`.

use crate::error::{Error, Result};
use crate::registry::{ExportStatus, RecipeRegistry};
use crate::staging::copy_file;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Marker written once an export has completed
const MARKER: &str = ".registered";

/// Registry storing descriptors in a plain directory tree
#[derive(Debug, Clone)]
pub struct LocalRegistry {
    root: PathBuf,
}

impl LocalRegistry {
    /// Use `root` as the registry directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding `name/version`
    pub fn entry_dir(&self, name: &str, version: &str) -> PathBuf {
        self.root.join(name).join(version)
    }
}

impl RecipeRegistry for LocalRegistry {
    fn is_known(&self, name: &str, version: &str) -> Result<bool> {
        Ok(self.entry_dir(name, version).join(MARKER).is_file())
    }

    fn export(&self, recipe_dir: &Path, name: &str, version: &str) -> Result<ExportStatus> {
        let target = self.entry_dir(name, version);
        if target.join(MARKER).is_file() {
            return Ok(ExportStatus::AlreadyExists);
        }
        if !recipe_dir.is_dir() {
            return Err(Error::NotFound(format!(
                "Recipe directory {}",
                recipe_dir.display()
            )));
        }

        for entry in WalkDir::new(recipe_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                Error::IoError(format!("Failed to walk {}: {}", recipe_dir.display(), e))
            })?;
            if entry.file_type().is_dir() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(recipe_dir)
                .map_err(|e| Error::IoError(e.to_string()))?;
            copy_file(entry.path(), &target.join(relative))?;
        }

        fs::create_dir_all(&target)?;
        fs::write(target.join(MARKER), format!("{}/{}\n", name, version))?;

        Ok(ExportStatus::Exported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_then_known() {
        let tmp = TempDir::new().unwrap();
        let recipe = tmp.path().join("recipes/luau");
        fs::create_dir_all(&recipe).unwrap();
        fs::write(recipe.join("recipe.toml"), "[package]\n").unwrap();

        let registry = LocalRegistry::new(tmp.path().join("registry"));
        assert!(!registry.is_known("luau", "0.653").unwrap());

        assert_eq!(
            registry.export(&recipe, "luau", "0.653").unwrap(),
            ExportStatus::Exported
        );
        assert!(registry.is_known("luau", "0.653").unwrap());
        assert!(registry.entry_dir("luau", "0.653").join("recipe.toml").is_file());

        assert_eq!(
            registry.export(&recipe, "luau", "0.653").unwrap(),
            ExportStatus::AlreadyExists
        );
    }

    #[test]
    fn test_export_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let registry = LocalRegistry::new(tmp.path());
        assert!(registry
            .export(&tmp.path().join("nope"), "luau", "0.653")
            .is_err());
        assert!(!registry.is_known("luau", "0.653").unwrap());
    }
}
