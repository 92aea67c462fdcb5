// src/recipe/kitchen/config.rs

//! Configuration and result types for the Kitchen

use std::path::PathBuf;

/// Configuration for the Kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Directory for downloaded archives and git checkouts
    pub source_cache: PathBuf,
    /// Number of parallel jobs, exposed to build commands as `%(jobs)s`
    pub jobs: u32,
    /// Shell used to run build commands
    pub shell: String,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        Self {
            source_cache: default_source_cache(),
            jobs,
            shell: "sh".to_string(),
        }
    }
}

/// `<cache dir>/oblo-recipes/sources`, or a relative fallback
pub fn default_source_cache() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("oblo-recipes").join("sources"))
        .unwrap_or_else(|| PathBuf::from(".oblo-recipes/sources"))
}

/// Where fetched sources ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedSource {
    /// A verified archive in the source cache
    Archive(PathBuf),
    /// A git checkout at the pinned revision
    Checkout(PathBuf),
}

impl FetchedSource {
    pub fn path(&self) -> &PathBuf {
        match self {
            FetchedSource::Archive(p) | FetchedSource::Checkout(p) => p,
        }
    }
}

/// Result of packaging a build tree
#[derive(Debug, Default)]
pub struct PackageResult {
    /// Files copied into the package folder
    pub files: Vec<PathBuf>,
    /// Path of the written `package_info.json`, if any
    pub info_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kitchen_config_default() {
        let config = KitchenConfig::default();
        assert!(config.jobs > 0);
        assert_eq!(config.shell, "sh");
        assert!(config.source_cache.ends_with("sources"));
    }
}
