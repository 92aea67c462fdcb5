// src/recipe/kitchen/mod.rs

//! Kitchen: fetches, builds and packages packaging descriptors
//!
//! A packaging descriptor (for example the luau or dotnet recipes) pins a
//! source and describes how to turn it into a package folder that the
//! application's staging step can consume. The Kitchen handles:
//! - Fetching the pinned archive or git revision into a source cache
//! - Unpacking the source into a work directory
//! - Running configure/make/install commands
//! - Copying artifacts and writing `package_info.json`

mod archive;
mod config;
mod cook;

pub use config::{default_source_cache, FetchedSource, KitchenConfig, PackageResult};
pub use cook::{Cook, PACKAGE_INFO_FILE};

use crate::error::{Error, Result};
use crate::recipe::format::{Descriptor, SourceSection};
use crate::settings::Settings;
use archive::{download_file, extract_archive, url_filename, verify_file_checksum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// The Kitchen: where packaging descriptors are cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
}

impl Kitchen {
    /// Create a new Kitchen with the given configuration
    ///
    /// A relative source cache is resolved against the current directory.
    pub fn new(mut config: KitchenConfig) -> Self {
        if let Ok(cache) = std::path::absolute(&config.source_cache) {
            config.source_cache = cache;
        }
        Self { config }
    }

    /// Create a Kitchen with default configuration
    pub fn with_defaults() -> Self {
        Self::new(KitchenConfig::default())
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    /// Cache path of the archive for `descriptor`
    fn archive_path(&self, descriptor: &Descriptor, url: &str) -> PathBuf {
        self.config.source_cache.join(format!(
            "{}-{}-{}",
            descriptor.package.name,
            descriptor.package.version,
            url_filename(url)
        ))
    }

    /// Cache path of the checkout for `descriptor`
    fn checkout_path(&self, descriptor: &Descriptor, rev: &str) -> PathBuf {
        self.config
            .source_cache
            .join(format!("{}-{}", descriptor.package.name, rev))
    }

    /// Check whether the pinned source is already in the cache
    pub fn sources_cached(&self, descriptor: &Descriptor, settings: &Settings) -> bool {
        match &descriptor.source {
            Some(SourceSection::Archive { archive, checksum }) => {
                let url = descriptor.substitute(archive, Some(settings));
                let path = self.archive_path(descriptor, &url);
                match checksum {
                    Some(checksum) => {
                        path.is_file() && verify_file_checksum(&path, checksum).is_ok()
                    }
                    None => path.is_file(),
                }
            }
            Some(SourceSection::Git { rev, .. }) => {
                let dir = self.checkout_path(descriptor, rev);
                checkout_at(&dir, rev).unwrap_or(false)
            }
            None => false,
        }
    }

    /// Fetch the pinned source into the source cache
    ///
    /// A cached archive is reused only when its checksum still verifies.
    /// A fresh download lands in a temporary file and is moved into place
    /// after verification, so a failed fetch never leaves a bad archive.
    pub fn fetch(&self, descriptor: &Descriptor, settings: &Settings) -> Result<FetchedSource> {
        let Some(source) = &descriptor.source else {
            return Err(Error::NotFound(format!(
                "{} has no source section",
                descriptor.reference()
            )));
        };

        fs::create_dir_all(&self.config.source_cache)?;

        match source {
            SourceSection::Archive { archive, checksum } => {
                let url = descriptor.substitute(archive, Some(settings));
                self.fetch_archive(descriptor, &url, checksum.as_deref())
            }
            SourceSection::Git { git, rev } => {
                let url = descriptor.substitute(git, Some(settings));
                self.fetch_git(descriptor, &url, rev)
            }
        }
    }

    fn fetch_archive(
        &self,
        descriptor: &Descriptor,
        url: &str,
        checksum: Option<&str>,
    ) -> Result<FetchedSource> {
        let path = self.archive_path(descriptor, url);

        if path.is_file() {
            match checksum {
                Some(checksum) => match verify_file_checksum(&path, checksum) {
                    Ok(()) => {
                        debug!("Using cached archive {}", path.display());
                        return Ok(FetchedSource::Archive(path));
                    }
                    Err(e) => warn!("Cached archive is stale, refetching: {}", e),
                },
                None => {
                    debug!("Using cached unpinned archive {}", path.display());
                    return Ok(FetchedSource::Archive(path));
                }
            }
        }

        info!("Fetching {}", url);
        let temp = tempfile::NamedTempFile::new_in(&self.config.source_cache)?;
        download_file(url, temp.path())?;

        match checksum {
            Some(checksum) => verify_file_checksum(temp.path(), checksum)?,
            None => warn!(
                "{} has no checksum, archive is not verified",
                descriptor.reference()
            ),
        }

        temp.persist(&path)
            .map_err(|e| Error::IoError(format!("Failed to store {}: {}", path.display(), e)))?;

        Ok(FetchedSource::Archive(path))
    }

    fn fetch_git(&self, descriptor: &Descriptor, url: &str, rev: &str) -> Result<FetchedSource> {
        let dir = self.checkout_path(descriptor, rev);

        if dir.join(".git").is_dir() {
            if checkout_at(&dir, rev)? {
                debug!("Using cached checkout {}", dir.display());
                return Ok(FetchedSource::Checkout(dir));
            }
            info!("Updating checkout {} to {}", dir.display(), rev);
            git(&dir, &["fetch", "--tags", "origin"])?;
        } else {
            info!("Cloning {} at {}", url, rev);
            let name = dir
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| Error::IoError(format!("Path is not valid UTF-8: {}", dir.display())))?;
            git(&self.config.source_cache, &["clone", url, name])?;
        }

        git(&dir, &["checkout", "--detach", rev])?;
        Ok(FetchedSource::Checkout(dir))
    }

    /// Make the fetched source available as a directory under `work_dir`
    ///
    /// Archives are extracted; when they hold a single top-level directory,
    /// that directory is returned. Checkouts are used in place.
    pub fn unpack(&self, fetched: &FetchedSource, work_dir: &Path) -> Result<PathBuf> {
        match fetched {
            FetchedSource::Checkout(dir) => Ok(dir.clone()),
            FetchedSource::Archive(path) => {
                let dest = work_dir.join("src");
                if dest.exists() {
                    fs::remove_dir_all(&dest)?;
                }
                extract_archive(path, &dest)?;
                single_subdir(&dest)
            }
        }
    }

    /// Run the descriptor's build commands
    ///
    /// Steps run inside the source tree, so both directories are made
    /// absolute before they are substituted. Returns the build log.
    pub fn build(
        &self,
        descriptor: &Descriptor,
        settings: &Settings,
        source_dir: &Path,
        build_dir: &Path,
    ) -> Result<String> {
        info!("Building {} for {}", descriptor.reference(), settings);
        let source_dir = absolute(source_dir)?;
        let build_dir = absolute(build_dir)?;
        let mut cook = Cook::new(self, descriptor, settings);
        cook.simmer(&source_dir, &build_dir)?;
        Ok(cook.log().to_string())
    }

    /// Copy artifacts from `build_dir` into `package_dir`
    pub fn package(
        &self,
        descriptor: &Descriptor,
        settings: &Settings,
        build_dir: &Path,
        package_dir: &Path,
    ) -> Result<PackageResult> {
        let build_dir = absolute(build_dir)?;
        let package_dir = absolute(package_dir)?;
        Cook::new(self, descriptor, settings).plate(&build_dir, &package_dir)
    }
}

/// Resolve `path` against the current directory
fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .map_err(|e| Error::IoError(format!("Failed to resolve {}: {}", path.display(), e)))
}

/// Run git in `dir`
fn git(dir: &Path, args: &[&str]) -> Result<String> {
    debug!("git {}", args.join(" "));
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::CommandFailed(format!("Failed to run git: {}", e)))?;

    if !output.status.success() {
        return Err(Error::CommandFailed(format!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Check whether the checkout in `dir` is at `rev`
fn checkout_at(dir: &Path, rev: &str) -> Result<bool> {
    if !dir.join(".git").is_dir() {
        return Ok(false);
    }
    let head = git(dir, &["rev-parse", "HEAD"])?;
    let wanted = match git(dir, &["rev-parse", &format!("{}^{{commit}}", rev)]) {
        Ok(hash) => hash,
        Err(_) => return Ok(false),
    };
    Ok(head == wanted)
}

/// Descend into the only entry of `dir` if it is a directory
fn single_subdir(dir: &Path) -> Result<PathBuf> {
    let entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    match entries.as_slice() {
        [entry] if entry.file_type()?.is_dir() => Ok(entry.path()),
        _ => Ok(dir.to_path_buf()),
    }
}
