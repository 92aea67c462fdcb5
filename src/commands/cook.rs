// src/commands/cook.rs

//! Fetch, build and package commands for packaging descriptors

use anyhow::{Context, Result};
use oblo_recipes::recipe::FetchedSource;
use oblo_recipes::{Invocation, Kitchen, KitchenConfig};
use std::path::{Path, PathBuf};
use tracing::info;

/// Fetch the pinned source into the cache
pub fn cmd_fetch(invocation: &Invocation, config: KitchenConfig) -> Result<()> {
    let kitchen = Kitchen::new(config);
    let descriptor = invocation.descriptor();

    if kitchen.sources_cached(descriptor, invocation.settings()) {
        println!("[OK] Source for {} is already cached", descriptor.reference());
    }

    let fetched = invocation
        .fetch(&kitchen)
        .with_context(|| format!("Failed to fetch source for {}", descriptor.reference()))?;

    match &fetched {
        FetchedSource::Archive(path) => println!("[COMPLETE] Archive: {}", path.display()),
        FetchedSource::Checkout(path) => println!("[COMPLETE] Checkout: {}", path.display()),
    }

    Ok(())
}

/// Fetch, unpack and build; optionally package the result
///
/// # Arguments
/// * `invocation` - Descriptor bound to this run's settings
/// * `config` - Kitchen configuration (source cache, jobs)
/// * `work_dir` - Directory for the unpacked source and build tree
/// * `package_dir` - Package the build tree here when set
pub fn cmd_build(
    invocation: &Invocation,
    config: KitchenConfig,
    work_dir: &Path,
    package_dir: Option<&Path>,
) -> Result<()> {
    let descriptor = invocation.descriptor();
    std::fs::create_dir_all(work_dir)
        .with_context(|| format!("Failed to create work directory: {}", work_dir.display()))?;

    println!(
        "Building {} for {} with {} parallel jobs...",
        descriptor.reference(),
        invocation.settings(),
        config.jobs
    );

    let kitchen = Kitchen::new(config);
    let build_dir = invocation
        .build(&kitchen, work_dir)
        .with_context(|| format!("Failed to build {}", descriptor.reference()))?;

    println!("[COMPLETE] Built into {}", build_dir.display());

    if let Some(package_dir) = package_dir {
        package_into(invocation, &kitchen, &build_dir, package_dir)?;
    }

    Ok(())
}

/// Package an existing build tree
pub fn cmd_package(
    invocation: &Invocation,
    config: KitchenConfig,
    build_dir: &Path,
    package_dir: &Path,
) -> Result<()> {
    let kitchen = Kitchen::new(config);
    package_into(invocation, &kitchen, build_dir, package_dir)
}

fn package_into(
    invocation: &Invocation,
    kitchen: &Kitchen,
    build_dir: &Path,
    package_dir: &Path,
) -> Result<()> {
    let descriptor = invocation.descriptor();
    let result = invocation
        .package(kitchen, build_dir, package_dir)
        .with_context(|| format!("Failed to package {}", descriptor.reference()))?;

    println!(
        "[COMPLETE] Packaged {} file(s) into {}",
        result.files.len(),
        package_dir.display()
    );
    if let Some(info_path) = &result.info_path {
        println!("  - {}", info_path.display());
    }

    info!(
        "Successfully packaged {} to {}",
        descriptor.reference(),
        package_dir.display()
    );

    Ok(())
}

/// Apply command-line overrides to a kitchen configuration
pub fn with_overrides(
    mut config: KitchenConfig,
    source_cache: Option<PathBuf>,
    jobs: Option<u32>,
) -> KitchenConfig {
    if let Some(cache) = source_cache {
        config.source_cache = cache;
    }
    if let Some(j) = jobs {
        config.jobs = j;
    }
    config
}
