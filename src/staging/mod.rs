// src/staging/mod.rs

//! Post-resolution staging
//!
//! Once the package manager has resolved every requirement, staging copies
//! their shared libraries into one runnable tree:
//! - Absolute library/binary directories are scanned recursively for files
//!   matching the dynamic-library patterns and copied flat into each
//!   destination
//! - Relative directories are skipped; they point back into the consumer's
//!   own tree, and copying them would copy its outputs over themselves
//! - Dependencies with a mandated component layout (see [`runtime`]) keep
//!   that layout instead of being flattened
//!
//! Staging is idempotent: every write overwrites with the same content, so a
//! failed run is repaired by running again. There is no rollback.

pub mod layout;
pub mod runtime;

use crate::error::{Error, Result};
use crate::graph::{ResolvedDependency, ResolvedGraph};
use crate::recipe::{RuntimeStaging, StagingSection};
use crate::settings::Settings;
use glob::Pattern;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A single file written by staging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub dependency: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Summary of a staging run
#[derive(Debug, Default)]
pub struct StagingReport {
    /// Destination directories, in the order they were populated
    pub destinations: Vec<PathBuf>,
    /// Every file written
    pub files: Vec<StagedFile>,
    /// Output directories that were skipped, either relative or the
    /// destination itself
    pub skipped: Vec<(String, PathBuf)>,
}

impl StagingReport {
    /// Files written below one destination directory
    pub fn files_in(&self, destination: &Path) -> Vec<&StagedFile> {
        self.files
            .iter()
            .filter(|f| f.destination.starts_with(destination))
            .collect()
    }
}

/// Copies resolved outputs according to a descriptor's staging section
#[derive(Debug)]
pub struct Stager<'a> {
    section: &'a StagingSection,
    settings: &'a Settings,
    patterns: Vec<Pattern>,
}

impl<'a> Stager<'a> {
    /// Prepare a stager, compiling the OS patterns plus any extras
    pub fn new(section: &'a StagingSection, settings: &'a Settings) -> Result<Self> {
        let patterns = settings
            .os
            .shared_library_patterns()
            .iter()
            .copied()
            .chain(section.patterns.iter().map(String::as_str))
            .map(|p| {
                Pattern::new(p).map_err(|e| Error::InvalidPattern {
                    pattern: p.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            section,
            settings,
            patterns,
        })
    }

    /// Check whether a file name matches the staging patterns
    pub fn matches(&self, file_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(file_name))
    }

    /// Stage every dependency of the graph below `output_root`
    ///
    /// All inputs are checked before the first copy: an unsupported build
    /// type or a runtime dependency with missing components aborts with
    /// nothing written.
    pub fn stage(&self, graph: &ResolvedGraph, output_root: &Path) -> Result<StagingReport> {
        let root = output_root.join(&self.section.destination);
        let destinations =
            layout::destinations(self.section.layout, &self.settings.build_type, &root)?;

        let runtime_rules: Vec<(&RuntimeStaging, &ResolvedDependency)> = self
            .section
            .runtime
            .iter()
            .filter_map(|rule| match graph.get(&rule.dependency) {
                Some(dep) => Some((rule, dep)),
                None => {
                    debug!("Runtime dependency '{}' not resolved, skipping", rule.dependency);
                    None
                }
            })
            .collect();

        for (rule, dep) in &runtime_rules {
            runtime::check_components(rule, dep)?;
        }

        let runtime_names: HashSet<&str> =
            runtime_rules.iter().map(|(r, _)| r.dependency.as_str()).collect();

        let mut report = StagingReport::default();

        for destination in &destinations {
            info!("Staging into {}", destination.display());
            fs::create_dir_all(destination)?;

            for dep in graph.iter() {
                if runtime_names.contains(dep.name.as_str()) {
                    continue;
                }
                self.stage_flat(dep, destination, &mut report)?;
            }

            for (rule, dep) in &runtime_rules {
                let files = runtime::stage_components(rule, dep, destination)?;
                report.files.extend(files);
            }

            report.destinations.push(destination.clone());
        }

        info!(
            "Staged {} file(s) into {} destination(s)",
            report.files.len(),
            report.destinations.len()
        );

        Ok(report)
    }

    fn stage_flat(
        &self,
        dep: &ResolvedDependency,
        destination: &Path,
        report: &mut StagingReport,
    ) -> Result<()> {
        let resolved_destination = fs::canonicalize(destination)?;

        for dir in dep.output_dirs() {
            if !dir.is_absolute() {
                debug!(
                    "Skipping relative output dir {} of {}",
                    dir.display(),
                    dep.name
                );
                report.skipped.push((dep.name.clone(), dir.clone()));
                continue;
            }
            if !dir.is_dir() {
                debug!("Output dir {} of {} does not exist", dir.display(), dep.name);
                continue;
            }

            let resolved_dir = fs::canonicalize(dir)?;
            if resolved_dir == resolved_destination {
                warn!(
                    "Output dir {} of {} is the staging destination, skipping",
                    dir.display(),
                    dep.name
                );
                report.skipped.push((dep.name.clone(), dir.clone()));
                continue;
            }

            // The destination may sit inside the output dir
            let nested_destination = resolved_destination
                .strip_prefix(&resolved_dir)
                .ok()
                .map(|rel| dir.join(rel));

            let walker = WalkDir::new(dir)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| nested_destination.as_deref() != Some(e.path()));

            for entry in walker {
                let entry = entry.map_err(|e| {
                    Error::IoError(format!("Failed to walk {}: {}", dir.display(), e))
                })?;
                if entry.file_type().is_dir() {
                    continue;
                }

                let Some(name) = entry.file_name().to_str() else {
                    warn!("Skipping non UTF-8 file name in {}", dir.display());
                    continue;
                };
                if !self.matches(name) {
                    continue;
                }

                let target = destination.join(name);
                copy_file(entry.path(), &target)?;
                report.files.push(StagedFile {
                    dependency: dep.name.clone(),
                    source: entry.path().to_path_buf(),
                    destination: target,
                });
            }
        }

        Ok(())
    }
}

/// Stage a graph with a descriptor's staging section
pub fn stage(
    graph: &ResolvedGraph,
    section: &StagingSection,
    settings: &Settings,
    output_root: &Path,
) -> Result<StagingReport> {
    Stager::new(section, settings)?.stage(graph, output_root)
}

/// Copy one file, replacing any existing file at the target
///
/// Copying a file onto itself is a no-op.
pub(crate) fn copy_file(source: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    if same_file(source, target) {
        debug!("{} is already in place", target.display());
        return Ok(());
    }
    fs::copy(source, target).map_err(|e| {
        Error::IoError(format!(
            "Failed to copy {} to {}: {}",
            source.display(),
            target.display(),
            e
        ))
    })?;
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
