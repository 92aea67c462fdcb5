// src/recipe/kitchen/cook.rs

//! Build and package phases for a single descriptor

use super::config::PackageResult;
use super::Kitchen;
use crate::error::{Error, Result};
use crate::recipe::format::Descriptor;
use crate::settings::Settings;
use crate::staging::copy_file;
use glob::Pattern;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Name of the consumption metadata file in a package folder
pub const PACKAGE_INFO_FILE: &str = "package_info.json";

/// One descriptor being cooked
pub struct Cook<'a> {
    kitchen: &'a Kitchen,
    descriptor: &'a Descriptor,
    settings: &'a Settings,
    log: String,
}

impl<'a> Cook<'a> {
    pub(super) fn new(kitchen: &'a Kitchen, descriptor: &'a Descriptor, settings: &'a Settings) -> Self {
        Self {
            kitchen,
            descriptor,
            settings,
            log: String::new(),
        }
    }

    /// Accumulated output of every build step
    pub fn log(&self) -> &str {
        &self.log
    }

    /// Substitute descriptor, settings and directory variables
    fn expand(&self, template: &str, source_dir: &Path, build_dir: &Path) -> String {
        self.descriptor
            .substitute(template, Some(self.settings))
            .replace("%(source_dir)s", &source_dir.to_string_lossy())
            .replace("%(build_dir)s", &build_dir.to_string_lossy())
            .replace("%(jobs)s", &self.kitchen.config.jobs.to_string())
    }

    /// Run configure, make and install in order
    ///
    /// Missing steps are skipped. The first failing step aborts.
    pub fn simmer(&mut self, source_dir: &Path, build_dir: &Path) -> Result<()> {
        let Some(build) = &self.descriptor.build else {
            debug!("{} has no build section", self.descriptor.reference());
            return Ok(());
        };

        fs::create_dir_all(build_dir)?;

        let workdir = match &build.workdir {
            Some(w) => source_dir.join(self.expand(w, source_dir, build_dir)),
            None => source_dir.to_path_buf(),
        };

        let env: HashMap<String, String> = build
            .environment
            .iter()
            .map(|(k, v)| (k.clone(), self.expand(v, source_dir, build_dir)))
            .collect();

        let steps = [
            ("configure", &build.configure),
            ("make", &build.make),
            ("install", &build.install),
        ];

        for (phase, command) in steps {
            if let Some(command) = command {
                let command = self.expand(command, source_dir, build_dir);
                self.run_build_step(phase, &command, &workdir, &env)?;
            }
        }

        Ok(())
    }

    /// Run a build step through the configured shell
    fn run_build_step(
        &mut self,
        phase: &str,
        command: &str,
        workdir: &Path,
        env: &HashMap<String, String>,
    ) -> Result<()> {
        info!("Running {} phase", phase);
        debug!("Command: {}", command);

        let output = Command::new(&self.kitchen.config.shell)
            .arg("-c")
            .arg(command)
            .current_dir(workdir)
            .envs(env)
            .output()
            .map_err(|e| Error::IoError(format!("Failed to run {} phase: {}", phase, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        self.log.push_str(&format!("=== {} ===\n", phase));
        for stream in [&stdout, &stderr] {
            if !stream.is_empty() {
                self.log.push_str(stream);
                self.log.push('\n');
            }
        }

        if !output.status.success() {
            return Err(Error::BuildFailed(format!(
                "{} phase failed with exit code {:?}\nstderr: {}",
                phase,
                output.status.code(),
                stderr
            )));
        }

        Ok(())
    }

    /// Copy artifacts into the package folder and write consumption metadata
    pub fn plate(&mut self, build_dir: &Path, package_dir: &Path) -> Result<PackageResult> {
        let mut result = PackageResult::default();
        fs::create_dir_all(package_dir)?;

        for rule in &self.descriptor.artifacts {
            let pattern_str = self.expand(&rule.pattern, build_dir, build_dir);
            let pattern = Pattern::new(&pattern_str).map_err(|e| Error::InvalidPattern {
                pattern: pattern_str.clone(),
                reason: e.to_string(),
            })?;

            let from = build_dir.join(self.expand(&rule.from, build_dir, build_dir));
            let to = package_dir.join(self.expand(&rule.to, build_dir, build_dir));

            if !from.is_dir() {
                debug!("Artifact source {} does not exist", from.display());
                continue;
            }

            for entry in WalkDir::new(&from).sort_by_file_name() {
                let entry = entry.map_err(|e| {
                    Error::IoError(format!("Failed to walk {}: {}", from.display(), e))
                })?;
                if entry.file_type().is_dir() {
                    continue;
                }

                let relative = entry
                    .path()
                    .strip_prefix(&from)
                    .map_err(|e| Error::IoError(e.to_string()))?;
                if !pattern.matches_path(relative) {
                    continue;
                }

                let target: PathBuf = if rule.keep_path {
                    to.join(relative)
                } else {
                    to.join(entry.file_name())
                };
                copy_file(entry.path(), &target)?;
                result.files.push(target);
            }
        }

        if let Some(info) = &self.descriptor.package_info {
            let expand_all = |dirs: &[String]| -> Vec<String> {
                dirs.iter()
                    .map(|d| self.descriptor.substitute(d, Some(self.settings)))
                    .collect()
            };

            let mut expanded = info.clone();
            expanded.bindirs = expand_all(&info.bindirs);
            expanded.libdirs = expand_all(&info.libdirs);
            expanded.includedirs = expand_all(&info.includedirs);
            for component in expanded.components.values_mut() {
                component.bindirs = expand_all(&component.bindirs);
                component.libdirs = expand_all(&component.libdirs);
                component.includedirs = expand_all(&component.includedirs);
            }

            let json = serde_json::to_string_pretty(&expanded).map_err(|e| {
                Error::ParseError(format!("Failed to serialize package info: {}", e))
            })?;
            let info_path = package_dir.join(PACKAGE_INFO_FILE);
            fs::write(&info_path, json)?;
            result.info_path = Some(info_path);
        }

        info!(
            "Packaged {} file(s) for {} into {}",
            result.files.len(),
            self.descriptor.reference(),
            package_dir.display()
        );

        Ok(result)
    }
}
