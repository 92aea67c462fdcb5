// src/registry/command.rs

//! Registry backed by the package manager's command-line interface

use crate::error::{Error, Result};
use crate::registry::{ExportStatus, RecipeRegistry};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Registry that shells out to the package manager binary
///
/// Probes with `<program> list <name>/<version> --format=json` and exports
/// with `<program> export <dir> --name <name> --version <version>`.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    program: PathBuf,
}

impl CommandRegistry {
    /// Use an explicit program path
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Locate the program on PATH
    pub fn locate(program: &str) -> Result<Self> {
        let path = which::which(program)
            .map_err(|e| Error::ToolNotFound(format!("{}: {}", program, e)))?;
        debug!("Using package manager at {}", path.display());
        Ok(Self::new(path))
    }

    /// Path of the program in use
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!("Running {} {}", self.program.display(), args.join(" "));
        Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| {
                Error::CommandFailed(format!("Failed to run {}: {}", self.program.display(), e))
            })
    }
}

impl RecipeRegistry for CommandRegistry {
    fn is_known(&self, name: &str, version: &str) -> Result<bool> {
        let reference = format!("{}/{}", name, version);
        let output = self.run(&["list", &reference, "--format=json"])?;

        if !output.status.success() {
            return Err(Error::CommandFailed(format!(
                "list {} failed: {}",
                reference,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        listing_contains(&String::from_utf8_lossy(&output.stdout), &reference)
    }

    fn export(&self, recipe_dir: &Path, name: &str, version: &str) -> Result<ExportStatus> {
        let dir = recipe_dir.to_str().ok_or_else(|| {
            Error::IoError(format!("Recipe path is not valid UTF-8: {}", recipe_dir.display()))
        })?;
        let output = self.run(&["export", dir, "--name", name, "--version", version])?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.success() {
            return Ok(ExportStatus::Exported);
        }
        if stderr.contains("already exists") {
            return Ok(ExportStatus::AlreadyExists);
        }

        Err(Error::CommandFailed(format!(
            "export {}/{} failed: {}",
            name,
            version,
            stderr.trim()
        )))
    }
}

/// Check a JSON cache listing for a reference
///
/// The listing maps each remote (here only the local cache) to the
/// references it holds, e.g. `{"Local Cache": {"luau/0.653": {...}}}`.
fn listing_contains(json: &str, reference: &str) -> Result<bool> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| Error::ParseError(format!("Invalid cache listing: {}", e)))?;

    let Some(remotes) = value.as_object() else {
        return Err(Error::ParseError("Cache listing is not an object".to_string()));
    };

    Ok(remotes.values().any(|refs| {
        refs.as_object()
            .is_some_and(|refs| refs.keys().any(|k| k == reference))
    }))
}
