// src/lifecycle.rs

//! One evaluation of a descriptor
//!
//! An [`Invocation`] binds a descriptor (instantiated at one version) to the
//! settings and option values of a single run. Every lifecycle hook reads
//! from it; nothing is mutated after construction.

use crate::error::{Error, Result};
use crate::graph::ResolvedGraph;
use crate::recipe::{
    configure_options, instantiate, parse_descriptor_file, DependencyOptions,
    DependencyOverride, Descriptor, FetchedSource, Kitchen, OptionValues, PackageResult,
    RequirementSet, StagingSection,
};
use crate::registry::{register_auxiliaries, RecipeRegistry, Registration};
use crate::settings::Settings;
use crate::staging::{stage, StagingReport};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A descriptor bound to one run's settings and options
#[derive(Debug, Clone)]
pub struct Invocation {
    descriptor: Descriptor,
    base_dir: PathBuf,
    settings: Settings,
    options: OptionValues,
}

impl Invocation {
    /// Bind an already-instantiated descriptor
    pub fn new(
        descriptor: Descriptor,
        base_dir: impl Into<PathBuf>,
        settings: Settings,
        options: OptionValues,
    ) -> Self {
        Self {
            descriptor,
            base_dir: base_dir.into(),
            settings,
            options,
        }
    }

    /// Load a descriptor file and bind it
    ///
    /// `version` selects a version overlay; `None` uses the base version.
    /// `option_overrides` are `key=value` assignments for the descriptor's
    /// own options.
    pub fn load(
        path: &Path,
        version: Option<&str>,
        settings: Settings,
        option_overrides: &[String],
    ) -> Result<Self> {
        let template = parse_descriptor_file(path)?;
        let version = version.unwrap_or(&template.package.version).to_string();
        let descriptor = instantiate(&template, &version)?;
        let options = OptionValues::with_overrides(&descriptor, option_overrides)?;

        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        debug!(
            "Loaded {} from {} for {}",
            descriptor.reference(),
            path.display(),
            settings
        );

        Ok(Self::new(descriptor, base_dir, settings, options))
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn options(&self) -> &OptionValues {
        &self.options
    }

    /// Directory containing the descriptor file
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Settings axes the current settings fall outside of
    ///
    /// The package manager stays the authority; these are reported as
    /// warnings.
    pub fn mismatches(&self) -> Vec<String> {
        self.descriptor.settings.mismatches(&self.settings)
    }

    /// Register auxiliary sub-descriptors; never fails
    pub fn register_auxiliaries(&self, registry: &dyn RecipeRegistry) -> Vec<(String, Registration)> {
        register_auxiliaries(registry, &self.descriptor, &self.options, &self.base_dir)
    }

    /// Evaluate the requirement set for this run's options
    pub fn requirements(&self) -> Result<RequirementSet> {
        RequirementSet::evaluate(&self.descriptor, &self.options)
    }

    /// Register auxiliaries, then evaluate the requirement set
    ///
    /// Registration failures are logged and do not stop evaluation.
    pub fn declare_requirements(
        &self,
        registry: &dyn RecipeRegistry,
    ) -> Result<(RequirementSet, Vec<(String, Registration)>)> {
        let registrations = self.register_auxiliaries(registry);
        for (reference, outcome) in &registrations {
            if !outcome.is_registered() {
                warn!("{}: {}", reference, outcome);
            }
        }

        let requirements = self.requirements()?;
        info!(
            "{} requires {} package(s)",
            self.descriptor.reference(),
            requirements.len()
        );
        Ok((requirements, registrations))
    }

    /// Compute the option blocks pushed down to dependencies
    pub fn configure(
        &self,
        requirements: &RequirementSet,
        overrides: &[DependencyOverride],
    ) -> DependencyOptions {
        configure_options(&self.descriptor, requirements, overrides)
    }

    /// Stage resolved dependency outputs under `output_root`
    ///
    /// A descriptor without a `[staging]` table uses the default
    /// multi-config layout into `bin`.
    pub fn generate(&self, graph: &ResolvedGraph, output_root: &Path) -> Result<StagingReport> {
        let requirements = self.requirements()?;
        let missing = graph.unresolved(&requirements);
        if !missing.is_empty() {
            warn!(
                "Resolved graph is missing required package(s): {}",
                missing.join(", ")
            );
        }

        let default_section = StagingSection::default();
        let section = self.descriptor.staging.as_ref().unwrap_or(&default_section);
        stage(graph, section, &self.settings, output_root)
    }

    /// Fetch the pinned source
    pub fn fetch(&self, kitchen: &Kitchen) -> Result<FetchedSource> {
        kitchen.fetch(&self.descriptor, &self.settings)
    }

    /// Fetch, unpack and build into `work_dir/build`
    ///
    /// Returns the build directory.
    pub fn build(&self, kitchen: &Kitchen, work_dir: &Path) -> Result<PathBuf> {
        if self.descriptor.source.is_none() {
            return Err(Error::NotFound(format!(
                "{} is not a packaging descriptor (no [source])",
                self.descriptor.reference()
            )));
        }

        let work_dir = std::path::absolute(work_dir)?;
        let fetched = self.fetch(kitchen)?;
        let source_dir = kitchen.unpack(&fetched, &work_dir)?;
        let build_dir = work_dir.join("build");
        kitchen.build(&self.descriptor, &self.settings, &source_dir, &build_dir)?;
        Ok(build_dir)
    }

    /// Copy artifacts from `build_dir` into `package_dir`
    pub fn package(
        &self,
        kitchen: &Kitchen,
        build_dir: &Path,
        package_dir: &Path,
    ) -> Result<PackageResult> {
        kitchen.package(&self.descriptor, &self.settings, build_dir, package_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ResolvedDependency;
    use crate::registry::LocalRegistry;
    use crate::settings::{Arch, Os};
    use std::fs;
    use tempfile::TempDir;

    const DESCRIPTOR: &str = r#"
[package]
name = "oblo"
version = "0.1.0"

[settings]
os = ["windows", "linux"]

[options]
with_dotnet = true

[[requires]]
name = "sdl"
version = "2.30.7"

[[requires]]
name = "dotnet"
version = "9.0.4"
when = "with_dotnet"

[dependency_options.dotnet]
runtime_only = true

[[auxiliary]]
name = "dotnet"
version = "9.0.4"
path = "dotnet"
when = "with_dotnet"
"#;

    fn write_descriptor(dir: &Path) -> PathBuf {
        let path = dir.join("recipe.toml");
        fs::write(&path, DESCRIPTOR).unwrap();
        fs::create_dir_all(dir.join("dotnet")).unwrap();
        fs::write(dir.join("dotnet/recipe.toml"), "[package]\n").unwrap();
        path
    }

    fn linux() -> Settings {
        Settings::new(Os::Linux, Arch::X86_64, "gcc", "Release")
    }

    #[test]
    fn test_load_and_requirements() {
        let tmp = TempDir::new().unwrap();
        let path = write_descriptor(tmp.path());

        let run = Invocation::load(&path, None, linux(), &[]).unwrap();
        assert_eq!(run.base_dir(), tmp.path());
        assert!(run.mismatches().is_empty());
        assert_eq!(run.requirements().unwrap().names(), vec!["sdl", "dotnet"]);

        let run = Invocation::load(&path, None, linux(), &["with_dotnet=False".into()]).unwrap();
        let reqs = run.requirements().unwrap();
        assert_eq!(reqs.names(), vec!["sdl"]);
        assert!(run.configure(&reqs, &[]).is_empty());
    }

    #[test]
    fn test_mismatch_reported() {
        let tmp = TempDir::new().unwrap();
        let path = write_descriptor(tmp.path());
        let mac = Settings::new(Os::Macos, Arch::Armv8, "apple-clang", "Release");

        let run = Invocation::load(&path, None, mac, &[]).unwrap();
        assert_eq!(run.mismatches().len(), 1);
    }

    #[test]
    fn test_declare_registers_auxiliaries() {
        let tmp = TempDir::new().unwrap();
        let path = write_descriptor(tmp.path());
        let registry = LocalRegistry::new(tmp.path().join("cache"));

        let run = Invocation::load(&path, None, linux(), &[]).unwrap();
        let (reqs, registrations) = run.declare_requirements(&registry).unwrap();

        assert_eq!(reqs.len(), 2);
        assert_eq!(
            registrations,
            vec![("dotnet/9.0.4".to_string(), Registration::Exported)]
        );
        assert!(registry.is_known("dotnet", "9.0.4").unwrap());
    }

    #[test]
    fn test_disabled_auxiliary_is_not_registered() {
        let tmp = TempDir::new().unwrap();
        let path = write_descriptor(tmp.path());
        let registry = LocalRegistry::new(tmp.path().join("cache"));

        let run = Invocation::load(&path, None, linux(), &["with_dotnet=false".into()]).unwrap();
        let (reqs, registrations) = run.declare_requirements(&registry).unwrap();

        assert_eq!(reqs.names(), vec!["sdl"]);
        assert!(registrations.is_empty());
        assert!(!registry.is_known("dotnet", "9.0.4").unwrap());
    }

    #[test]
    fn test_declare_survives_failed_registration() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("recipe.toml");
        fs::write(&path, DESCRIPTOR).unwrap();
        let registry = LocalRegistry::new(tmp.path().join("cache"));

        let run = Invocation::load(&path, None, linux(), &[]).unwrap();
        let (reqs, registrations) = run.declare_requirements(&registry).unwrap();

        assert_eq!(reqs.len(), 2);
        assert!(!registrations[0].1.is_registered());
    }

    #[test]
    fn test_generate_default_layout() {
        let tmp = TempDir::new().unwrap();
        let path = write_descriptor(tmp.path());
        let lib = tmp.path().join("sdl/lib");
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("libSDL2.so"), "sdl").unwrap();

        let mut sdl = ResolvedDependency::new("sdl", "2.30.7");
        sdl.lib_dirs.push(lib);
        let mut graph = ResolvedGraph::new();
        graph.insert(sdl);

        let run = Invocation::load(&path, None, linux(), &["with_dotnet=false".into()]).unwrap();
        let out = tmp.path().join("build");
        let report = run.generate(&graph, &out).unwrap();

        assert_eq!(report.files.len(), 2);
        assert!(out.join("bin/Release/libSDL2.so").is_file());
        assert!(out.join("bin/RelWithDebInfo/libSDL2.so").is_file());
    }

    #[test]
    fn test_build_requires_source() {
        let tmp = TempDir::new().unwrap();
        let path = write_descriptor(tmp.path());
        let run = Invocation::load(&path, None, linux(), &[]).unwrap();

        let err = run.build(&Kitchen::with_defaults(), tmp.path()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_unknown_version() {
        let tmp = TempDir::new().unwrap();
        let path = write_descriptor(tmp.path());
        assert!(Invocation::load(&path, Some("9.9.9"), linux(), &[]).is_err());
    }
}
