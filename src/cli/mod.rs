// src/cli/mod.rs
//! CLI definitions for oblo-recipes
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! Descriptor evaluation:
//! - `validate` - Parse and check descriptors
//! - `versions` - List the versions a descriptor can be instantiated at
//! - `requires` - Register auxiliaries and print the requirement set
//! - `options` - Print option blocks pushed down to dependencies
//! - `stage` - Copy resolved outputs into the runnable tree
//!
//! Packaging descriptors:
//! - `fetch` - Download or check out the pinned source
//! - `build` - Fetch, unpack and run the build commands
//! - `package` - Copy artifacts and write consumption metadata

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use oblo_recipes::config::RegistryMode;
use oblo_recipes::settings::{default_compiler, Arch, Os, Settings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oblo-recipes")]
#[command(author = "oblo contributors")]
#[command(version)]
#[command(about = "Evaluate oblo dependency descriptors and stage their outputs", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: <config dir>/oblo-recipes/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// The settings record for one run
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// Target OS (default: host)
    #[arg(long)]
    pub os: Option<Os>,

    /// Target architecture (default: host)
    #[arg(long)]
    pub arch: Option<Arch>,

    /// Compiler name (default: the usual compiler for the OS)
    #[arg(long)]
    pub compiler: Option<String>,

    /// Build type
    #[arg(long, default_value = "Release")]
    pub build_type: String,
}

impl SettingsArgs {
    pub fn to_settings(&self) -> Settings {
        let os = self.os.unwrap_or_else(Os::host);
        let arch = self.arch.unwrap_or_else(Arch::host);
        let compiler = self
            .compiler
            .clone()
            .unwrap_or_else(|| default_compiler(os).to_string());
        Settings::new(os, arch, compiler, self.build_type.clone())
    }
}

/// Which descriptor to evaluate and with which options
#[derive(Args, Debug, Clone)]
pub struct DescriptorArgs {
    /// Path to the descriptor file
    pub descriptor: PathBuf,

    /// Descriptor version to instantiate (default: the base version)
    #[arg(long)]
    pub recipe_version: Option<String>,

    /// Override one of the descriptor's own options (key=value)
    #[arg(short = 'o', long = "option")]
    pub options: Vec<String>,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse and validate descriptors
    Validate {
        /// Descriptor files
        #[arg(required = true)]
        descriptors: Vec<PathBuf>,

        /// Also validate every version overlay
        #[arg(long)]
        all_versions: bool,
    },

    /// List the versions a descriptor can be instantiated at
    Versions {
        /// Path to the descriptor file
        descriptor: PathBuf,
    },

    /// Register auxiliary descriptors and print the requirement set
    Requires {
        #[command(flatten)]
        args: DescriptorArgs,

        /// Registry to export auxiliary descriptors into
        #[arg(long)]
        registry: Option<RegistryMode>,

        /// Skip auxiliary registration
        #[arg(long)]
        no_register: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the option blocks pushed down to dependencies
    Options {
        #[command(flatten)]
        args: DescriptorArgs,

        /// Override a dependency option (dep:key=value)
        #[arg(short = 'd', long = "dependency-option")]
        dependency_options: Vec<String>,

        /// Print as package-manager arguments instead of a table
        #[arg(long)]
        as_args: bool,
    },

    /// Copy resolved outputs into the runnable tree
    Stage {
        #[command(flatten)]
        args: DescriptorArgs,

        /// Resolved graph JSON written by the package manager
        #[arg(long)]
        graph: PathBuf,

        /// Build output root
        #[arg(long, default_value = ".")]
        output: PathBuf,
    },

    /// Download or check out the pinned source
    Fetch {
        #[command(flatten)]
        args: DescriptorArgs,

        /// Directory for cached sources
        #[arg(long)]
        source_cache: Option<PathBuf>,
    },

    /// Fetch, unpack and build a packaging descriptor
    Build {
        #[command(flatten)]
        args: DescriptorArgs,

        /// Directory for cached sources
        #[arg(long)]
        source_cache: Option<PathBuf>,

        /// Work directory for the unpacked source and build tree
        #[arg(long, default_value = "work")]
        work_dir: PathBuf,

        /// Also package into this directory after building
        #[arg(long)]
        package_dir: Option<PathBuf>,

        /// Number of parallel jobs
        #[arg(short, long)]
        jobs: Option<u32>,
    },

    /// Copy artifacts from a build tree into a package folder
    Package {
        #[command(flatten)]
        args: DescriptorArgs,

        /// Build tree to package from
        #[arg(long)]
        build_dir: PathBuf,

        /// Package folder to write
        #[arg(long)]
        package_dir: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}
