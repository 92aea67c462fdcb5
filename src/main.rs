// src/main.rs

use anyhow::Result;
use clap::Parser;
use oblo_recipes::config::ToolConfig;

mod cli;
mod commands;

use cli::{Cli, Commands, DescriptorArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ToolConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate {
            descriptors,
            all_versions,
        } => commands::cmd_validate(&descriptors, all_versions),

        Commands::Versions { descriptor } => commands::cmd_versions(&descriptor),

        Commands::Requires {
            args,
            registry,
            no_register,
            json,
        } => {
            let invocation = load(&args)?;
            if no_register {
                return commands::cmd_requires(&invocation, None, json);
            }

            let registry = config.registry_for(registry.unwrap_or(config.registry.mode));
            commands::cmd_requires(&invocation, Some(registry.as_ref()), json)
        }

        Commands::Options {
            args,
            dependency_options,
            as_args,
        } => {
            let invocation = load(&args)?;
            commands::cmd_options(&invocation, &dependency_options, as_args)
        }

        Commands::Stage {
            args,
            graph,
            output,
        } => {
            let invocation = load(&args)?;
            commands::cmd_stage(&invocation, &graph, &output)
        }

        Commands::Fetch { args, source_cache } => {
            let invocation = load(&args)?;
            let kitchen = commands::with_overrides(config.kitchen_config(), source_cache, None);
            commands::cmd_fetch(&invocation, kitchen)
        }

        Commands::Build {
            args,
            source_cache,
            work_dir,
            package_dir,
            jobs,
        } => {
            let invocation = load(&args)?;
            let kitchen = commands::with_overrides(config.kitchen_config(), source_cache, jobs);
            commands::cmd_build(&invocation, kitchen, &work_dir, package_dir.as_deref())
        }

        Commands::Package {
            args,
            build_dir,
            package_dir,
        } => {
            let invocation = load(&args)?;
            commands::cmd_package(&invocation, config.kitchen_config(), &build_dir, &package_dir)
        }

        Commands::Completions { shell } => commands::cmd_completions(shell),
    }
}

fn load(args: &DescriptorArgs) -> Result<oblo_recipes::Invocation> {
    commands::load_invocation(
        &args.descriptor,
        args.recipe_version.as_deref(),
        args.settings.to_settings(),
        &args.options,
    )
}
