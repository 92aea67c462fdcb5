// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: descriptor file
fn descriptor_arg() -> Arg {
    Arg::new("descriptor")
        .required(true)
        .value_name("PATH")
        .help("Path to the descriptor file")
}

/// Common arguments: descriptor version, options and settings
fn invocation_args() -> Vec<Arg> {
    vec![
        descriptor_arg(),
        Arg::new("recipe_version")
            .long("recipe-version")
            .help("Descriptor version to instantiate"),
        Arg::new("option")
            .short('o')
            .long("option")
            .action(ArgAction::Append)
            .help("Override one of the descriptor's own options (key=value)"),
        Arg::new("os").long("os").help("Target OS (default: host)"),
        Arg::new("arch").long("arch").help("Target architecture (default: host)"),
        Arg::new("compiler").long("compiler").help("Compiler name"),
        Arg::new("build_type")
            .long("build-type")
            .default_value("Release")
            .help("Build type (Debug or Release)"),
    ]
}

fn build_cli() -> Command {
    Command::new("oblo-recipes")
        .version(env!("CARGO_PKG_VERSION"))
        .author("oblo contributors")
        .about("Evaluate oblo dependency descriptors and stage their outputs")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .arg(Arg::new("config").long("config").help("Configuration file"))
        .subcommand(
            Command::new("validate")
                .about("Parse and validate descriptors")
                .arg(
                    Arg::new("descriptors")
                        .required(true)
                        .action(ArgAction::Append)
                        .help("Descriptor files"),
                )
                .arg(
                    Arg::new("all_versions")
                        .long("all-versions")
                        .action(ArgAction::SetTrue)
                        .help("Also validate every version overlay"),
                ),
        )
        .subcommand(
            Command::new("versions")
                .about("List the versions a descriptor can be instantiated at")
                .arg(descriptor_arg()),
        )
        .subcommand(
            Command::new("requires")
                .about("Register auxiliary descriptors and print the requirement set")
                .args(invocation_args())
                .arg(
                    Arg::new("registry")
                        .long("registry")
                        .value_parser(["command", "local"])
                        .help("Registry to export auxiliary descriptors into"),
                )
                .arg(
                    Arg::new("no_register")
                        .long("no-register")
                        .action(ArgAction::SetTrue)
                        .help("Skip auxiliary registration"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print as JSON"),
                ),
        )
        .subcommand(
            Command::new("options")
                .about("Print the option blocks pushed down to dependencies")
                .args(invocation_args())
                .arg(
                    Arg::new("dependency_option")
                        .short('d')
                        .long("dependency-option")
                        .action(ArgAction::Append)
                        .help("Override a dependency option (dep:key=value)"),
                )
                .arg(
                    Arg::new("as_args")
                        .long("as-args")
                        .action(ArgAction::SetTrue)
                        .help("Print as package-manager arguments"),
                ),
        )
        .subcommand(
            Command::new("stage")
                .about("Copy resolved outputs into the runnable tree")
                .args(invocation_args())
                .arg(
                    Arg::new("graph")
                        .long("graph")
                        .required(true)
                        .help("Resolved graph JSON written by the package manager"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .default_value(".")
                        .help("Build output root"),
                ),
        )
        .subcommand(
            Command::new("fetch")
                .about("Download or check out the pinned source")
                .args(invocation_args())
                .arg(Arg::new("source_cache").long("source-cache").help("Source cache directory")),
        )
        .subcommand(
            Command::new("build")
                .about("Fetch, unpack and build a packaging descriptor")
                .args(invocation_args())
                .arg(Arg::new("source_cache").long("source-cache").help("Source cache directory"))
                .arg(
                    Arg::new("work_dir")
                        .long("work-dir")
                        .default_value("work")
                        .help("Work directory for the source and build tree"),
                )
                .arg(
                    Arg::new("package_dir")
                        .long("package-dir")
                        .help("Also package into this directory"),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help("Number of parallel jobs"),
                ),
        )
        .subcommand(
            Command::new("package")
                .about("Copy artifacts from a build tree into a package folder")
                .args(invocation_args())
                .arg(Arg::new("build_dir").long("build-dir").required(true).help("Build tree"))
                .arg(
                    Arg::new("package_dir")
                        .long("package-dir")
                        .required(true)
                        .help("Package folder to write"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("oblo-recipes.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
