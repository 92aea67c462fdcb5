// tests/common/mod.rs

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use oblo_recipes::graph::{ResolvedComponent, ResolvedDependency, ResolvedGraph};
use oblo_recipes::settings::{Arch, Os, Settings};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Linux settings with the given build type.
pub fn linux(build_type: &str) -> Settings {
    Settings::new(Os::Linux, Arch::X86_64, "gcc", build_type)
}

/// Windows settings with the given build type.
pub fn windows(build_type: &str) -> Settings {
    Settings::new(Os::Windows, Arch::X86_64, "msvc", build_type)
}

/// Write `files` (relative path, content) below `root`.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let target = root.join(path);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(target, content).unwrap();
    }
}

/// Every file below `root` as (relative path, content), sorted.
pub fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    if !root.exists() {
        return Vec::new();
    }
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            (
                e.path().strip_prefix(root).unwrap().to_path_buf(),
                fs::read(e.path()).unwrap(),
            )
        })
        .collect()
}

/// Immediate subdirectories of `dir`, sorted by name.
pub fn subdirs(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().unwrap().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// A package folder for a plain library with shared objects in `lib/`.
pub fn library(root: &Path, name: &str, version: &str, libs: &[&str]) -> ResolvedDependency {
    let folder = root.join("pkgs").join(name);
    let files: Vec<(String, String)> = libs
        .iter()
        .map(|l| (format!("lib/{}", l), format!("{} {}", name, l)))
        .collect();
    let borrowed: Vec<(&str, &str)> = files.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    write_tree(&folder, &borrowed);

    let mut dep = ResolvedDependency::new(name, version);
    dep.package_folder = Some(folder.clone());
    dep.lib_dirs.push(folder.join("lib"));
    dep
}

/// A resolved .NET runtime with host and runtime components.
pub fn dotnet(root: &Path, version: &str) -> ResolvedDependency {
    let folder = root.join("pkgs").join("dotnet");
    let host = format!("host/fxr/{}", version);
    let runtime = format!("shared/Microsoft.NETCore.App/{}", version);
    write_tree(
        &folder,
        &[
            (&format!("{}/libhostfxr.so", host), "hostfxr"),
            (&format!("{}/libcoreclr.so", runtime), "coreclr"),
            (&format!("{}/System.Runtime.dll", runtime), "corelib"),
            (&format!("{}/Microsoft.NETCore.App.deps.json", runtime), "{}"),
        ],
    );

    let mut components = BTreeMap::new();
    components.insert(
        "host".to_string(),
        ResolvedComponent {
            bin_dirs: vec![folder.join(&host)],
            ..Default::default()
        },
    );
    components.insert(
        "runtime".to_string(),
        ResolvedComponent {
            bin_dirs: vec![folder.join(&runtime)],
            ..Default::default()
        },
    );

    let mut dep = ResolvedDependency::new("dotnet", version);
    dep.package_folder = Some(folder);
    dep.components = components;
    dep
}

/// Build a graph from dependencies.
pub fn graph(deps: Vec<ResolvedDependency>) -> ResolvedGraph {
    let mut graph = ResolvedGraph::new();
    for dep in deps {
        graph.insert(dep);
    }
    graph
}
