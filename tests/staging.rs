// tests/staging.rs

//! Staging of resolved outputs into multi-config and flat layouts.

mod common;

use common::*;
use oblo_recipes::recipe::{RuntimeStaging, StagingLayout, StagingSection};
use oblo_recipes::staging::stage;
use oblo_recipes::Error;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn dotnet_rule() -> RuntimeStaging {
    let mut components = BTreeMap::new();
    components.insert("host".to_string(), "dotnet/host/fxr/%(version)s".to_string());
    components.insert(
        "runtime".to_string(),
        "dotnet/shared/Microsoft.NETCore.App/%(version)s".to_string(),
    );
    RuntimeStaging {
        dependency: "dotnet".to_string(),
        components,
    }
}

fn editor_section() -> StagingSection {
    StagingSection {
        runtime: vec![dotnet_rule()],
        ..Default::default()
    }
}

#[test]
fn test_staging_twice_is_byte_identical() {
    let tmp = TempDir::new().unwrap();
    let graph = graph(vec![
        library(tmp.path(), "sdl", "2.30.7", &["libSDL2.so", "libSDL2-2.0.so.0"]),
        library(tmp.path(), "assimp", "5.4.3", &["libassimp.so.5", "libassimp.a"]),
        dotnet(tmp.path(), "9.0.4"),
    ]);
    let out = tmp.path().join("build");
    let section = editor_section();

    stage(&graph, &section, &linux("Release"), &out).unwrap();
    let first = snapshot(&out);

    stage(&graph, &section, &linux("Release"), &out).unwrap();
    let second = snapshot(&out);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_runtime_components_keep_their_layout() {
    let tmp = TempDir::new().unwrap();
    let graph = graph(vec![dotnet(tmp.path(), "9.0.4")]);
    let out = tmp.path().join("build");

    let report = stage(&graph, &editor_section(), &linux("Debug"), &out).unwrap();

    let debug = out.join("bin/Debug");
    assert_eq!(subdirs(&debug), vec!["dotnet"]);
    assert_eq!(subdirs(&debug.join("dotnet")), vec!["host", "shared"]);
    assert!(debug.join("dotnet/host/fxr/9.0.4/libhostfxr.so").is_file());
    assert!(debug
        .join("dotnet/shared/Microsoft.NETCore.App/9.0.4/libcoreclr.so")
        .is_file());
    assert!(debug
        .join("dotnet/shared/Microsoft.NETCore.App/9.0.4/Microsoft.NETCore.App.deps.json")
        .is_file());

    // Nothing flattened into the destination itself
    assert!(!debug.join("libhostfxr.so").exists());
    assert!(!debug.join("libcoreclr.so").exists());
    assert_eq!(report.files.len(), 4);
}

#[test]
fn test_empty_component_still_gets_its_directory() {
    let tmp = TempDir::new().unwrap();
    let mut dep = dotnet(tmp.path(), "9.0.4");
    dep.components.get_mut("host").unwrap().bin_dirs.clear();
    let graph = graph(vec![dep]);
    let out = tmp.path().join("build");

    stage(&graph, &editor_section(), &linux("Debug"), &out).unwrap();

    let host = out.join("bin/Debug/dotnet/host/fxr/9.0.4");
    assert!(host.is_dir());
    assert_eq!(fs::read_dir(host).unwrap().count(), 0);
}

#[test]
fn test_missing_component_aborts_before_copying() {
    let tmp = TempDir::new().unwrap();
    let mut dep = dotnet(tmp.path(), "9.0.4");
    dep.components.remove("runtime");
    let graph = graph(vec![
        library(tmp.path(), "sdl", "2.30.7", &["libSDL2.so"]),
        dep,
    ]);
    let out = tmp.path().join("build");

    let err = stage(&graph, &editor_section(), &linux("Release"), &out).unwrap_err();
    assert!(matches!(err, Error::NotFound(ref msg) if msg.contains("runtime")));
    assert!(snapshot(&out).is_empty());
}

#[test]
fn test_only_absolute_dirs_are_copied() {
    let tmp = TempDir::new().unwrap();
    let abs_lib = tmp.path().join("abs/lib");
    write_tree(&abs_lib, &[("libfoo.so", "abs")]);
    // Relative to the working directory; must never be read
    let rel_lib = PathBuf::from("rel/lib");

    let mut dep = oblo_recipes::ResolvedDependency::new("foo", "1.0");
    dep.lib_dirs = vec![abs_lib, rel_lib.clone()];
    let graph = graph(vec![dep]);
    let out = tmp.path().join("build");

    let report = stage(&graph, &StagingSection::default(), &linux("Debug"), &out).unwrap();

    assert_eq!(report.files.len(), 1);
    assert_eq!(fs::read_to_string(out.join("bin/Debug/libfoo.so")).unwrap(), "abs");
    assert_eq!(report.skipped, vec![("foo".to_string(), rel_lib)]);
}

#[test]
fn test_unknown_build_type_copies_nothing() {
    let tmp = TempDir::new().unwrap();
    let graph = graph(vec![
        library(tmp.path(), "sdl", "2.30.7", &["libSDL2.so"]),
        dotnet(tmp.path(), "9.0.4"),
    ]);
    let out = tmp.path().join("build");

    for build_type in ["MinSizeRel", "release", "RelWithDebInfo"] {
        let err = stage(&graph, &editor_section(), &linux(build_type), &out).unwrap_err();
        assert!(matches!(err, Error::UnsupportedBuildType(ref t) if t == build_type));
    }
    assert!(snapshot(&out).is_empty());

    let flat = StagingSection {
        layout: StagingLayout::Flat,
        ..Default::default()
    };
    assert!(stage(&graph, &flat, &linux("MinSizeRel"), &out).is_err());
    assert!(!out.exists());
}

#[test]
fn test_release_populates_both_configurations() {
    let tmp = TempDir::new().unwrap();
    let graph = graph(vec![
        library(tmp.path(), "sdl", "2.30.7", &["libSDL2.so"]),
        library(tmp.path(), "ktx", "4.3.2", &["libktx.so.4.3.2"]),
        dotnet(tmp.path(), "9.0.4"),
    ]);
    let out = tmp.path().join("build");

    let report = stage(&graph, &editor_section(), &linux("Release"), &out).unwrap();

    let release = snapshot(&out.join("bin/Release"));
    let relwithdebinfo = snapshot(&out.join("bin/RelWithDebInfo"));
    assert!(!release.is_empty());
    assert_eq!(release, relwithdebinfo);
    assert!(!out.join("bin/Debug").exists());
    assert_eq!(report.destinations.len(), 2);
}

#[test]
fn test_windows_patterns() {
    let tmp = TempDir::new().unwrap();
    let graph = graph(vec![library(
        tmp.path(),
        "sdl",
        "2.30.7",
        &["SDL2.dll", "SDL2.lib", "libSDL2.so"],
    )]);
    let out = tmp.path().join("build");

    stage(&graph, &StagingSection::default(), &windows("Debug"), &out).unwrap();

    let files: Vec<PathBuf> = snapshot(&out.join("bin/Debug")).into_iter().map(|(p, _)| p).collect();
    assert_eq!(files, vec![PathBuf::from("SDL2.dll")]);
}

#[test]
fn test_extra_patterns_and_flat_layout() {
    let tmp = TempDir::new().unwrap();
    let graph = graph(vec![library(
        tmp.path(),
        "glslang",
        "1.3.268.0",
        &["libglslang.so", "glslangValidator"],
    )]);
    let out = tmp.path().join("build");
    let section = StagingSection {
        layout: StagingLayout::Flat,
        destination: "runtime".to_string(),
        patterns: vec!["glslangValidator".to_string()],
        runtime: Vec::new(),
    };

    stage(&graph, &section, &linux("Release"), &out).unwrap();

    assert!(out.join("runtime/libglslang.so").is_file());
    assert!(out.join("runtime/glslangValidator").is_file());
    assert!(!out.join("runtime/Release").exists());
}

#[test]
fn test_output_dir_containing_destination_is_not_restaged() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("build");
    write_tree(
        &out,
        &[("libengine.so", "engine"), ("bin/Release/libengine.so", "stale")],
    );

    // The dependency points at the whole build tree, destination included
    let mut dep = oblo_recipes::ResolvedDependency::new("engine", "1.0");
    dep.lib_dirs.push(out.clone());

    let graph = graph(vec![dep]);
    stage(&graph, &editor_section(), &linux("Release"), &out).unwrap();
    let before = snapshot(&out);
    stage(&graph, &editor_section(), &linux("Release"), &out).unwrap();

    assert_eq!(snapshot(&out), before);
    assert_eq!(
        fs::read_to_string(out.join("bin/Release/libengine.so")).unwrap(),
        "engine"
    );
}

