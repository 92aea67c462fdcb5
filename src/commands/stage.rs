// src/commands/stage.rs

//! Stage command - copy resolved outputs into the runnable tree

use anyhow::{Context, Result};
use oblo_recipes::{Invocation, ResolvedGraph};
use std::path::Path;
use tracing::info;

/// Stage the resolved graph below `output`
///
/// # Arguments
/// * `invocation` - Descriptor bound to this run's settings
/// * `graph_path` - Resolved graph JSON written by the package manager
/// * `output` - Build output root; the staging destination is created below it
pub fn cmd_stage(invocation: &Invocation, graph_path: &Path, output: &Path) -> Result<()> {
    let graph = ResolvedGraph::load(graph_path)
        .with_context(|| format!("Failed to read resolved graph: {}", graph_path.display()))?;

    println!(
        "Staging {} resolved package(s) for {}",
        graph.len(),
        invocation.settings()
    );

    let report = invocation
        .generate(&graph, output)
        .with_context(|| format!("Failed to stage {}", invocation.descriptor().reference()))?;

    for destination in &report.destinations {
        let files = report.files_in(destination);
        println!("  {} ({} file(s))", destination.display(), files.len());
    }

    for (dependency, dir) in &report.skipped {
        println!("  skipped output dir {} of {}", dir.display(), dependency);
    }

    info!(
        "Staged {} file(s) for {}",
        report.files.len(),
        invocation.descriptor().reference()
    );

    println!("\n[COMPLETE] Staged {} file(s)", report.files.len());
    Ok(())
}
