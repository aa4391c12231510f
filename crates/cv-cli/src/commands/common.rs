//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use cv_core::graph::render_cycle;
use cv_core::{Cycle, DependencyGraph, MigrationConfig, WarehouseName};
use cv_tools::CatalogClient;
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: ExitCode is a control-flow mechanism, not a
        // user-facing error. If anyhow's Display chain ever reaches this
        // (e.g. downcast_ref fails in main.rs), we don't want "exit code N"
        // leaking into stderr.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Status for per-warehouse pipeline stages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum StageStatus {
    Success,
    Error,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageStatus::Success => write!(f, "success"),
            StageStatus::Error => write!(f, "error"),
        }
    }
}

/// Load the migration configuration named by the global CLI arguments.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<MigrationConfig> {
    MigrationConfig::load(Path::new(&global.config)).context("Failed to load config")
}

/// Run catalog-driven discovery from a seed warehouse argument.
pub(crate) async fn discover_graph(
    seed: &str,
    catalog: &dyn CatalogClient,
    global: &GlobalArgs,
) -> Result<(WarehouseName, DependencyGraph)> {
    let seed = WarehouseName::try_new(seed)
        .ok_or_else(|| anyhow::anyhow!("Seed warehouse name must not be empty"))?;

    println!("Analyzing cross-warehouse references from {seed}...");
    let graph = cv_tools::build_graph(&seed, catalog).await;

    if global.verbose {
        eprintln!("[verbose] Discovered {} warehouse(s)", graph.len());
    }

    Ok((seed, graph))
}

/// Print every discovered cycle, one path per line.
pub(crate) fn report_cycles(cycles: &[Cycle]) {
    println!(
        "Circular references detected; no processing order exists for {} cycle(s):",
        cycles.len()
    );
    for cycle in cycles {
        println!("  {}", render_cycle(cycle));
    }
}

/// Generic wrapper for command results written to JSON.
///
/// Commands that produce a JSON summary share the same envelope: a
/// timestamp, elapsed seconds, success/failure counts, and a vec of
/// per-item results.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CommandResults<T: Serialize> {
    pub timestamp: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub success_count: usize,
    pub failure_count: usize,
    pub results: Vec<T>,
}

/// Serialize `data` as pretty-printed JSON and write it to `path`.
///
/// Creates any missing parent directories before writing.
pub(crate) fn write_json_results<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    let json = serde_json::to_string_pretty(data).context("Failed to serialize results")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Table-printing utilities
// ---------------------------------------------------------------------------

/// Calculate column widths for a table given headers and row data.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a formatted table to stdout.
///
/// Calculates column widths from `headers` and `rows`, then prints a
/// left-aligned header row, a separator line of dashes, and each data row.
/// Columns are separated by two spaces.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  "));

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  "));
    }
}
