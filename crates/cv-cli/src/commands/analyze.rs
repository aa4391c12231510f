//! Analyze command implementation
//!
//! Discovery, cycle check, and sequencing without touching any warehouse:
//! the read-only half of the pipeline.

use anyhow::{Context, Result};
use cv_tools::CliToolchain;
use serde::Serialize;

use crate::cli::{AnalyzeArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{
    discover_graph, load_config, print_table, report_cycles, ExitCode,
};

/// Per-warehouse entry in the JSON report
#[derive(Debug, Serialize)]
struct AnalyzeEntry {
    position: usize,
    warehouse: String,
    dependencies: Vec<String>,
}

/// JSON report for the analyze command
#[derive(Debug, Serialize)]
struct AnalyzeReport {
    seed: String,
    warehouse_count: usize,
    order: Vec<AnalyzeEntry>,
}

/// Execute the analyze command
pub async fn execute(args: &AnalyzeArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let toolchain = CliToolchain::new(&config);

    let (seed, graph) = discover_graph(&args.seed, &toolchain, global).await?;

    let cycles = graph.find_cycles();
    if !cycles.is_empty() {
        report_cycles(&cycles);
        return Err(ExitCode(1).into());
    }

    let order = graph
        .sequence()
        .context("Failed to sequence warehouses")?;

    let entries: Vec<AnalyzeEntry> = order
        .iter()
        .enumerate()
        .map(|(i, warehouse)| AnalyzeEntry {
            position: i + 1,
            warehouse: warehouse.to_string(),
            dependencies: graph
                .dependencies(warehouse)
                .iter()
                .map(|d| d.to_string())
                .collect(),
        })
        .collect();

    match args.output {
        OutputFormat::Json => {
            let report = AnalyzeReport {
                seed: seed.to_string(),
                warehouse_count: entries.len(),
                order: entries,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            println!();
            let rows: Vec<Vec<String>> = entries
                .iter()
                .map(|e| {
                    vec![
                        e.position.to_string(),
                        e.warehouse.clone(),
                        e.dependencies.join(", "),
                    ]
                })
                .collect();
            print_table(&["#", "WAREHOUSE", "DEPENDS ON"], &rows);
            println!();
            println!("{} warehouse(s), no circular references", entries.len());
        }
    }

    Ok(())
}
