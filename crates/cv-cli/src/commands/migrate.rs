//! Migrate command implementation
//!
//! Drives the full pipeline once per warehouse, in the order produced by
//! the sequencer: extract -> classify/rewrite -> package -> (optional)
//! deploy. Warehouses are handled strictly one at a time — cross-warehouse
//! references are the whole reason the order exists, so the loop is not a
//! candidate for parallelism.

use anyhow::{Context, Result};
use cv_core::{
    DependencyGraph, ObjectCategory, ObjectScript, RunContext, WarehouseName,
};
use cv_sql::{variable_name, ReferenceRewriter, RewriteOutcome};
use cv_tools::{
    read_snapshot, CatalogClient, CliToolchain, Deployer, ItemKind, PackageBuilder,
    SchemaExtractor, ToolError,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{
    discover_graph, load_config, report_cycles, write_json_results, CommandResults, ExitCode,
    StageStatus,
};

/// Per-warehouse result recorded in the run summary
#[derive(Debug, Clone, Serialize)]
struct WarehouseOutcome {
    warehouse: String,
    status: StageStatus,
    objects: usize,
    security_held: usize,
    variables: Vec<String>,
    deployed: bool,
}

/// Required-variables manifest written next to each warehouse's package
#[derive(Debug, Serialize)]
struct VariablesManifest {
    warehouse: String,
    variables: Vec<String>,
    defaults: BTreeMap<String, String>,
}

/// Counts from writing one warehouse's source tree
#[derive(Debug, Default, Clone, Copy)]
struct TreeCounts {
    buildable: usize,
    held: usize,
}

/// Execute the migrate command
pub async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let start_time = Instant::now();
    let config = load_config(global)?;
    let toolchain = CliToolchain::new(&config);

    let (_seed, graph) = discover_graph(&args.seed, &toolchain, global).await?;

    // Cycles are reported in full and abort before any extraction: there is
    // no processing order to run.
    let cycles = graph.find_cycles();
    if !cycles.is_empty() {
        report_cycles(&cycles);
        return Err(ExitCode(1).into());
    }

    let order = graph.sequence().context("Failed to sequence warehouses")?;
    let names: Vec<&str> = order.iter().map(|w| w.as_str()).collect();
    println!("Processing order: {}", names.join(" -> "));

    let ctx = RunContext::create(Path::new(&config.output_dir), args.force_refresh)
        .context("Failed to create run directory")?;
    println!("Run {} -> {}", ctx.run_id, ctx.root.display());

    let mut results: Vec<WarehouseOutcome> = Vec::new();
    for warehouse in &order {
        println!("\nMigrating {warehouse} ({}/{})", results.len() + 1, order.len());

        match migrate_one(warehouse, &graph, &ctx, &toolchain, args, global).await {
            Ok(outcome) => results.push(outcome),
            Err(e) => {
                // Fatal for the whole run: the remaining warehouses in the
                // order are never attempted.
                results.push(WarehouseOutcome {
                    warehouse: warehouse.to_string(),
                    status: StageStatus::Error,
                    objects: 0,
                    security_held: 0,
                    variables: Vec::new(),
                    deployed: false,
                });
                write_summary(&ctx, &results, start_time)?;
                return Err(e.context(format!("Migration failed at {warehouse}")));
            }
        }
    }

    write_summary(&ctx, &results, start_time)?;
    println!(
        "\nCompleted: {} warehouse(s) in {}ms",
        order.len(),
        start_time.elapsed().as_millis()
    );
    Ok(())
}

/// Run the extract/rewrite/package/deploy stages for one warehouse.
async fn migrate_one(
    warehouse: &WarehouseName,
    graph: &DependencyGraph,
    ctx: &RunContext,
    toolchain: &CliToolchain,
    args: &MigrateArgs,
    global: &GlobalArgs,
) -> Result<WarehouseOutcome> {
    // Extraction is cached per run: one snapshot per warehouse under the
    // shared run timestamp, re-used unless --force-refresh is set.
    let snapshot_path = ctx.snapshot_path(warehouse);
    if snapshot_path.exists() && !ctx.force_refresh {
        println!("  Extraction skipped (snapshot cached)");
    } else {
        println!("  Extracting schema snapshot...");
        toolchain
            .extract(warehouse, &snapshot_path)
            .await
            .with_context(|| format!("Extraction failed for {warehouse}"))?;
    }

    let snapshot = read_snapshot(&snapshot_path)
        .with_context(|| format!("Unreadable snapshot for {warehouse}"))?;
    println!("  {} object(s) extracted", snapshot.objects.len());

    // Classify and rewrite every object with this warehouse as the owner.
    let rewriter = ReferenceRewriter::new(warehouse.as_str());
    let mut referenced: Vec<String> = Vec::new();
    let mut scripts: Vec<ObjectScript> = Vec::with_capacity(snapshot.objects.len());
    for raw in snapshot.objects {
        let RewriteOutcome { text, referenced: refs } = rewriter.rewrite(&raw.definition);
        for reference in &refs {
            if !referenced.iter().any(|r| r.eq_ignore_ascii_case(reference)) {
                referenced.push(reference.clone());
            }
        }
        scripts.push(ObjectScript::from_raw(raw, text, refs));
    }
    if !referenced.is_empty() {
        println!("  Cross-warehouse references: {}", referenced.join(", "));
    }
    if global.verbose {
        let rewritten = scripts.iter().filter(|s| !s.references.is_empty()).count();
        eprintln!("[verbose] {rewritten} object(s) carry cross-warehouse references");
    }

    let counts = write_source_tree(
        &ctx.source_dir(warehouse),
        &ctx.security_dir(warehouse),
        &scripts,
    )
    .with_context(|| format!("Failed to write source tree for {warehouse}"))?;
    println!(
        "  {} object(s) written, {} security object(s) held",
        counts.buildable, counts.held
    );

    // One deployment variable per referenced warehouse; the default value
    // is the literal warehouse name.
    let variables: Vec<String> = referenced.iter().map(|w| variable_name(w)).collect();
    let defaults: BTreeMap<String, String> = referenced
        .iter()
        .map(|w| (variable_name(w), w.clone()))
        .collect();
    write_json_results(
        &ctx.variables_path(warehouse),
        &VariablesManifest {
            warehouse: warehouse.to_string(),
            variables: variables.clone(),
            defaults: defaults.clone(),
        },
    )?;

    println!("  Building deployable package...");
    let artifact = ctx.artifact_path(warehouse);
    let dependency_artifacts: Vec<PathBuf> = graph
        .dependencies(warehouse)
        .iter()
        .map(|dep| ctx.artifact_path(dep))
        .collect();
    toolchain
        .build(
            &ctx.source_dir(warehouse),
            &artifact,
            &variables,
            &dependency_artifacts,
        )
        .await
        .with_context(|| format!("Package build failed for {warehouse}"))?;
    if !artifact.exists() {
        return Err(ToolError::MissingArtifact {
            path: artifact.display().to_string(),
        }
        .into());
    }
    if global.verbose {
        eprintln!("[verbose] Built {}", artifact.display());
    }

    let mut deployed = false;
    if args.deploy {
        let kind = toolchain
            .item_kind(warehouse)
            .await
            .with_context(|| format!("Could not resolve target item kind for {warehouse}"))?;
        let exclude_tables = kind == ItemKind::VirtualizedEndpoint;
        if exclude_tables {
            println!("  Target is a virtualized endpoint; base tables withheld");
        }

        // The refresh is best-effort: a stale target catalog degrades the
        // deployment experience but does not invalidate it.
        if !args.skip_refresh {
            if let Err(e) = toolchain.refresh_metadata(warehouse).await {
                log::warn!("Metadata refresh for {warehouse} did not complete: {e}");
            }
        }

        println!("  Deploying to target...");
        toolchain
            .deploy(&artifact, warehouse, &defaults, exclude_tables)
            .await
            .with_context(|| format!("Deployment failed for {warehouse}"))?;
        deployed = true;
        println!("  \u{2713} Deployed {warehouse}");
    }

    Ok(WarehouseOutcome {
        warehouse: warehouse.to_string(),
        status: StageStatus::Success,
        objects: counts.buildable + counts.held,
        security_held: counts.held,
        variables,
        deployed,
    })
}

/// Write one warehouse's classified, rewritten scripts to disk.
///
/// Tables land first so constraints have a file to append to; constraints
/// whose parent table is missing from the snapshot fall back to a
/// Constraints folder. Security objects go to the holding area outside the
/// buildable tree.
fn write_source_tree(
    src: &Path,
    security: &Path,
    scripts: &[ObjectScript],
) -> Result<TreeCounts> {
    let mut counts = TreeCounts::default();
    let mut table_files: HashMap<(String, String), PathBuf> = HashMap::new();

    for script in scripts
        .iter()
        .filter(|s| s.category == ObjectCategory::Table)
    {
        let path = write_routed(src, &script.schema, script.category.folder(), &script.name, &script.definition)?;
        table_files.insert(
            (script.schema.to_lowercase(), script.name.to_lowercase()),
            path,
        );
        counts.buildable += 1;
    }

    for script in scripts
        .iter()
        .filter(|s| s.category == ObjectCategory::Constraint)
    {
        let parent = script
            .parent_table
            .as_ref()
            .map(|t| (script.schema.to_lowercase(), t.to_lowercase()))
            .and_then(|key| table_files.get(&key));
        match parent {
            Some(table_path) => {
                let mut file = fs::OpenOptions::new()
                    .append(true)
                    .open(table_path)
                    .with_context(|| format!("Failed to open {}", table_path.display()))?;
                write!(file, "\nGO\n\n{}", script.definition)
                    .with_context(|| format!("Failed to append to {}", table_path.display()))?;
            }
            None => {
                write_routed(src, &script.schema, script.category.folder(), &script.name, &script.definition)?;
            }
        }
        counts.buildable += 1;
    }

    for script in scripts.iter().filter(|s| {
        s.category != ObjectCategory::Table && s.category != ObjectCategory::Constraint
    }) {
        if script.category.is_buildable() {
            write_routed(src, &script.schema, script.category.folder(), &script.name, &script.definition)?;
            counts.buildable += 1;
        } else {
            fs::create_dir_all(security)
                .with_context(|| format!("Failed to create {}", security.display()))?;
            let path = security.join(format!("{}.{}.sql", script.schema, script.name));
            fs::write(&path, &script.definition)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            counts.held += 1;
        }
    }

    Ok(counts)
}

/// Write one script under `src/<schema>/<folder>/<name>.sql`.
fn write_routed(
    src: &Path,
    schema: &str,
    folder: &str,
    name: &str,
    definition: &str,
) -> Result<PathBuf> {
    let dir = src.join(schema).join(folder);
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(format!("{name}.sql"));
    fs::write(&path, definition).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Write the run summary JSON to the run root.
fn write_summary(
    ctx: &RunContext,
    results: &[WarehouseOutcome],
    start_time: Instant,
) -> Result<()> {
    let failure_count = results
        .iter()
        .filter(|r| matches!(r.status, StageStatus::Error))
        .count();
    let summary = CommandResults {
        timestamp: ctx.started_at,
        elapsed_secs: start_time.elapsed().as_secs_f64(),
        success_count: results.len() - failure_count,
        failure_count,
        results: results.to_vec(),
    };
    write_json_results(&ctx.summary_path(), &summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_core::RawObject;
    use tempfile::tempdir;

    fn script(schema: &str, name: &str, object_type: &str, definition: &str) -> ObjectScript {
        ObjectScript::from_raw(
            RawObject {
                schema: schema.into(),
                name: name.into(),
                object_type: object_type.into(),
                definition: definition.into(),
                parent_table: None,
            },
            definition.into(),
            Vec::new(),
        )
    }

    fn constraint(schema: &str, name: &str, parent: &str, definition: &str) -> ObjectScript {
        ObjectScript::from_raw(
            RawObject {
                schema: schema.into(),
                name: name.into(),
                object_type: "ForeignKeyConstraint".into(),
                definition: definition.into(),
                parent_table: Some(parent.into()),
            },
            definition.into(),
            Vec::new(),
        )
    }

    #[test]
    fn test_write_source_tree_routes_by_category() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let security = dir.path().join("Security");

        let scripts = vec![
            script("dbo", "Orders", "Table", "CREATE TABLE dbo.Orders (id INT)"),
            script("dbo", "v_orders", "View", "CREATE VIEW dbo.v_orders AS SELECT 1"),
            script("dbo", "analyst", "User", "CREATE USER analyst"),
        ];

        let counts = write_source_tree(&src, &security, &scripts).unwrap();
        assert_eq!(counts.buildable, 2);
        assert_eq!(counts.held, 1);

        assert!(src.join("dbo").join("Tables").join("Orders.sql").is_file());
        assert!(src.join("dbo").join("Views").join("v_orders.sql").is_file());
        assert!(security.join("dbo.analyst.sql").is_file());
    }

    #[test]
    fn test_constraint_appends_to_parent_table() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let security = dir.path().join("Security");

        let scripts = vec![
            script("dbo", "Orders", "Table", "CREATE TABLE dbo.Orders (id INT)"),
            constraint(
                "dbo",
                "FK_Orders",
                "Orders",
                "ALTER TABLE dbo.Orders ADD CONSTRAINT FK_Orders FOREIGN KEY (id) REFERENCES dbo.C (id)",
            ),
        ];

        write_source_tree(&src, &security, &scripts).unwrap();

        let content =
            fs::read_to_string(src.join("dbo").join("Tables").join("Orders.sql")).unwrap();
        assert!(content.starts_with("CREATE TABLE dbo.Orders"));
        assert!(content.contains("\nGO\n\n"));
        assert!(content.contains("ADD CONSTRAINT FK_Orders"));
    }

    #[test]
    fn test_orphan_constraint_falls_back_to_folder() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let security = dir.path().join("Security");

        let scripts = vec![constraint(
            "dbo",
            "FK_Ghost",
            "Ghost",
            "ALTER TABLE dbo.Ghost ADD CONSTRAINT FK_Ghost ...",
        )];

        let counts = write_source_tree(&src, &security, &scripts).unwrap();
        assert_eq!(counts.buildable, 1);
        assert!(src
            .join("dbo")
            .join("Constraints")
            .join("FK_Ghost.sql")
            .is_file());
    }

    #[test]
    fn test_parent_table_lookup_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let security = dir.path().join("Security");

        let scripts = vec![
            script("dbo", "Orders", "Table", "CREATE TABLE dbo.Orders (id INT)"),
            constraint("DBO", "PK_Orders", "ORDERS", "ALTER TABLE ..."),
        ];

        write_source_tree(&src, &security, &scripts).unwrap();

        let content =
            fs::read_to_string(src.join("dbo").join("Tables").join("Orders.sql")).unwrap();
        assert!(content.contains("PK_Orders"));
        assert!(!src.join("DBO").join("Constraints").exists());
    }
}
