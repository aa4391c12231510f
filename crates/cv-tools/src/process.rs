//! Process-spawning implementation of the external tool boundaries
//!
//! Each boundary shells out to a configured command-line tool. Tools
//! signal success through their exit status; structured data comes back on
//! stdout (JSON for the catalog reference query, plain tokens elsewhere).
//! Credentials are handed to the child process through the
//! `CARAVAN_CREDENTIAL` environment variable, never on the command line.

use crate::error::{ToolError, ToolResult};
use crate::poll::poll_until;
use crate::traits::{CatalogClient, Deployer, ItemKind, PackageBuilder, SchemaExtractor};
use async_trait::async_trait;
use cv_core::{EndpointConfig, MigrationConfig, PollConfig, ToolsConfig, WarehouseName};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Environment variable the child tools read their access token from
const CREDENTIAL_ENV: &str = "CARAVAN_CREDENTIAL";

/// External toolchain driven through child processes
pub struct CliToolchain {
    tools: ToolsConfig,
    source: EndpointConfig,
    target: EndpointConfig,
    poll: PollConfig,
}

impl CliToolchain {
    /// Create a toolchain from the migration configuration.
    pub fn new(config: &MigrationConfig) -> Self {
        Self {
            tools: config.tools.clone(),
            source: config.source.clone(),
            target: config.target.clone(),
            poll: config.poll.clone(),
        }
    }

    /// Run one tool to completion, returning its stdout.
    async fn run_tool(
        &self,
        tool: &str,
        args: &[String],
        credential: Option<String>,
    ) -> ToolResult<String> {
        log::debug!("Running {tool} {}", args.join(" "));

        let mut cmd = Command::new(tool);
        cmd.args(args);
        if let Some(cred) = credential {
            cmd.env(CREDENTIAL_ENV, cred);
        }

        let output = cmd.output().await.map_err(|e| ToolError::SpawnFailed {
            tool: tool.to_string(),
            source: e,
        })?;

        if !output.status.success() {
            return Err(ToolError::CommandFailed {
                tool: tool.to_string(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Probe a remote operation once. `Ok(None)` means still running.
    async fn operation_status(&self, operation_id: &str) -> ToolResult<Option<()>> {
        let stdout = self
            .run_tool(
                &self.tools.catalog,
                &operation_status_args(&self.target.endpoint, operation_id),
                self.target.credential(),
            )
            .await?;

        match stdout.trim().to_ascii_lowercase().as_str() {
            "queued" | "running" => Ok(None),
            "succeeded" => Ok(Some(())),
            "failed" => Err(ToolError::OperationFailed {
                operation: format!("operation {operation_id}"),
                message: "remote status: failed".into(),
            }),
            other => Err(ToolError::MalformedOutput {
                tool: self.tools.catalog.clone(),
                message: format!("unexpected operation status '{other}'"),
            }),
        }
    }
}

#[async_trait]
impl CatalogClient for CliToolchain {
    async fn referenced_warehouses(
        &self,
        warehouse: &WarehouseName,
    ) -> ToolResult<BTreeSet<WarehouseName>> {
        let stdout = self
            .run_tool(
                &self.tools.catalog,
                &refs_args(&self.source.endpoint, warehouse),
                self.source.credential(),
            )
            .await
            .map_err(|e| ToolError::Catalog {
                warehouse: warehouse.to_string(),
                message: e.to_string(),
            })?;

        let names: Vec<String> =
            serde_json::from_str(&stdout).map_err(|e| ToolError::MalformedOutput {
                tool: self.tools.catalog.clone(),
                message: format!("reference list is not a JSON string array: {e}"),
            })?;

        Ok(names.into_iter().filter_map(WarehouseName::try_new).collect())
    }

    async fn item_kind(&self, item: &WarehouseName) -> ToolResult<ItemKind> {
        let stdout = self
            .run_tool(
                &self.tools.catalog,
                &kind_args(&self.target.endpoint, item),
                self.target.credential(),
            )
            .await?;

        match stdout.trim().to_ascii_lowercase().as_str() {
            "warehouse" => Ok(ItemKind::Warehouse),
            "virtualized-endpoint" => Ok(ItemKind::VirtualizedEndpoint),
            other => Err(ToolError::MalformedOutput {
                tool: self.tools.catalog.clone(),
                message: format!("unknown item kind '{other}'"),
            }),
        }
    }

    async fn refresh_metadata(&self, warehouse: &WarehouseName) -> ToolResult<()> {
        let stdout = self
            .run_tool(
                &self.tools.catalog,
                &refresh_args(&self.target.endpoint, warehouse),
                self.target.credential(),
            )
            .await?;

        let operation_id = stdout.trim().to_string();
        if operation_id.is_empty() {
            return Err(ToolError::MalformedOutput {
                tool: self.tools.catalog.clone(),
                message: "refresh did not return an operation id".into(),
            });
        }

        poll_until(
            &format!("metadata refresh for {warehouse}"),
            self.poll.interval(),
            self.poll.timeout(),
            || self.operation_status(&operation_id),
        )
        .await
    }
}

#[async_trait]
impl SchemaExtractor for CliToolchain {
    async fn extract(&self, warehouse: &WarehouseName, dest: &Path) -> ToolResult<()> {
        self.run_tool(
            &self.tools.extract,
            &extract_args(&self.source.endpoint, warehouse, dest),
            self.source.credential(),
        )
        .await?;

        if !dest.exists() {
            return Err(ToolError::MissingArtifact {
                path: dest.display().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PackageBuilder for CliToolchain {
    async fn build(
        &self,
        source_dir: &Path,
        artifact: &Path,
        variables: &[String],
        references: &[PathBuf],
    ) -> ToolResult<()> {
        self.run_tool(
            &self.tools.build,
            &build_args(source_dir, artifact, variables, references),
            None,
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Deployer for CliToolchain {
    async fn deploy(
        &self,
        artifact: &Path,
        item: &WarehouseName,
        variables: &BTreeMap<String, String>,
        exclude_tables: bool,
    ) -> ToolResult<()> {
        self.run_tool(
            &self.tools.deploy,
            &deploy_args(&self.target.endpoint, item, artifact, variables, exclude_tables),
            self.target.credential(),
        )
        .await?;
        Ok(())
    }
}

fn refs_args(endpoint: &str, warehouse: &WarehouseName) -> Vec<String> {
    vec![
        "refs".into(),
        "--endpoint".into(),
        endpoint.to_string(),
        "--warehouse".into(),
        warehouse.to_string(),
    ]
}

fn kind_args(endpoint: &str, item: &WarehouseName) -> Vec<String> {
    vec![
        "kind".into(),
        "--endpoint".into(),
        endpoint.to_string(),
        "--name".into(),
        item.to_string(),
    ]
}

fn refresh_args(endpoint: &str, warehouse: &WarehouseName) -> Vec<String> {
    vec![
        "refresh".into(),
        "--endpoint".into(),
        endpoint.to_string(),
        "--warehouse".into(),
        warehouse.to_string(),
    ]
}

fn operation_status_args(endpoint: &str, operation_id: &str) -> Vec<String> {
    vec![
        "operation-status".into(),
        "--endpoint".into(),
        endpoint.to_string(),
        "--id".into(),
        operation_id.to_string(),
    ]
}

fn extract_args(endpoint: &str, warehouse: &WarehouseName, dest: &Path) -> Vec<String> {
    vec![
        "--endpoint".into(),
        endpoint.to_string(),
        "--warehouse".into(),
        warehouse.to_string(),
        "--out".into(),
        dest.display().to_string(),
    ]
}

fn build_args(
    source_dir: &Path,
    artifact: &Path,
    variables: &[String],
    references: &[PathBuf],
) -> Vec<String> {
    let mut args = vec![
        "--src".into(),
        source_dir.display().to_string(),
        "--out".into(),
        artifact.display().to_string(),
    ];
    for variable in variables {
        args.push("--variable".into());
        args.push(variable.clone());
    }
    for reference in references {
        args.push("--reference".into());
        args.push(reference.display().to_string());
    }
    args
}

fn deploy_args(
    endpoint: &str,
    item: &WarehouseName,
    artifact: &Path,
    variables: &BTreeMap<String, String>,
    exclude_tables: bool,
) -> Vec<String> {
    let mut args = vec![
        "--endpoint".into(),
        endpoint.to_string(),
        "--item".into(),
        item.to_string(),
        "--artifact".into(),
        artifact.display().to_string(),
    ];
    for (name, value) in variables {
        args.push("--set".into());
        args.push(format!("{name}={value}"));
    }
    if exclude_tables {
        args.push("--exclude-tables".into());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wn(s: &str) -> WarehouseName {
        WarehouseName::new(s)
    }

    #[test]
    fn test_build_args_layout() {
        let args = build_args(
            Path::new("/runs/x/Sales/src"),
            Path::new("/runs/x/Sales/Sales.bundle"),
            &["Finance_ref".to_string()],
            &[PathBuf::from("/runs/x/Finance/Finance.bundle")],
        );

        assert_eq!(
            args,
            vec![
                "--src",
                "/runs/x/Sales/src",
                "--out",
                "/runs/x/Sales/Sales.bundle",
                "--variable",
                "Finance_ref",
                "--reference",
                "/runs/x/Finance/Finance.bundle",
            ]
        );
    }

    #[test]
    fn test_deploy_args_bind_one_value_per_variable() {
        let mut variables = BTreeMap::new();
        variables.insert("Sales_ref".to_string(), "Sales".to_string());
        variables.insert("Finance_ref".to_string(), "Finance".to_string());

        let args = deploy_args(
            "target.example.net",
            &wn("Inventory"),
            Path::new("Inventory.bundle"),
            &variables,
            false,
        );

        assert!(args.contains(&"--set".to_string()));
        assert!(args.contains(&"Finance_ref=Finance".to_string()));
        assert!(args.contains(&"Sales_ref=Sales".to_string()));
        assert!(!args.contains(&"--exclude-tables".to_string()));
    }

    #[test]
    fn test_deploy_args_exclude_tables_for_virtualized_targets() {
        let args = deploy_args(
            "target.example.net",
            &wn("Inventory"),
            Path::new("Inventory.bundle"),
            &BTreeMap::new(),
            true,
        );

        assert_eq!(args.last().map(String::as_str), Some("--exclude-tables"));
    }

    #[test]
    fn test_refs_args_name_the_warehouse() {
        let args = refs_args("source.example.net", &wn("Sales"));
        assert_eq!(args[0], "refs");
        assert!(args.contains(&"Sales".to_string()));
    }
}
