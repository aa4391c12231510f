//! Configuration types and parsing for caravan.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main migration configuration from caravan.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationConfig {
    /// Project name
    pub name: String,

    /// Source platform endpoint
    pub source: EndpointConfig,

    /// Target platform endpoint
    pub target: EndpointConfig,

    /// Output directory for run artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// External tool commands
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Polling for long-running remote operations
    #[serde(default)]
    pub poll: PollConfig,
}

/// One platform endpoint plus its credential indirection.
///
/// Credentials never live in the config file; the config names the
/// environment variable that holds the access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// Endpoint URL or server name
    pub endpoint: String,

    /// Environment variable holding the access credential
    #[serde(default)]
    pub credential_env: Option<String>,
}

impl EndpointConfig {
    /// Resolve the credential from the configured environment variable.
    pub fn credential(&self) -> Option<String> {
        self.credential_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
    }
}

/// Commands for the external collaborator tools
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Catalog query tool
    #[serde(default = "default_catalog_cmd")]
    pub catalog: String,

    /// Schema extraction tool
    #[serde(default = "default_extract_cmd")]
    pub extract: String,

    /// Package build tool
    #[serde(default = "default_build_cmd")]
    pub build: String,

    /// Deployment tool
    #[serde(default = "default_deploy_cmd")]
    pub deploy: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog_cmd(),
            extract: default_extract_cmd(),
            build: default_build_cmd(),
            deploy: default_deploy_cmd(),
        }
    }
}

/// Polling cadence for long-running remote operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollConfig {
    /// Seconds between status probes
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,

    /// Wall-clock timeout in seconds before the operation counts as failed
    #[serde(default = "default_poll_timeout")]
    pub timeout_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval(),
            timeout_secs: default_poll_timeout(),
        }
    }
}

impl PollConfig {
    /// Interval as a [`Duration`]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl MigrationConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: MigrationConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "'name' must not be empty".into(),
            });
        }
        if self.source.endpoint.is_empty() || self.target.endpoint.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "source and target endpoints must not be empty".into(),
            });
        }
        if self.poll.interval_secs == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "'poll.interval_secs' must be at least 1".into(),
            });
        }
        Ok(())
    }
}

fn default_output_dir() -> String {
    "runs".to_string()
}

fn default_catalog_cmd() -> String {
    "wh-catalog".to_string()
}

fn default_extract_cmd() -> String {
    "wh-extract".to_string()
}

fn default_build_cmd() -> String {
    "wh-build".to_string()
}

fn default_deploy_cmd() -> String {
    "wh-deploy".to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_poll_timeout() -> u64 {
    600
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
