//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.ecostatus.toml` files.

use crate::models::{ComponentKind, ServiceEndpoint};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".ecostatus.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Inventory discovery settings.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Health probe settings.
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Deployment settings.
    #[serde(default)]
    pub deploy: DeployConfig,

    /// Declared value table.
    #[serde(default)]
    pub values: ValuesConfig,

    /// Service endpoints to probe.
    #[serde(default = "default_services")]
    pub services: Vec<ServiceEndpoint>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            discovery: DiscoveryConfig::default(),
            probe: ProbeConfig::default(),
            deploy: DeployConfig::default(),
            values: ValuesConfig::default(),
            services: default_services(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Name reported by `/`, `/health` and welcome events.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            service_name: default_service_name(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_service_name() -> String {
    "ecostatus".to_string()
}

/// One filesystem root enumerated at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootConfig {
    pub path: PathBuf,
    pub kind: ComponentKind,
}

/// Inventory discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Roots whose immediate subdirectories become components.
    #[serde(default = "default_roots")]
    pub roots: Vec<RootConfig>,

    /// Include directories whose name starts with a dot.
    #[serde(default)]
    pub include_hidden: bool,

    /// Status label given to every discovered component.
    #[serde(default = "default_component_status")]
    pub component_status: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            include_hidden: false,
            component_status: default_component_status(),
        }
    }
}

fn default_roots() -> Vec<RootConfig> {
    vec![
        RootConfig {
            path: PathBuf::from("repositories"),
            kind: ComponentKind::Repository,
        },
        RootConfig {
            path: PathBuf::from("integrated"),
            kind: ComponentKind::IntegratedFolder,
        },
    ]
}

fn default_component_status() -> String {
    "active".to_string()
}

/// Health probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Seconds between probe cycles.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_probe_timeout")]
    pub timeout_seconds: u64,

    /// Path appended to each service base URL.
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
            timeout_seconds: default_probe_timeout(),
            health_path: default_health_path(),
        }
    }
}

fn default_interval() -> u64 {
    30
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_health_path() -> String {
    "/health".to_string()
}

/// Deployment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Delay before the simulated deployment reports success.
    #[serde(default = "default_deploy_delay")]
    pub delay_seconds: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            delay_seconds: default_deploy_delay(),
        }
    }
}

fn default_deploy_delay() -> u64 {
    2
}

/// Declared value labels. Purely cosmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuesConfig {
    /// Label reported as the ecosystem total.
    #[serde(default = "default_total")]
    pub total: String,

    /// Label for components missing from the table.
    #[serde(default = "default_placeholder")]
    pub default: String,

    /// Component name → declared value.
    #[serde(default = "default_value_table")]
    pub table: BTreeMap<String, String>,
}

impl Default for ValuesConfig {
    fn default() -> Self {
        Self {
            total: default_total(),
            default: default_placeholder(),
            table: default_value_table(),
        }
    }
}

impl ValuesConfig {
    /// Declared value for a component name, falling back to the placeholder.
    pub fn lookup(&self, name: &str) -> &str {
        self.table
            .get(name)
            .map(String::as_str)
            .unwrap_or(&self.default)
    }
}

fn default_total() -> String {
    "$935B".to_string()
}

fn default_placeholder() -> String {
    "TBD".to_string()
}

fn default_value_table() -> BTreeMap<String, String> {
    [
        ("enterprise_platform", "$200B"),
        ("billionaire_consciousness", "$350B"),
        ("worldwidebro_integration", "$80B"),
        ("genix_bank_financial", "$40B"),
        ("ai_agent_ecosystem", "$20B"),
        ("mcp_integration_hub", "$15B"),
        ("autonomous_systems", "$50B"),
        ("security_system", "$20B"),
        ("devops_system", "$15B"),
        ("integration_system", "$30B"),
        ("frontend_system", "$20B"),
        ("backend_services", "$25B"),
        ("api_management", "$18B"),
        ("database_systems", "$12B"),
        ("business_intelligence", "$25B"),
        ("monitoring_system", "$8B"),
        ("reporting_system", "$7B"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_services() -> Vec<ServiceEndpoint> {
    vec![
        ServiceEndpoint::new("worldwidebro-holdings", "http://localhost:8000"),
        ServiceEndpoint::new("genix-bank", "http://localhost:8001"),
        ServiceEndpoint::new("agent-orchestrator", "http://localhost:8002"),
    ]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(interval) = args.interval {
            self.probe.interval_seconds = interval;
        }
        if let Some(timeout) = args.probe_timeout {
            self.probe.timeout_seconds = timeout;
        }
    }

    /// Check values that would make the service misbehave at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.probe.interval_seconds == 0 {
            anyhow::bail!("probe.interval_seconds must be at least 1");
        }
        if self.probe.timeout_seconds == 0 {
            anyhow::bail!("probe.timeout_seconds must be at least 1");
        }
        let mut names = HashSet::new();
        for service in &self.services {
            if !names.insert(service.name.as_str()) {
                anyhow::bail!("service '{}' is configured more than once", service.name);
            }
            if !service.base_url.starts_with("http://") && !service.base_url.starts_with("https://")
            {
                anyhow::bail!(
                    "service '{}' base_url must start with 'http://' or 'https://'",
                    service.name
                );
            }
        }
        Ok(())
    }

    /// Socket address string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
