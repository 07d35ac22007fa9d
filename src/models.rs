//! Data models for the ecosystem status aggregator.
//!
//! This module contains the core data structures shared by discovery,
//! probing, the aggregator and the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Kind of a discovered component, decided by the root it was found under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    /// A standalone repository.
    Repository,
    /// A folder integrated into the ecosystem.
    IntegratedFolder,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Repository => write!(f, "repository"),
            ComponentKind::IntegratedFolder => write!(f, "integrated-folder"),
        }
    }
}

/// A named unit of the inventory (one discovered directory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Directory name.
    pub name: String,
    /// Full path of the directory.
    pub path: PathBuf,
    /// Which root the directory came from.
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    /// Cosmetic declared value label (e.g. "$20B").
    pub value: String,
    /// Cosmetic status label.
    pub status: String,
}

/// A service whose liveness is probed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    /// Unique service name, used as the HealthStatus key.
    pub name: String,
    /// Base URL, without the health path.
    pub base_url: String,
}

impl ServiceEndpoint {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
        }
    }

    /// Join the base URL with a path, tolerating a trailing slash on either side.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.is_empty() {
            return base.to_string();
        }
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Liveness of a single service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Online,
    Offline,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceState::Online => write!(f, "online"),
            ServiceState::Offline => write!(f, "offline"),
        }
    }
}

impl ServiceState {
    /// Returns an emoji representation of the state.
    pub fn emoji(&self) -> &'static str {
        match self {
            ServiceState::Online => "🟢",
            ServiceState::Offline => "🔴",
        }
    }
}

/// Service name → last observed state. A missing key means "unknown".
pub type HealthStatus = BTreeMap<String, ServiceState>;

/// Point-in-time aggregation of inventory, service health and process metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcosystemSnapshot {
    /// Declared total value label.
    pub total_value: String,
    /// Number of discovered components.
    pub component_count: usize,
    /// Components discovered under repository roots.
    pub repository_count: usize,
    /// Components discovered under integrated-folder roots.
    pub integrated_folder_count: usize,
    /// Number of configured service endpoints.
    pub service_count: usize,
    /// Services currently reported online.
    pub services_online: usize,
    /// Copy of the HealthStatus table.
    pub services: HealthStatus,
    /// Seconds since the aggregator was constructed.
    pub uptime_seconds: u64,
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
}

/// Kind of a pushed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Sent once to every new push-channel client.
    Welcome,
    /// Outcome of a deployment request.
    Deployment,
    /// A service changed between online and offline.
    Service,
}

/// Structured event delivered over the push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub subject: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Creates an event stamped with the current time.
    pub fn now(kind: EventKind, subject: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            status: status.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn welcome(service: &str) -> Self {
        Self::now(EventKind::Welcome, service, "connected")
    }
}

/// Immediate response to a deployment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployAck {
    pub status: String,
    pub component: String,
    pub message: String,
}

impl DeployAck {
    pub fn accepted(component: &str) -> Self {
        Self {
            status: "accepted".to_string(),
            component: component.to_string(),
            message: format!("Deployment of {} initiated", component),
        }
    }
}

/// Result of a live, uncached query against one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceReport {
    pub name: String,
    pub url: String,
    pub status: ServiceState,
    pub status_code: u16,
    pub latency_ms: u64,
    /// JSON body returned by the service, if it sent one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}
