//! Status report generation for one-shot mode.
//!
//! Renders a snapshot, the inventory and any discovery warnings as
//! Markdown or JSON.

use crate::discovery::DiscoveryWarning;
use crate::models::{Component, ComponentKind, EcosystemSnapshot, ServiceState};
use anyhow::Result;
use serde::Serialize;

/// Everything a one-shot run observed.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub snapshot: EcosystemSnapshot,
    pub components: Vec<Component>,
    pub warnings: Vec<DiscoveryWarning>,
}

impl StatusReport {
    /// Services that were offline in this report.
    pub fn offline_services(&self) -> Vec<&str> {
        self.snapshot
            .services
            .iter()
            .filter(|(_, state)| **state == ServiceState::Offline)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &StatusReport) -> String {
    let mut output = String::new();

    output.push_str("# Ecosystem Status Report\n\n");
    output.push_str(&generate_metadata_section(&report.snapshot));
    output.push_str(&generate_services_section(&report.snapshot));
    output.push_str(&generate_inventory_section(&report.components));
    output.push_str(&generate_warnings_section(&report.warnings));

    output
}

fn generate_metadata_section(snapshot: &EcosystemSnapshot) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Declared Value:** {}\n", snapshot.total_value));
    section.push_str(&format!(
        "- **Components:** {} ({} repositories, {} integrated folders)\n",
        snapshot.component_count, snapshot.repository_count, snapshot.integrated_folder_count
    ));
    section.push_str(&format!(
        "- **Services Online:** {}/{}\n",
        snapshot.services_online, snapshot.service_count
    ));
    section.push('\n');

    section
}

fn generate_services_section(snapshot: &EcosystemSnapshot) -> String {
    let mut section = String::new();

    section.push_str("## Services\n\n");

    if snapshot.services.is_empty() {
        section.push_str("No services configured.\n\n");
        return section;
    }

    section.push_str("| Service | Status |\n");
    section.push_str("|:---|:---:|\n");
    for (name, state) in &snapshot.services {
        section.push_str(&format!("| {} | {} {} |\n", name, state.emoji(), state));
    }
    section.push('\n');

    section
}

fn generate_inventory_section(components: &[Component]) -> String {
    let mut section = String::new();

    section.push_str("## Inventory\n\n");

    if components.is_empty() {
        section.push_str("No components discovered.\n\n");
        return section;
    }

    section.push_str("| Component | Type | Value | Status |\n");
    section.push_str("|:---|:---|:---:|:---:|\n");

    // Repositories first, then integrated folders; discovery order within each.
    let ordered = components
        .iter()
        .filter(|c| c.kind == ComponentKind::Repository)
        .chain(
            components
                .iter()
                .filter(|c| c.kind == ComponentKind::IntegratedFolder),
        );
    for component in ordered {
        section.push_str(&format!(
            "| `{}` | {} | {} | {} |\n",
            component.name, component.kind, component.value, component.status
        ));
    }
    section.push('\n');

    section
}

fn generate_warnings_section(warnings: &[DiscoveryWarning]) -> String {
    if warnings.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Discovery Warnings\n\n");
    for warning in warnings {
        section.push_str(&format!("- ⚠️ {}\n", warning.message));
    }
    section.push('\n');

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &StatusReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
