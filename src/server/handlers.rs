//! Request/response handlers.

use crate::error::QueryError;
use crate::models::{Component, DeployAck, EcosystemSnapshot, HealthStatus, ServiceReport};
use crate::status::Aggregator;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub async fn root(State(aggregator): State<Arc<Aggregator>>) -> Json<Value> {
    Json(json!({
        "service": aggregator.config().server.service_name,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "description": env!("CARGO_PKG_DESCRIPTION"),
    }))
}

pub async fn health(State(aggregator): State<Arc<Aggregator>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": aggregator.config().server.service_name,
        "state": aggregator.state(),
    }))
}

pub async fn status(State(aggregator): State<Arc<Aggregator>>) -> Json<EcosystemSnapshot> {
    Json(aggregator.snapshot())
}

pub async fn repositories(State(aggregator): State<Arc<Aggregator>>) -> Json<Vec<Component>> {
    Json(aggregator.components())
}

pub async fn services(State(aggregator): State<Arc<Aggregator>>) -> Json<HealthStatus> {
    Json(aggregator.health())
}

/// Live query of one service; 404 for unknown names, 502 when it fails.
pub async fn service_detail(
    State(aggregator): State<Arc<Aggregator>>,
    Path(name): Path<String>,
) -> Result<Json<ServiceReport>, QueryError> {
    debug!("Live query for {}", name);
    aggregator.query_service(&name).await.map(Json)
}

/// Always acknowledges; the outcome arrives later as a `deployment` event.
pub async fn deploy(
    State(aggregator): State<Arc<Aggregator>>,
    Path(component): Path<String>,
) -> Json<DeployAck> {
    Json(aggregator.deploy(&component))
}
