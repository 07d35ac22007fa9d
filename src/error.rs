//! Error taxonomy.
//!
//! Discovery and probe errors are recovered locally (logged, turned into
//! warnings or an "offline" state). Only query errors reach HTTP callers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// A configured discovery root could not be enumerated.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("discovery root does not exist: {}", .0.display())]
    Missing(PathBuf),

    #[error("discovery root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// A single liveness probe failed.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid service URL {0}")]
    InvalidUrl(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A live query forwarded to a service failed.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("service {service} failed: {source}")]
    Upstream {
        service: String,
        #[source]
        source: ProbeError,
    },
}

impl QueryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            QueryError::UnknownService(_) => StatusCode::NOT_FOUND,
            QueryError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let kind = match &self {
            QueryError::UnknownService(_) => "unknown_service",
            QueryError::Upstream { .. } => "upstream_error",
        };
        let body = json!({
            "error": kind,
            "message": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_status_codes() {
        assert_eq!(
            QueryError::UnknownService("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        let upstream = QueryError::Upstream {
            service: "x".into(),
            source: ProbeError::Status(500),
        };
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(upstream.to_string(), "service x failed: unexpected status 500");
    }

    #[test]
    fn test_discovery_error_message() {
        let err = DiscoveryError::Missing(PathBuf::from("/nope"));
        assert_eq!(err.to_string(), "discovery root does not exist: /nope");
    }
}
