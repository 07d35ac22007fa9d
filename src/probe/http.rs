//! HTTP liveness probe built on reqwest.

use crate::error::ProbeError;
use crate::models::ServiceEndpoint;
use crate::probe::{Probe, ProbeReport};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::time::{Duration, Instant};
use tracing::debug;

/// Issues `GET {base_url}{health_path}` with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    http_client: reqwest::Client,
    health_path: String,
    timeout_seconds: u64,
}

impl HttpProbe {
    /// Create a probe with its own connection pool.
    pub fn new(timeout_seconds: u64, health_path: impl Into<String>) -> Result<Self, ProbeError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("ecostatus/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            health_path: health_path.into(),
            timeout_seconds,
        })
    }

    async fn get(&self, endpoint: &ServiceEndpoint) -> Result<ProbeReport, ProbeError> {
        let url = endpoint.url_for(&self.health_path);
        let started = Instant::now();

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout(self.timeout_seconds)
            } else if e.is_builder() {
                ProbeError::InvalidUrl(url.clone())
            } else {
                ProbeError::Transport(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!("{} answered {}", url, status);
            return Err(ProbeError::Status(status.as_u16()));
        }

        // Health bodies are informational; a non-JSON body still means "online".
        let body = response.json::<serde_json::Value>().await.ok();

        Ok(ProbeReport {
            url,
            status_code: status.as_u16(),
            latency: started.elapsed(),
            body,
        })
    }
}

impl Probe for HttpProbe {
    fn check<'a>(
        &'a self,
        endpoint: &'a ServiceEndpoint,
    ) -> BoxFuture<'a, Result<ProbeReport, ProbeError>> {
        self.get(endpoint).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;

    /// Serve a tiny app on an ephemeral port and return its base URL.
    async fn spawn_service(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// An address nothing listens on.
    async fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_reachable_service_is_ok() {
        let app = Router::new().route(
            "/health",
            get(|| async { Json(json!({"status": "healthy"})) }),
        );
        let base = spawn_service(app).await;

        let probe = HttpProbe::new(5, "/health").unwrap();
        let report = probe
            .check(&ServiceEndpoint::new("a", base.clone()))
            .await
            .unwrap();

        assert_eq!(report.status_code, 200);
        assert_eq!(report.url, format!("{}/health", base));
        assert_eq!(report.body, Some(json!({"status": "healthy"})));
    }

    #[tokio::test]
    async fn test_plain_text_body_is_still_ok() {
        let app = Router::new().route("/health", get(|| async { "ok" }));
        let base = spawn_service(app).await;

        let probe = HttpProbe::new(5, "/health").unwrap();
        let report = probe.check(&ServiceEndpoint::new("a", base)).await.unwrap();
        assert!(report.body.is_none());
    }

    #[tokio::test]
    async fn test_error_status_is_failure() {
        let app = Router::new().route(
            "/health",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let base = spawn_service(app).await;

        let probe = HttpProbe::new(5, "/health").unwrap();
        let err = probe
            .check(&ServiceEndpoint::new("a", base))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Status(503)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_failure() {
        let base = closed_port_url().await;

        let probe = HttpProbe::new(5, "/health").unwrap();
        let result = probe.check(&ServiceEndpoint::new("b", base)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let app = Router::new().route(
            "/health",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        );
        let base = spawn_service(app).await;

        let probe = HttpProbe::new(1, "/health").unwrap();
        let err = probe
            .check(&ServiceEndpoint::new("slow", base))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Timeout(1)));
    }
}
