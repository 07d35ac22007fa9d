//! Service liveness probing.
//!
//! The aggregator only sees the [`Probe`] trait, so tests can swap the
//! reqwest-backed [`HttpProbe`] for a scripted fake.

pub mod http;

use crate::error::ProbeError;
use crate::models::ServiceEndpoint;
use futures::future::BoxFuture;
use std::time::Duration;

pub use self::http::HttpProbe;

/// What a successful probe observed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    /// Full URL that was requested.
    pub url: String,
    pub status_code: u16,
    pub latency: Duration,
    /// Response body, if it parsed as JSON.
    pub body: Option<serde_json::Value>,
}

/// A single liveness check against one endpoint.
///
/// Implementations must treat every call independently: a failing endpoint
/// must not influence the outcome for any other.
pub trait Probe: Send + Sync {
    fn check<'a>(
        &'a self,
        endpoint: &'a ServiceEndpoint,
    ) -> BoxFuture<'a, Result<ProbeReport, ProbeError>>;
}
