//! Deployment strategies.
//!
//! `POST /api/deploy/{component}` hands the component name to a
//! [`DeployStrategy`] in the background. The only strategy shipped is
//! [`SimulatedDeploy`], which performs no action: it waits a fixed delay and
//! reports success.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::time::Duration;
use tracing::info;

/// Result of a deployment attempt, reported through a `deployment` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Deployed,
    #[allow(dead_code)] // Returned by non-simulated strategies
    Failed(String),
}

impl DeployOutcome {
    /// Status label carried by the notification event.
    pub fn status(&self) -> &str {
        match self {
            DeployOutcome::Deployed => "deployed",
            DeployOutcome::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for DeployOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployOutcome::Deployed => write!(f, "deployed"),
            DeployOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Something that can deploy a component by name.
pub trait DeployStrategy: Send + Sync {
    fn deploy<'a>(&'a self, component: &'a str) -> BoxFuture<'a, DeployOutcome>;
}

/// Placeholder strategy: sleeps, then reports `Deployed`.
#[derive(Debug, Clone)]
pub struct SimulatedDeploy {
    delay: Duration,
}

impl SimulatedDeploy {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl DeployStrategy for SimulatedDeploy {
    fn deploy<'a>(&'a self, component: &'a str) -> BoxFuture<'a, DeployOutcome> {
        async move {
            info!("Simulating deployment of {} ({:?})", component, self.delay);
            tokio::time::sleep(self.delay).await;
            DeployOutcome::Deployed
        }
        .boxed()
    }
}
