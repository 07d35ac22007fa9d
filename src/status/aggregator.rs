//! The ecosystem status aggregator.
//!
//! An [`Aggregator`] is built once at startup with its configuration, a
//! [`Probe`] and a [`DeployStrategy`], then shared as `Arc<Aggregator>`
//! between the probe loop and the HTTP handlers.
//!
//! Locks are plain `std::sync::RwLock`s and are never held across an
//! `.await`, so [`Aggregator::snapshot`] never waits on network I/O.

use crate::config::Config;
use crate::deploy::DeployStrategy;
use crate::discovery::{Discoverer, DiscoveryWarning};
use crate::error::QueryError;
use crate::models::{
    Component, ComponentKind, DeployAck, EcosystemSnapshot, Event, EventKind, HealthStatus,
    ServiceReport, ServiceState,
};
use crate::probe::Probe;
use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Buffered events per push-channel listener before it starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Whether `initialize()` has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Uninitialized,
    Running,
}

pub struct Aggregator {
    config: Config,
    probe: Arc<dyn Probe>,
    deployer: Arc<dyn DeployStrategy>,
    /// `None` until `initialize()` has run.
    inventory: RwLock<Option<Vec<Component>>>,
    health: RwLock<HealthStatus>,
    events: broadcast::Sender<Event>,
    started: Instant,
}

impl Aggregator {
    pub fn new(config: Config, probe: Arc<dyn Probe>, deployer: Arc<dyn DeployStrategy>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            config,
            probe,
            deployer,
            inventory: RwLock::new(None),
            health: RwLock::new(HealthStatus::new()),
            events,
            started: Instant::now(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        let inventory = self.inventory.read().unwrap_or_else(PoisonError::into_inner);
        if inventory.is_some() {
            LifecycleState::Running
        } else {
            LifecycleState::Uninitialized
        }
    }

    /// Build the component inventory from the configured roots.
    ///
    /// Never fails: unreadable roots are logged and returned as warnings,
    /// and the inventory holds whatever could be read.
    pub fn initialize(&self) -> Vec<DiscoveryWarning> {
        let discovery =
            Discoverer::new(&self.config.discovery, &self.config.values).discover();

        if !discovery.is_complete() {
            warn!(
                "Inventory is partial: {} discovery warning(s)",
                discovery.warnings.len()
            );
        }
        info!("Inventory holds {} components", discovery.components.len());

        let mut inventory = self.inventory.write().unwrap_or_else(PoisonError::into_inner);
        *inventory = Some(discovery.components);

        discovery.warnings
    }

    /// Probe every configured endpoint once, concurrently.
    ///
    /// Each endpoint's entry is replaced as soon as its own probe finishes.
    /// Returns the states observed by this cycle.
    pub async fn probe_all(&self) -> HealthStatus {
        let checks = self.config.services.iter().map(|endpoint| async move {
            let state = match self.probe.check(endpoint).await {
                Ok(report) => {
                    debug!(
                        "{} online ({} in {:?})",
                        endpoint.name, report.status_code, report.latency
                    );
                    ServiceState::Online
                }
                Err(e) => {
                    debug!("{} offline: {}", endpoint.name, e);
                    ServiceState::Offline
                }
            };
            self.record(&endpoint.name, state);
            (endpoint.name.clone(), state)
        });

        let cycle: HealthStatus = join_all(checks).await.into_iter().collect();

        let online = cycle
            .values()
            .filter(|s| **s == ServiceState::Online)
            .count();
        info!("Probe cycle: {}/{} services online", online, cycle.len());

        cycle
    }

    /// Replace one HealthStatus entry, notifying on an online/offline flip.
    fn record(&self, name: &str, state: ServiceState) {
        let previous = {
            let mut health = self.health.write().unwrap_or_else(PoisonError::into_inner);
            health.insert(name.to_string(), state)
        };

        if let Some(previous) = previous {
            if previous != state {
                info!("Service {} is now {}", name, state);
                self.notify(Event::now(EventKind::Service, name, state.to_string()));
            }
        }
    }

    /// Probe immediately, then every `interval` until the process exits.
    ///
    /// Each cycle runs in its own task, so a cycle slower than `interval`
    /// overlaps the next one; the later write wins per entry.
    pub fn schedule_probing(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let aggregator = Arc::clone(self);
        info!("Probing {} services every {:?}", aggregator.config.services.len(), interval);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let cycle = Arc::clone(&aggregator);
                tokio::spawn(async move {
                    cycle.probe_all().await;
                });
            }
        })
    }

    /// Current inventory; empty before `initialize()`.
    pub fn components(&self) -> Vec<Component> {
        let inventory = self.inventory.read().unwrap_or_else(PoisonError::into_inner);
        inventory.clone().unwrap_or_default()
    }

    /// Copy of the HealthStatus table.
    pub fn health(&self) -> HealthStatus {
        self.health
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn snapshot(&self) -> EcosystemSnapshot {
        let (component_count, repository_count) = {
            let inventory = self.inventory.read().unwrap_or_else(PoisonError::into_inner);
            let components = inventory.as_deref().unwrap_or_default();
            let repositories = components
                .iter()
                .filter(|c| c.kind == ComponentKind::Repository)
                .count();
            (components.len(), repositories)
        };
        let services = self.health();
        let services_online = services
            .values()
            .filter(|s| **s == ServiceState::Online)
            .count();

        EcosystemSnapshot {
            total_value: self.config.values.total.clone(),
            component_count,
            repository_count,
            integrated_folder_count: component_count - repository_count,
            service_count: self.config.services.len(),
            services_online,
            services,
            uptime_seconds: self.uptime().as_secs(),
            timestamp: Utc::now(),
        }
    }

    /// Push an event to every current listener. Returns how many got it.
    ///
    /// Listeners that subscribe later never see it.
    pub fn notify(&self, event: Event) -> usize {
        self.events.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Acknowledge a deployment request and run the strategy in the background.
    ///
    /// The name is not checked against the inventory.
    pub fn deploy(self: &Arc<Self>, component: &str) -> DeployAck {
        let aggregator = Arc::clone(self);
        let name = component.to_string();
        info!("Deployment requested for {}", name);

        tokio::spawn(async move {
            let outcome = aggregator.deployer.deploy(&name).await;
            info!("Deployment of {}: {}", name, outcome);
            aggregator.notify(Event::now(EventKind::Deployment, name, outcome.status()));
        });

        DeployAck::accepted(component)
    }

    /// Query one service live, bypassing the HealthStatus table.
    pub async fn query_service(&self, name: &str) -> Result<ServiceReport, QueryError> {
        let endpoint = self
            .config
            .services
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| QueryError::UnknownService(name.to_string()))?;

        let report = self
            .probe
            .check(endpoint)
            .await
            .map_err(|source| QueryError::Upstream {
                service: name.to_string(),
                source,
            })?;

        Ok(ServiceReport {
            name: endpoint.name.clone(),
            url: report.url,
            status: ServiceState::Online,
            status_code: report.status_code,
            latency_ms: report.latency.as_millis() as u64,
            body: report.body,
        })
    }
}
