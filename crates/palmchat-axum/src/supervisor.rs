//! Configuration-reactive service supervisor.
//!
//! The supervisor consumes a live stream of settings snapshots and
//! guarantees that at most one [`ServiceInstance`] is bound at any instant.
//! Teardown of the previous instance always completes - socket released -
//! before the next bind attempt, and every lifecycle transition is pushed
//! to the status sink.
//!
//! The watch channel gives last-write-wins semantics for free: when
//! snapshots arrive faster than a rebuild completes, superseded values are
//! never observed, so a burst of settings changes costs one rebuild, not a
//! restart storm.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use palmchat_core::ports::engine::InferenceEngine;
use palmchat_core::ports::status_sink::StatusSink;
use palmchat_core::ports::tool::Tool;
use palmchat_core::settings::ApiSettings;
use palmchat_core::status::ServiceStatus;
use palmchat_session::{SessionBridge, ToolRegistry};

use crate::instance::ServiceInstance;

/// How long in-flight connections get to finish during teardown.
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_secs(5);

/// Supervises the API service against a live settings stream.
///
/// Holds the long-lived collaborator handles (engine, tools, status sink);
/// each instance gets a fresh [`SessionBridge`] parameterized by the
/// snapshot that created it. Nothing is looked up through ambient statics.
pub struct ServiceSupervisor {
    engine: Arc<dyn InferenceEngine>,
    tools: Vec<Arc<dyn Tool>>,
    status: Arc<dyn StatusSink>,
    advertised_host: String,
    drain_grace: Duration,
}

impl ServiceSupervisor {
    /// Create a supervisor with default drain grace and advertised host.
    #[must_use]
    pub fn new(
        engine: Arc<dyn InferenceEngine>,
        tools: Vec<Arc<dyn Tool>>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            engine,
            tools,
            status,
            advertised_host: "0.0.0.0".to_string(),
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }

    /// Host published in `Active` status updates (e.g. the LAN address the
    /// presentation layer should show).
    #[must_use]
    pub fn with_advertised_host(mut self, host: impl Into<String>) -> Self {
        self.advertised_host = host.into();
        self
    }

    /// Override the teardown drain window.
    #[must_use]
    pub const fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    /// Observe the settings stream until the sender goes away.
    ///
    /// Runs as a single serialized task: a rebuild always finishes before
    /// the next snapshot is read, so no two rebuilds ever interleave.
    pub async fn run(self, mut settings_rx: watch::Receiver<ApiSettings>) {
        let mut current: Option<ServiceInstance> = None;
        let mut applied: Option<ApiSettings> = None;

        loop {
            // Always act on the newest value; anything older is stale.
            let snapshot = settings_rx.borrow_and_update().clone();
            if applied.as_ref() != Some(&snapshot) {
                current = self.apply(&snapshot, current.take()).await;
                applied = Some(snapshot);
            }

            if settings_rx.changed().await.is_err() {
                tracing::info!("Settings source closed; winding down");
                break;
            }
        }

        if let Some(instance) = current.take() {
            instance.shutdown(self.drain_grace).await;
        }
        self.status.publish(ServiceStatus::Inactive);
    }

    /// Apply one snapshot: teardown, then (maybe) rebuild.
    async fn apply(
        &self,
        snapshot: &ApiSettings,
        current: Option<ServiceInstance>,
    ) -> Option<ServiceInstance> {
        // The previous socket must be fully released before any bind
        // attempt; the OS may refuse a duplicate bind on the same port.
        if let Some(instance) = current {
            let addr = instance.local_addr();
            instance.shutdown(self.drain_grace).await;
            tracing::info!(%addr, "API instance stopped");
        }

        let config = snapshot.service_config();
        if !config.any_surface_enabled() {
            tracing::info!("All API surfaces disabled; staying inactive");
            self.status.publish(ServiceStatus::Inactive);
            return None;
        }

        let registry = ToolRegistry::new(self.tools.clone(), snapshot.tool_defaults());
        let bridge = SessionBridge::new(Arc::clone(&self.engine), registry, snapshot);

        match ServiceInstance::start(&config, bridge).await {
            Ok(instance) => {
                let port = instance.local_addr().port();
                tracing::info!(host = %self.advertised_host, port, "API instance started");
                self.status.publish(ServiceStatus::Active {
                    host: self.advertised_host.clone(),
                    port,
                });
                Some(instance)
            }
            Err(err) => {
                // The supervising process stays alive; the next snapshot
                // gets a fresh bind attempt.
                tracing::error!(error = %err, "Failed to start API instance");
                self.status.publish(ServiceStatus::Failed {
                    reason: err.to_string(),
                });
                None
            }
        }
    }
}

impl std::fmt::Debug for ServiceSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceSupervisor")
            .field("advertised_host", &self.advertised_host)
            .field("drain_grace", &self.drain_grace)
            .finish()
    }
}
