//! One bound service instance.
//!
//! An instance owns exactly one listening socket wired to one settings
//! snapshot. It is created and destroyed by the supervisor and never
//! shared across configuration generations.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use palmchat_core::settings::ServiceConfig;
use palmchat_session::SessionBridge;

use crate::routes::build_router;
use crate::state::InstanceState;

/// Failure to take the listening socket.
#[derive(Debug, Error)]
#[error("failed to bind to {address}: {reason}")]
pub struct BindError {
    pub address: String,
    pub reason: String,
}

/// A running API server bound to one configuration snapshot.
pub struct ServiceInstance {
    cancel_token: CancellationToken,
    join_handle: JoinHandle<()>,
    bound_addr: SocketAddr,
}

impl ServiceInstance {
    /// Bind the listener and start serving.
    ///
    /// Binds FIRST so the real address (relevant with port 0) is known
    /// before the accept loop spawns; a bind failure leaves nothing
    /// running.
    pub async fn start(
        config: &ServiceConfig,
        bridge: SessionBridge,
    ) -> Result<Self, BindError> {
        let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|e| BindError {
                address: bind_addr.to_string(),
                reason: e.to_string(),
            })?;
        let bound_addr = listener.local_addr().map_err(|e| BindError {
            address: bind_addr.to_string(),
            reason: format!("failed to read local address: {e}"),
        })?;

        let app = build_router(config, Arc::new(InstanceState { bridge }));

        let cancel_token = CancellationToken::new();
        let cancel = cancel_token.clone();
        let join_handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(cancel.cancelled_owned())
                .await
            {
                tracing::error!(error = %e, "API server error");
            }
        });

        tracing::info!(addr = %bound_addr, "API instance listening");
        Ok(Self {
            cancel_token,
            join_handle,
            bound_addr,
        })
    }

    /// The address the listener is actually bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.bound_addr
    }

    /// Tear the instance down.
    ///
    /// Cancels the accept loop immediately (no new connections admitted),
    /// gives in-flight connections the drain grace to finish, then aborts.
    /// The socket is fully released when this returns.
    pub async fn shutdown(self, drain_grace: Duration) {
        self.cancel_token.cancel();

        let mut join = self.join_handle;
        if tokio::time::timeout(drain_grace, &mut join).await.is_err() {
            tracing::warn!(
                addr = %self.bound_addr,
                "Drain window elapsed; aborting instance task"
            );
            join.abort();
            let _ = join.await;
        }
    }
}

impl std::fmt::Debug for ServiceInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceInstance")
            .field("bound_addr", &self.bound_addr)
            .finish()
    }
}
