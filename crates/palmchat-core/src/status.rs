//! Service reachability status, published to an external sink.
//!
//! The supervisor is the single source of truth for whether the LAN API is
//! reachable; every transition is pushed to the status sink so the
//! presentation layer can keep a persistent indicator current.

use serde::{Deserialize, Serialize};

/// Current reachability of the API service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ServiceStatus {
    /// No surface enabled; nothing is listening.
    Inactive,
    /// Serving at `host:port`.
    Active { host: String, port: u16 },
    /// The last rebuild failed (e.g. port in use); nothing is listening.
    Failed { reason: String },
}

impl ServiceStatus {
    /// Whether a listener is currently bound.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inactive => write!(f, "inactive"),
            Self::Active { host, port } => write!(f, "active at {host}:{port}"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}
