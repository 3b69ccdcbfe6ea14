//! Axum adapter for the palmchat LAN API.
//!
//! This crate owns the reactive service lifecycle:
//!
//! - [`supervisor::ServiceSupervisor`] watches the live settings stream and
//!   keeps at most one instance bound,
//! - [`instance::ServiceInstance`] is one bound listener wired to one
//!   settings snapshot,
//! - [`routes`] builds the surface-gated router, [`auth`] guards it, and
//!   [`handlers`] bridge requests onto the session layer.

#![deny(unsafe_code)]

pub mod auth;
pub mod error;
pub mod handlers;
pub mod instance;
pub mod routes;
pub mod state;
pub mod supervisor;

// Re-export primary types
pub use error::HttpError;
pub use instance::{BindError, ServiceInstance};
pub use routes::build_router;
pub use state::{ApiState, InstanceState};
pub use supervisor::{ServiceSupervisor, DEFAULT_DRAIN_GRACE};
