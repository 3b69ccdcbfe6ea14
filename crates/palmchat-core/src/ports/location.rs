//! Device location port.
//!
//! The location tool is transport for whatever positioning the host device
//! offers; this port keeps the hardware dependency out of the tool crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A positioning fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub lat: f64,
    pub lon: f64,
    pub accuracy_m: f32,
    /// Reverse-geocoded place name, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
}

/// Errors from the positioning capability.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location unavailable")]
    Unavailable,
}

/// Port over the device's positioning capability.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Best-effort current (or last known) location.
    async fn current_location(&self) -> Result<LocationFix, LocationError>;
}
