//! Device-location tool.
//!
//! Positioning hardware lives behind the core `LocationProvider` port; this
//! tool is just the engine-facing adapter over it.

use async_trait::async_trait;
use std::sync::Arc;

use palmchat_core::ports::location::{LocationError, LocationFix, LocationProvider};
use palmchat_core::ports::tool::{names, Tool, ToolError};

/// Reports the device's current (or last known) position.
pub struct LocationTool {
    provider: Arc<dyn LocationProvider>,
}

impl LocationTool {
    #[must_use]
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for LocationTool {
    fn name(&self) -> &'static str {
        names::LOCATION
    }

    fn description(&self) -> &'static str {
        "Returns the device's current location (lat, lon, accuracy, place)"
    }

    async fn invoke(&self, _args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        match self.provider.current_location().await {
            Ok(fix) => serde_json::to_value(&fix)
                .map_err(|e| ToolError::Invocation(format!("encoding location fix: {e}"))),
            Err(LocationError::Unavailable) => {
                Err(ToolError::Unavailable("location unavailable".into()))
            }
        }
    }
}

/// A fixed-position provider for tests and headless deployments.
#[derive(Debug, Clone, Default)]
pub struct StaticLocationProvider {
    fix: Option<LocationFix>,
}

impl StaticLocationProvider {
    /// A provider that always reports `fix`.
    #[must_use]
    pub const fn pinned(fix: LocationFix) -> Self {
        Self { fix: Some(fix) }
    }

    /// A provider with no position at all.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { fix: None }
    }
}

#[async_trait]
impl LocationProvider for StaticLocationProvider {
    async fn current_location(&self) -> Result<LocationFix, LocationError> {
        self.fix.clone().ok_or(LocationError::Unavailable)
    }
}
