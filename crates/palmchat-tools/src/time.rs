//! Current-time tool.

use async_trait::async_trait;
use chrono::{Local, Utc};

use palmchat_core::ports::tool::{names, Tool, ToolError};

/// Returns the current time in several formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeTool;

impl TimeTool {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for TimeTool {
    fn name(&self) -> &'static str {
        names::TIME
    }

    fn description(&self) -> &'static str {
        "Returns the current date and time (epoch, ISO-8601, local timezone)"
    }

    async fn invoke(&self, _args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let now = Local::now();
        Ok(serde_json::json!({
            "epoch_ms": Utc::now().timestamp_millis(),
            "iso_8601": now.to_rfc3339(),
            "timezone": now.offset().to_string(),
            "pretty": now.format("%Y-%m-%d %H:%M:%S %Z").to_string(),
        }))
    }
}
