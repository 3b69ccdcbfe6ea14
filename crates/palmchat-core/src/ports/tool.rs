//! Tool collaborator port.
//!
//! Tools are looked up by name when the engine requests one. A failing
//! tool never aborts the conversation: the caller converts the error into
//! a structured result and feeds it back to the engine.

use async_trait::async_trait;
use thiserror::Error;

/// Canonical names of the built-in tool collaborators.
///
/// Settings toggles, registry defaults, and the engine-facing specs all
/// refer to tools by these names.
pub mod names {
    pub const TIME: &str = "time";
    pub const LOCATION: &str = "location";
    pub const SEARCH: &str = "search";
}

/// Errors a tool invocation can produce.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool exists but is switched off for this request.
    #[error("tool '{0}' is disabled")]
    Disabled(String),

    /// The tool's backing capability is not available right now.
    #[error("{0}")]
    Unavailable(String),

    /// The invocation itself failed.
    #[error("{0}")]
    Invocation(String),
}

/// A named capability the engine can invoke mid-turn.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable name the engine addresses this tool by.
    fn name(&self) -> &'static str;

    /// One-line description handed to the engine alongside the name.
    fn description(&self) -> &'static str;

    /// Invoke the tool with the arguments the engine supplied.
    ///
    /// # Errors
    ///
    /// Returns `ToolError`; callers are expected to re-encode failures as
    /// a structured `{"error": reason}` result rather than propagate.
    async fn invoke(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError>;
}
