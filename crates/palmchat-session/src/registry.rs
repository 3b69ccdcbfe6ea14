//! Tool registry: name lookup plus enablement resolution.
//!
//! The registry carries the snapshot's default toggles; a request can
//! overlay its own. A disabled tool is invisible to the engine (it is not
//! offered in the specs) and refuses invocation if the engine asks anyway.

use std::collections::HashMap;
use std::sync::Arc;

use palmchat_core::ports::engine::{ToolCallRequest, ToolSpec};
use palmchat_core::ports::tool::{Tool, ToolError};

/// Named tool collaborators with enablement defaults.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    defaults: HashMap<String, bool>,
}

impl ToolRegistry {
    /// Build a registry from tool handles and `(name, enabled)` defaults.
    ///
    /// Tools without a matching default entry are disabled.
    #[must_use]
    pub fn new<N, I>(tools: Vec<Arc<dyn Tool>>, defaults: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, bool)>,
    {
        Self {
            tools,
            defaults: defaults
                .into_iter()
                .map(|(name, enabled)| (name.into(), enabled))
                .collect(),
        }
    }

    /// An empty registry: no tools offered, every invocation refused.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tools: Vec::new(),
            defaults: HashMap::new(),
        }
    }

    /// Whether `name` is enabled under the given per-request overrides.
    #[must_use]
    pub fn is_enabled(&self, name: &str, overrides: &HashMap<String, bool>) -> bool {
        overrides
            .get(name)
            .or_else(|| self.defaults.get(name))
            .copied()
            .unwrap_or(false)
    }

    /// Specs for every enabled tool, in registration order.
    #[must_use]
    pub fn enabled_specs(&self, overrides: &HashMap<String, bool>) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .filter(|tool| self.is_enabled(tool.name(), overrides))
            .map(|tool| ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
            })
            .collect()
    }

    /// Invoke the tool the engine requested, yielding a structured result.
    ///
    /// Failures of any kind — unknown name, disabled tool, invocation
    /// error — come back as `{"error": reason}` so the conversation
    /// continues instead of aborting.
    pub async fn invoke(
        &self,
        request: &ToolCallRequest,
        overrides: &HashMap<String, bool>,
    ) -> serde_json::Value {
        let outcome = self.try_invoke(request, overrides).await;
        match outcome {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(tool = %request.name, error = %err, "Tool invocation failed");
                serde_json::json!({ "error": err.to_string() })
            }
        }
    }

    async fn try_invoke(
        &self,
        request: &ToolCallRequest,
        overrides: &HashMap<String, bool>,
    ) -> Result<serde_json::Value, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.name() == request.name)
            .ok_or_else(|| ToolError::Unavailable(format!("unknown tool '{}'", request.name)))?;

        if !self.is_enabled(tool.name(), overrides) {
            return Err(ToolError::Disabled(request.name.clone()));
        }

        tool.invoke(request.arguments.clone()).await
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("defaults", &self.defaults)
            .finish()
    }
}
