//! Live settings snapshot and the wiring slice derived from it.
//!
//! The settings source (whatever persists user toggles) publishes a fresh
//! immutable [`ApiSettings`] snapshot on every change. The supervisor never
//! holds a handle into mutable shared state: a configuration read is always
//! a snapshot.

use serde::{Deserialize, Serialize};

use crate::domain::sampling::SamplingConfig;

/// Default port the LAN API listens on.
pub const DEFAULT_API_PORT: u16 = 17890;

/// Default number of engine round-trips one turn may spend on tool calls.
pub const DEFAULT_MAX_TOOL_ITERATIONS: u32 = 8;

/// Immutable snapshot of the user-controlled API settings.
///
/// A new value is produced on every configuration change; consumers compare
/// snapshots, they never mutate one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Whether the normal chat API surface is served.
    pub normal_api_enabled: bool,
    /// Whether the secondary ("weird") mirror surface is served.
    pub weird_api_enabled: bool,
    /// Port the server binds to.
    pub server_port: u16,
    /// Bearer token local callers must present.
    pub local_api_token: String,
    /// Tool enablement defaults; per-request toggles overlay these.
    pub search_tool_enabled: bool,
    pub time_tool_enabled: bool,
    pub location_tool_enabled: bool,
    /// System prompt prepended when a conversation carries none.
    pub system_prompt: String,
    /// Sampling defaults applied under request-level overrides.
    pub sampling: SamplingConfig,
    /// Bound on engine round-trips spent feeding tool results back.
    pub max_tool_iterations: u32,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ApiSettings {
    /// Settings as they ship before the user touches anything.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            normal_api_enabled: true,
            weird_api_enabled: false,
            server_port: DEFAULT_API_PORT,
            local_api_token: generate_token(),
            search_tool_enabled: false,
            time_tool_enabled: true,
            location_tool_enabled: false,
            system_prompt: "You are a helpful assistant.".to_string(),
            sampling: SamplingConfig::default(),
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
        }
    }

    /// Default tool enablement by canonical tool name.
    ///
    /// Per-request toggles overlay these; unknown tool names fall back to
    /// disabled.
    #[must_use]
    pub fn tool_defaults(&self) -> Vec<(&'static str, bool)> {
        use crate::ports::tool::names;
        vec![
            (names::TIME, self.time_tool_enabled),
            (names::LOCATION, self.location_tool_enabled),
            (names::SEARCH, self.search_tool_enabled),
        ]
    }

    /// The slice of this snapshot that determines how the listener is wired.
    ///
    /// Two snapshots with equal `ServiceConfig`s can serve on the same bound
    /// socket; anything else about the instance (tool defaults, prompt,
    /// sampling) is captured per instance and needs a rebuild to change.
    #[must_use]
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            port: self.server_port,
            auth_token: self.local_api_token.clone(),
            normal_api: self.normal_api_enabled,
            weird_api: self.weird_api_enabled,
        }
    }
}

/// The four wiring fields a [`ServiceConfig`]-bound instance captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    pub auth_token: String,
    pub normal_api: bool,
    pub weird_api: bool,
}

impl ServiceConfig {
    /// True when at least one API surface should be served.
    #[must_use]
    pub const fn any_surface_enabled(&self) -> bool {
        self.normal_api || self.weird_api
    }
}

/// Generate a random bearer token for authenticating local API requests.
#[must_use]
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
