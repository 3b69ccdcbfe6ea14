//! Port traits the service core depends on.
//!
//! Implementations live in adapter crates; the core passes them around as
//! `Arc<dyn ...>` handles constructed at the composition root.

pub mod engine;
pub mod location;
pub mod status_sink;
pub mod tool;

pub use engine::{EngineEvent, EngineEventReceiver, InferenceEngine, InferenceError, ToolCallRequest, ToolSpec};
pub use location::{LocationError, LocationFix, LocationProvider};
pub use status_sink::{NoopStatusSink, StatusSink};
pub use tool::{Tool, ToolError};
