//! Built-in tool collaborators.
//!
//! Each tool implements the `palmchat-core` [`palmchat_core::ports::tool::Tool`]
//! port and is registered with the session bridge by the composition root.
//! Tool failures are ordinary `ToolError`s; the bridge re-encodes them as
//! structured results so a broken tool never aborts a conversation.

#![deny(unsafe_code)]

pub mod location;
pub mod search;
pub mod time;

pub use location::{LocationTool, StaticLocationProvider};
pub use search::{SearchTool, SearchToolConfig};
pub use time::TimeTool;
