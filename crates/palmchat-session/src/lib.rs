//! Session bridge: adapts one conversation into a sequence of reply
//! increments from the inference engine, resolving tool calls along the way.
//!
//! This crate is pure domain logic over the `palmchat-core` ports. It owns
//! per-request invocation only — no long-lived conversational state, no
//! transport, no engine specifics.

#![deny(unsafe_code)]

pub mod bridge;
pub mod registry;

pub use bridge::{ChatTurn, ReplyStream, SessionBridge, SessionError};
pub use registry::ToolRegistry;
