//! Core domain types and port definitions for palmchat.
//!
//! This crate holds everything the adapters share: chat domain types,
//! the live settings snapshot, the service status values published to the
//! user-visible indicator, and the port traits behind which the inference
//! engine, tool collaborators, and status sink live.
//!
//! Nothing in here performs I/O. Concrete implementations live in the
//! adapter crates (`palmchat-llama`, `palmchat-tools`, `palmchat-axum`).

#![deny(unsafe_code)]

pub mod domain;
pub mod ports;
pub mod settings;
pub mod status;

// Re-export the types adapters reach for constantly
pub use domain::chat::{ConversationMessage, MessageRole};
pub use domain::sampling::SamplingConfig;
pub use settings::{ApiSettings, ServiceConfig, DEFAULT_API_PORT};
pub use status::ServiceStatus;
