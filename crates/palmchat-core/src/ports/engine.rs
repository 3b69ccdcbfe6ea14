//! Inference engine port.
//!
//! The engine turns a conversation into a sequence of reply increments.
//! It may interleave tool-call requests: the caller (the session bridge)
//! resolves those and re-invokes the engine with the tool result appended,
//! all within the same logical turn.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::chat::ConversationMessage;
use crate::domain::sampling::SamplingConfig;

/// A tool the engine may call during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
}

/// A tool invocation requested by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Name of the tool, matching a [`ToolSpec`] the engine was given.
    pub name: String,
    /// Arguments as the engine supplied them.
    pub arguments: serde_json::Value,
}

/// One unit of engine output.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A piece of assistant text, delivered as soon as it is produced.
    Delta(String),
    /// The engine wants a tool result before it can continue.
    ToolCall(ToolCallRequest),
    /// The turn finished cleanly.
    Done,
}

/// Errors from the inference collaborator.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The engine could not be reached or refused the request.
    #[error("inference engine unavailable: {0}")]
    Unavailable(String),

    /// The engine accepted the request but generation failed midway.
    #[error("generation failed: {0}")]
    Generation(String),

    /// The engine finished without producing any reply.
    #[error("inference produced no reply")]
    EmptyReply,
}

/// Channel of engine events for one `generate` call.
///
/// A concrete receiver rather than a boxed stream keeps channel mechanics
/// out of implementor signatures; the sender side is dropped when the turn
/// ends, which closes the receiver.
pub type EngineEventReceiver = mpsc::Receiver<Result<EngineEvent, InferenceError>>;

/// Port for the on-device (or upstream) inference engine.
///
/// Each `generate` call is a fresh invocation: replaying the same
/// conversation is a new, independent call with no guarantee of identical
/// output.
#[async_trait]
pub trait InferenceEngine: Send + Sync + fmt::Debug {
    /// Start one generation pass over `conversation`.
    ///
    /// `tools` lists the tool collaborators the engine may request by name;
    /// `sampling` is fully resolved by the caller (no `None` means
    /// "engine's choice" — absent fields are simply not constrained).
    ///
    /// # Errors
    ///
    /// Returns `InferenceError` when the request cannot be started; errors
    /// after the first event arrive in-band on the receiver.
    async fn generate(
        &self,
        conversation: &[ConversationMessage],
        tools: &[ToolSpec],
        sampling: &SamplingConfig,
    ) -> Result<EngineEventReceiver, InferenceError>;

    /// Whether concurrent `generate` calls are safe.
    ///
    /// When false, the session bridge serializes turns through this engine;
    /// implementations must not rely on callers guessing.
    fn supports_concurrent_calls(&self) -> bool {
        false
    }
}
