//! The session bridge: one conversation in, a lazy sequence of reply
//! increments out.
//!
//! Each [`SessionBridge::respond`] call is a fresh inference invocation.
//! The bridge assembles the outbound message list, drives the engine,
//! resolves tool calls the engine requests (feeding results back into the
//! same turn), and presents reply increments in production order.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};

use palmchat_core::domain::chat::ConversationMessage;
use palmchat_core::domain::sampling::SamplingConfig;
use palmchat_core::ports::engine::{EngineEvent, InferenceEngine, InferenceError, ToolCallRequest};
use palmchat_core::settings::ApiSettings;
use palmchat_core::MessageRole;

use crate::registry::ToolRegistry;

/// Buffered increments per in-flight turn.
const REPLY_CHANNEL_CAPACITY: usize = 32;

/// Errors terminating a turn.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The inference collaborator failed (or produced nothing at all).
    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// The engine kept requesting tools past the configured bound.
    #[error("tool-call budget exhausted after {0} engine round-trips")]
    ToolLoopExhausted(u32),
}

/// One inbound chat request, already decoded from the wire.
#[derive(Debug, Clone, Default)]
pub struct ChatTurn {
    /// The conversation, oldest first.
    pub messages: Vec<ConversationMessage>,
    /// Per-request tool toggles overlaying the snapshot defaults.
    pub tool_overrides: HashMap<String, bool>,
    /// Request-level sampling overrides.
    pub sampling: SamplingConfig,
}

/// The produced sequence of reply increments for one turn.
///
/// Increments arrive strictly in production order. The sequence ends when
/// the channel closes; an `Err` item is terminal.
pub struct ReplyStream {
    rx: mpsc::Receiver<Result<ConversationMessage, SessionError>>,
}

impl ReplyStream {
    /// Next increment, or `None` once the turn is finished.
    pub async fn next(&mut self) -> Option<Result<ConversationMessage, SessionError>> {
        self.rx.recv().await
    }

    /// Unwrap the underlying receiver (for stream adapters).
    #[must_use]
    pub fn into_inner(self) -> mpsc::Receiver<Result<ConversationMessage, SessionError>> {
        self.rx
    }

    /// Drain the turn into a single assistant message.
    ///
    /// Increments are concatenated in production order. A turn that
    /// produced nothing is an inference failure, never an empty reply.
    pub async fn collect_reply(mut self) -> Result<ConversationMessage, SessionError> {
        let mut content = String::new();
        let mut produced = false;
        while let Some(item) = self.rx.recv().await {
            let increment = item?;
            produced = true;
            content.push_str(&increment.content);
        }
        if produced {
            Ok(ConversationMessage::assistant(content))
        } else {
            Err(InferenceError::EmptyReply.into())
        }
    }
}

/// Bridges conversations onto the inference engine.
///
/// Holds no long-lived conversational state; safe to share across
/// concurrent connections. When the engine does not support concurrent
/// calls, the bridge serializes turns through an internal gate — callers
/// never need to know.
#[derive(Clone)]
pub struct SessionBridge {
    engine: Arc<dyn InferenceEngine>,
    tools: ToolRegistry,
    system_prompt: String,
    sampling_defaults: SamplingConfig,
    max_tool_iterations: u32,
    gate: Option<Arc<Semaphore>>,
}

impl SessionBridge {
    /// Build a bridge for one service instance from a settings snapshot.
    #[must_use]
    pub fn new(engine: Arc<dyn InferenceEngine>, tools: ToolRegistry, settings: &ApiSettings) -> Self {
        let gate = if engine.supports_concurrent_calls() {
            None
        } else {
            Some(Arc::new(Semaphore::new(1)))
        };
        Self {
            engine,
            tools,
            system_prompt: settings.system_prompt.clone(),
            sampling_defaults: settings.sampling.clone(),
            max_tool_iterations: settings.max_tool_iterations,
            gate,
        }
    }

    /// Run one turn, returning its reply increments as they are produced.
    ///
    /// The turn task runs independently of the caller; dropping the stream
    /// cancels delivery and winds the turn down without touching other
    /// connections.
    #[must_use]
    pub fn respond(&self, turn: ChatTurn) -> ReplyStream {
        let (tx, rx) = mpsc::channel(REPLY_CHANNEL_CAPACITY);
        let bridge = self.clone();
        tokio::spawn(async move {
            if let Err(err) = bridge.run_turn(turn, &tx).await {
                tracing::debug!(error = %err, "Turn ended with error");
                let _ = tx.send(Err(err)).await;
            }
        });
        ReplyStream { rx }
    }

    async fn run_turn(
        &self,
        turn: ChatTurn,
        tx: &mpsc::Sender<Result<ConversationMessage, SessionError>>,
    ) -> Result<(), SessionError> {
        // Serialize turns when the engine cannot take concurrent calls.
        let _permit = match &self.gate {
            Some(gate) => gate.clone().acquire_owned().await.ok(),
            None => None,
        };

        let mut conversation = self.assemble_conversation(turn.messages);
        let specs = self.tools.enabled_specs(&turn.tool_overrides);
        let mut sampling = turn.sampling;
        sampling.merge_with(&self.sampling_defaults);
        sampling.merge_with(&SamplingConfig::with_hardcoded_defaults());

        let mut produced = false;
        for _ in 0..=self.max_tool_iterations {
            let mut events = self.engine.generate(&conversation, &specs, &sampling).await?;

            let mut segment = String::new();
            let mut pending_tool: Option<ToolCallRequest> = None;
            while let Some(event) = events.recv().await {
                match event? {
                    EngineEvent::Delta(text) => {
                        segment.push_str(&text);
                        produced = true;
                        if tx.send(Ok(ConversationMessage::assistant(text))).await.is_err() {
                            // Peer went away; nothing left to deliver to.
                            return Ok(());
                        }
                    }
                    EngineEvent::ToolCall(request) => {
                        pending_tool = Some(request);
                        break;
                    }
                    EngineEvent::Done => break,
                }
            }

            let Some(request) = pending_tool else {
                return if produced {
                    Ok(())
                } else {
                    Err(InferenceError::EmptyReply.into())
                };
            };

            tracing::debug!(tool = %request.name, "Engine requested tool call");
            if !segment.is_empty() {
                conversation.push(ConversationMessage::assistant(segment));
            }
            let result = self.tools.invoke(&request, &turn.tool_overrides).await;
            conversation.push(ConversationMessage::tool(request.name, result.to_string()));
        }

        Err(SessionError::ToolLoopExhausted(self.max_tool_iterations))
    }

    fn assemble_conversation(
        &self,
        messages: Vec<ConversationMessage>,
    ) -> Vec<ConversationMessage> {
        let has_system = messages.iter().any(|m| m.role == MessageRole::System);
        if has_system || self.system_prompt.is_empty() {
            return messages;
        }
        let mut conversation = Vec::with_capacity(messages.len() + 1);
        conversation.push(ConversationMessage::system(self.system_prompt.clone()));
        conversation.extend(messages);
        conversation
    }
}

impl std::fmt::Debug for SessionBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBridge")
            .field("tools", &self.tools)
            .field("max_tool_iterations", &self.max_tool_iterations)
            .field("serialized", &self.gate.is_some())
            .finish()
    }
}
