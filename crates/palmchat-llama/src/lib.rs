//! `InferenceEngine` adapter for an OpenAI-compatible llama-server endpoint.
//!
//! The engine forwards one generation pass to
//! `POST {base_url}/v1/chat/completions` with `stream: true` and translates
//! the SSE response into typed engine events: content deltas as they land,
//! streamed tool-call fragments assembled into a single tool-call request,
//! `[DONE]` into completion.

#![deny(unsafe_code)]

mod models;
mod stream;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::mpsc;

use palmchat_core::domain::chat::ConversationMessage;
use palmchat_core::domain::sampling::SamplingConfig;
use palmchat_core::ports::engine::{
    EngineEvent, EngineEventReceiver, InferenceEngine, InferenceError, ToolCallRequest, ToolSpec,
};

use crate::models::ChatCompletionRequest;
use crate::stream::{parse_chunk, SseLineSplitter};

/// Buffered engine events per generation pass.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Configuration for [`LlamaServerEngine`].
#[derive(Debug, Clone)]
pub struct LlamaServerConfig {
    /// Base URL of the llama-server instance, e.g. `http://127.0.0.1:8080`.
    pub base_url: String,
    /// Model identifier forwarded verbatim (llama-server serves one model;
    /// the field is informational).
    pub model: String,
}

impl Default for LlamaServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            model: "default".to_string(),
        }
    }
}

/// Inference engine backed by a llama-server process.
#[derive(Debug, Clone)]
pub struct LlamaServerEngine {
    client: reqwest::Client,
    config: LlamaServerConfig,
}

impl LlamaServerEngine {
    #[must_use]
    pub fn new(config: LlamaServerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl InferenceEngine for LlamaServerEngine {
    async fn generate(
        &self,
        conversation: &[ConversationMessage],
        tools: &[ToolSpec],
        sampling: &SamplingConfig,
    ) -> Result<EngineEventReceiver, InferenceError> {
        let body = ChatCompletionRequest::build(&self.config.model, conversation, tools, sampling);
        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Unavailable(format!("connecting to {url}: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(InferenceError::Generation(format!(
                "upstream returned {status}: {detail}"
            )));
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        tokio::spawn(pump_events(response, tx));
        Ok(rx)
    }

    fn supports_concurrent_calls(&self) -> bool {
        // llama-server queues concurrent requests across its slots itself.
        true
    }
}

/// Accumulated tool-call fragments for one streamed call.
#[derive(Debug, Default)]
struct PendingToolCall {
    name: String,
    arguments: String,
}

impl PendingToolCall {
    fn into_event(self) -> EngineEvent {
        let arguments = if self.arguments.trim().is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&self.arguments)
                .unwrap_or(serde_json::Value::String(self.arguments))
        };
        EngineEvent::ToolCall(ToolCallRequest {
            name: self.name,
            arguments,
        })
    }
}

/// Read the upstream SSE body and feed typed events to the receiver.
async fn pump_events(
    response: reqwest::Response,
    tx: mpsc::Sender<Result<EngineEvent, InferenceError>>,
) {
    let mut byte_stream = response.bytes_stream();
    let mut splitter = SseLineSplitter::new();
    let mut pending_tool: Option<PendingToolCall> = None;

    while let Some(chunk) = byte_stream.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tx
                    .send(Err(InferenceError::Generation(format!(
                        "upstream stream failed: {e}"
                    ))))
                    .await;
                return;
            }
        };

        for payload in splitter.push(&bytes) {
            if payload == "[DONE]" {
                finish(pending_tool.take(), &tx).await;
                return;
            }
            let Some(update) = parse_chunk(&payload) else {
                continue;
            };

            if let Some(content) = update.content {
                if tx.send(Ok(EngineEvent::Delta(content))).await.is_err() {
                    return;
                }
            }
            if update.tool_name.is_some() || update.tool_arguments.is_some() {
                let pending = pending_tool.get_or_insert_with(PendingToolCall::default);
                if let Some(name) = update.tool_name {
                    pending.name = name;
                }
                if let Some(fragment) = update.tool_arguments {
                    pending.arguments.push_str(&fragment);
                }
            }
            if update.finished_with_tool_calls {
                finish(pending_tool.take(), &tx).await;
                return;
            }
        }
    }

    // Upstream closed without [DONE]; treat whatever we hold as the end.
    tracing::debug!("Upstream stream ended without [DONE]");
    finish(pending_tool.take(), &tx).await;
}

async fn finish(
    pending_tool: Option<PendingToolCall>,
    tx: &mpsc::Sender<Result<EngineEvent, InferenceError>>,
) {
    let event = match pending_tool {
        Some(pending) if !pending.name.is_empty() => pending.into_event(),
        _ => EngineEvent::Done,
    };
    let _ = tx.send(Ok(event)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_tool_call_parses_arguments() {
        let pending = PendingToolCall {
            name: "search".into(),
            arguments: "{\"query\":\"rust\"}".into(),
        };
        match pending.into_event() {
            EngineEvent::ToolCall(request) => {
                assert_eq!(request.name, "search");
                assert_eq!(request.arguments["query"], "rust");
            }
            other => panic!("expected tool call, got {other:?}"),
        }
    }

    #[test]
    fn test_pending_tool_call_empty_arguments() {
        let pending = PendingToolCall {
            name: "time".into(),
            arguments: "  ".into(),
        };
        match pending.into_event() {
            EngineEvent::ToolCall(request) => {
                assert!(request.arguments.as_object().unwrap().is_empty());
            }
            other => panic!("expected tool call, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_unavailable() {
        // Nothing listens on this port.
        let engine = LlamaServerEngine::new(LlamaServerConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            model: "default".to_string(),
        });
        let err = engine
            .generate(&[ConversationMessage::user("hi")], &[], &SamplingConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::Unavailable(_)));
    }
}
