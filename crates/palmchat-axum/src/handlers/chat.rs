//! Chat completion handler - the normal surface's main endpoint.
//!
//! Supports both:
//! - Non-streaming: the turn's increments aggregated into one JSON message
//! - Streaming: SSE, one `event: message` frame per increment

use std::collections::HashMap;
use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;

use palmchat_core::domain::chat::ConversationMessage;
use palmchat_core::domain::sampling::SamplingConfig;
use palmchat_session::{ChatTurn, ReplyStream};

use crate::error::HttpError;
use crate::state::ApiState;

/// Request body for `POST /v1/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Advisory model name; the instance serves whatever engine it was
    /// built with.
    #[serde(default)]
    pub model: Option<String>,
    /// The conversation, oldest first.
    pub messages: Vec<ConversationMessage>,
    /// Per-request tool toggles.
    #[serde(default)]
    pub tools: Option<Vec<ToolToggle>>,
    /// Stream increments as SSE instead of returning one object.
    #[serde(default)]
    pub stream: Option<bool>,
    /// Request-level sampling overrides.
    #[serde(default)]
    pub params: Option<SamplingConfig>,
}

/// One per-request tool switch.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolToggle {
    pub name: String,
    pub enabled: bool,
}

/// POST /v1/chat
pub async fn completion(
    State(state): State<ApiState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, HttpError> {
    if request.messages.is_empty() {
        return Err(HttpError::BadRequest("no messages in request".into()));
    }
    if let Some(model) = &request.model {
        tracing::debug!(model = %model, "Model field is advisory; serving the configured engine");
    }

    let turn = ChatTurn {
        messages: request.messages,
        tool_overrides: request
            .tools
            .unwrap_or_default()
            .into_iter()
            .map(|toggle| (toggle.name, toggle.enabled))
            .collect::<HashMap<_, _>>(),
        sampling: request.params.unwrap_or_default(),
    };

    let reply = state.bridge.respond(turn);

    if request.stream.unwrap_or(false) {
        Ok(stream_response(reply))
    } else {
        let message = reply.collect_reply().await?;
        Ok(Json(message).into_response())
    }
}

/// Turn the reply stream into an SSE response.
///
/// Each increment becomes one complete `event: message` frame, flushed in
/// production order; a terminal failure becomes a final `event: error`
/// frame. The connection closes when the turn finishes.
fn stream_response(reply: ReplyStream) -> Response {
    let frames = ReceiverStream::new(reply.into_inner()).map(|item| {
        let event = match item {
            Ok(message) => Event::default().event("message").json_data(&message),
            Err(err) => Event::default()
                .event("error")
                .json_data(&serde_json::json!({ "error": err.to_string() })),
        };
        Ok::<_, Infallible>(event.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to encode stream frame");
            Event::default().event("error").data("frame encoding failed")
        }))
    });

    Sse::new(frames)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(30))
                .text("ping"),
        )
        .into_response()
}
