//! Wire shapes for the OpenAI-compatible chat completions endpoint.

use serde::Serialize;

use palmchat_core::domain::chat::ConversationMessage;
use palmchat_core::domain::sampling::SamplingConfig;
use palmchat_core::ports::engine::ToolSpec;

/// Request body for `POST /v1/chat/completions` (streaming).
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireMessage {
    pub role: &'static str,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireTool {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: WireFunction,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireFunction {
    pub name: String,
    pub description: String,
    /// Free-form argument object; the upstream validates nothing here.
    pub parameters: serde_json::Value,
}

impl ChatCompletionRequest {
    pub(crate) fn build(
        model: &str,
        conversation: &[ConversationMessage],
        tools: &[ToolSpec],
        sampling: &SamplingConfig,
    ) -> Self {
        let messages = conversation
            .iter()
            .map(|message| WireMessage {
                role: message.role.as_str(),
                content: message.content.clone(),
                name: message.tool_name.clone(),
            })
            .collect();

        let tools = if tools.is_empty() {
            None
        } else {
            Some(
                tools
                    .iter()
                    .map(|spec| WireTool {
                        kind: "function",
                        function: WireFunction {
                            name: spec.name.clone(),
                            description: spec.description.clone(),
                            parameters: serde_json::json!({ "type": "object" }),
                        },
                    })
                    .collect(),
            )
        };

        Self {
            model: model.to_string(),
            messages,
            stream: true,
            tools,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            top_k: sampling.top_k,
            max_tokens: sampling.max_tokens,
        }
    }
}
