//! SSE chunk parsing for the upstream completion stream.
//!
//! llama-server streams Server-Sent Events:
//! `data: {"choices":[{"delta":{"content":"hi"}}]}\n\n`, terminated by
//! `data: [DONE]`. Tool calls arrive as fragments (the function name in one
//! chunk, argument text spread over several); the caller assembles them.

use bytes::BytesMut;

/// Splits an SSE byte stream into complete `data:` payloads.
///
/// Chunks may end mid-line; the splitter buffers until a newline lands.
#[derive(Debug, Default)]
pub(crate) struct SseLineSplitter {
    buf: BytesMut,
}

impl SseLineSplitter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, yielding every completed `data:` payload.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);
        let mut payloads = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line = self.buf.split_to(pos + 1);
            let line = String::from_utf8_lossy(&line);
            let trimmed = line.trim();
            // Skip blank separators and SSE comments.
            if trimmed.is_empty() || trimmed.starts_with(':') {
                continue;
            }
            if let Some(data) = trimmed.strip_prefix("data:") {
                payloads.push(data.trim().to_string());
            }
        }
        payloads
    }
}

/// What one parsed (non-`[DONE]`) chunk contributes to the turn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ChunkUpdate {
    /// New assistant text, if any.
    pub content: Option<String>,
    /// Tool-call function name fragment, if any.
    pub tool_name: Option<String>,
    /// Tool-call argument text fragment, if any.
    pub tool_arguments: Option<String>,
    /// Whether the chunk closed the turn with a tool-call request.
    pub finished_with_tool_calls: bool,
}

/// Parse one `data:` JSON payload from the upstream.
///
/// Unparseable payloads are ignored (`None`) — the upstream occasionally
/// interleaves keep-alive noise.
pub(crate) fn parse_chunk(data: &str) -> Option<ChunkUpdate> {
    let value: serde_json::Value = serde_json::from_str(data).ok()?;
    let choice = value.get("choices")?.get(0)?;
    let delta = choice.get("delta");

    let mut update = ChunkUpdate::default();

    if let Some(delta) = delta {
        if let Some(content) = delta.get("content").and_then(serde_json::Value::as_str) {
            if !content.is_empty() {
                update.content = Some(content.to_string());
            }
        }
        if let Some(call) = delta
            .get("tool_calls")
            .and_then(|calls| calls.get(0))
            .and_then(|call| call.get("function"))
        {
            update.tool_name = call
                .get("name")
                .and_then(serde_json::Value::as_str)
                .map(String::from);
            update.tool_arguments = call
                .get("arguments")
                .and_then(serde_json::Value::as_str)
                .map(String::from);
        }
    }

    if choice.get("finish_reason").and_then(serde_json::Value::as_str) == Some("tool_calls") {
        update.finished_with_tool_calls = true;
    }

    Some(update)
}
