use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::models::ChatMessage;

/// Stream of content delta strings (one per token/chunk) from the model.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Streams a chat completion for an assembled message list.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<CompletionStream>;
}

// ─── OpenAI-compatible streaming ─────────────────────────

/// Completions can run far longer than ordinary requests, so the call
/// overrides the client-wide timeout.
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct CompletionChunk {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    delta: CompletionDelta,
}

#[derive(Deserialize)]
struct CompletionDelta {
    content: Option<String>,
}

/// Chat completer backed by an OpenAI-compatible `/v1/chat/completions`
/// endpoint with `stream: true`.
pub struct OpenAiChat {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiChat {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ChatCompleter for OpenAiChat {
    async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<CompletionStream> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let req = CompletionRequest {
            model: self.config.chat_model.clone(),
            messages,
            stream: true,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut request = self.client.post(&url).timeout(COMPLETION_TIMEOUT).json(&req);
        if let Some(api_key) = self.config.api_key.as_deref() {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }

        let resp = request
            .send()
            .await
            .context("Failed to connect to chat completions API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Chat completions API returned {status}: {body}");
        }

        let stream = stream_lines(resp.bytes_stream()).filter_map(|line_result| async move {
            match line_result {
                Ok(line) => parse_openai_line(&line),
                Err(e) => Some(Err(e)),
            }
        });

        Ok(Box::pin(stream))
    }
}

/// Parse a single OpenAI SSE line. Returns:
/// - Some(Ok(content)) for content deltas
/// - Some(Err(e)) for parse errors
/// - None to skip (empty lines, [DONE], role-only chunks)
fn parse_openai_line(line: &str) -> Option<Result<String>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let data = if let Some(d) = line.strip_prefix("data: ") {
        d.trim()
    } else {
        return None;
    };

    if data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<CompletionChunk>(data) {
        Ok(chunk) => {
            let content = chunk
                .choices
                .first()
                .and_then(|c| c.delta.content.clone())
                .unwrap_or_default();
            if content.is_empty() {
                return None;
            }
            Some(Ok(content))
        }
        Err(e) => Some(Err(anyhow::anyhow!("Failed to parse completion chunk: {e}"))),
    }
}

// ─── Line buffering ──────────────────────────────────────

/// Convert a byte stream into a stream of complete lines.
fn stream_lines(
    byte_stream: impl Stream<Item = reqwest::Result<bytes::Bytes>> + Send + 'static,
) -> impl Stream<Item = Result<String>> + Send {
    futures_util::stream::unfold(
        (Box::pin(byte_stream), String::new()),
        |(mut stream, mut buffer)| async move {
            loop {
                // First, try to extract a complete line from the buffer
                if let Some(newline_pos) = buffer.find('\n') {
                    let line = buffer[..newline_pos].to_string();
                    buffer = buffer[newline_pos + 1..].to_string();
                    if !line.trim().is_empty() {
                        return Some((Ok(line), (stream, buffer)));
                    }
                    continue;
                }

                // Buffer has no complete line — read more bytes
                match stream.next().await {
                    Some(Ok(bytes)) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));
                    }
                    Some(Err(e)) => {
                        return Some((
                            Err(anyhow::anyhow!("Stream read error: {e}")),
                            (stream, buffer),
                        ));
                    }
                    None => {
                        // Stream ended — emit remaining buffer if non-empty
                        if !buffer.trim().is_empty() {
                            let remaining = std::mem::take(&mut buffer);
                            return Some((Ok(remaining), (stream, buffer)));
                        }
                        return None;
                    }
                }
            }
        },
    )
}
