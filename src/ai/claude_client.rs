// Claude API client with streaming support
//
// Implements communication with Anthropic's Claude API for:
// - Chat completions (single response)
// - Streamed chat completions over server-sent events

use crate::config::LlmSettings;
use crate::error::AiError;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::{header, Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

const CLAUDE_VERSION: &str = "2023-06-01";

/// Message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String, // "user" or "assistant"
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Request to Claude API
#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Response from Claude API
#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

/// Streaming event from Claude API
#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    delta: Option<Delta>,
    #[serde(default)]
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(rename = "type", default)]
    delta_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    #[serde(default)]
    message: String,
}

/// What a single `data:` line means for the text stream
#[derive(Debug, PartialEq)]
enum StreamChunk {
    Text(String),
    Stop,
}

/// Splits a byte stream into server-sent-event `data:` payloads.
///
/// Lines are only decoded once complete, so multi-byte characters split
/// across network chunks survive.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\r', '\n']);
            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }
        payloads
    }
}

fn interpret(data: &str) -> Option<Result<StreamChunk, AiError>> {
    let event: StreamEvent = match serde_json::from_str(data) {
        Ok(event) => event,
        Err(e) => return Some(Err(AiError::Parse(format!("Invalid stream event: {}", e)))),
    };

    match event.event_type.as_str() {
        "content_block_delta" => event
            .delta
            .filter(|d| d.delta_type == "text_delta")
            .and_then(|d| d.text)
            .map(|text| Ok(StreamChunk::Text(text))),
        "message_stop" => Some(Ok(StreamChunk::Stop)),
        "error" => Some(Err(AiError::Api {
            status: 0,
            message: event
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "Unknown stream error".to_string()),
        })),
        _ => None,
    }
}

#[derive(Clone)]
pub struct ClaudeClient {
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
    client: Client,
}

impl ClaudeClient {
    /// Create a client from LLM settings. Fails without an API key.
    pub fn new(settings: &LlmSettings) -> Result<Self, AiError> {
        let api_key = settings.api_key().ok_or(AiError::MissingApiKey)?.to_string();

        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            api_key,
            endpoint: format!("{}/v1/messages", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(
        &self,
        messages: &[Message],
        system_prompt: Option<&str>,
        stream: bool,
    ) -> Result<Response, AiError> {
        let request = ClaudeRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages,
            system: system_prompt,
            stream: stream.then_some(true),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", CLAUDE_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AiError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(response)
    }

    /// Send a chat message and get a complete response (no streaming)
    pub async fn chat(
        &self,
        messages: &[Message],
        system_prompt: Option<&str>,
    ) -> Result<String, AiError> {
        let response = self.send(messages, system_prompt, false).await?;

        let claude_response: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;

        // Extract text from content blocks
        let text = claude_response
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(text)
    }

    /// Send a chat message and stream the text deltas as they arrive.
    ///
    /// The returned stream ends at `message_stop` or when the connection
    /// closes. Transport and API errors are yielded as items.
    pub async fn chat_stream(
        &self,
        messages: &[Message],
        system_prompt: Option<&str>,
    ) -> Result<BoxStream<'static, Result<String, AiError>>, AiError> {
        let response = self.send(messages, system_prompt, true).await?;
        debug!(model = %self.model, "Claude stream opened");

        let state = (
            response.bytes_stream().boxed(),
            SseDecoder::default(),
            VecDeque::<Result<String, AiError>>::new(),
            false,
        );

        let text_stream = stream::unfold(state, |(mut bytes, mut decoder, mut pending, mut done)| async move {
            loop {
                if let Some(item) = pending.pop_front() {
                    return Some((item, (bytes, decoder, pending, done)));
                }
                if done {
                    return None;
                }

                match bytes.next().await {
                    Some(Ok(chunk)) => {
                        for data in decoder.push(&chunk) {
                            match interpret(&data) {
                                Some(Ok(StreamChunk::Text(text))) => pending.push_back(Ok(text)),
                                Some(Ok(StreamChunk::Stop)) => {
                                    done = true;
                                    break;
                                }
                                Some(Err(e)) => {
                                    pending.push_back(Err(e));
                                    done = true;
                                    break;
                                }
                                None => {}
                            }
                        }
                    }
                    Some(Err(e)) => {
                        pending.push_back(Err(AiError::Request(e)));
                        done = true;
                    }
                    None => done = true,
                }
            }
        });

        Ok(text_stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_splits_lines_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"event: content_block_delta\ndata: {\"a\"").is_empty());
        let payloads = decoder.push(b":1}\n\n");
        assert_eq!(payloads, vec![r#"{"a":1}"#.to_string()]);
    }

    #[test]
    fn test_decoder_keeps_multibyte_chars_intact() {
        let mut decoder = SseDecoder::default();
        let line = "data: été\n".as_bytes();
        // Split inside the two-byte "é"
        assert!(decoder.push(&line[..7]).is_empty());
        assert_eq!(decoder.push(&line[7..]), vec!["été".to_string()]);
    }

    #[test]
    fn test_decoder_handles_crlf() {
        let mut decoder = SseDecoder::default();
        assert_eq!(decoder.push(b"data: x\r\n"), vec!["x".to_string()]);
    }

    #[test]
    fn test_interpret_text_delta() {
        let data = r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Salut"}}"#;
        assert_eq!(interpret(data).unwrap().unwrap(), StreamChunk::Text("Salut".to_string()));
    }

    #[test]
    fn test_interpret_ignores_bookkeeping_events() {
        assert!(interpret(r#"{"type":"ping"}"#).is_none());
        assert!(interpret(r#"{"type":"message_start","message":{"id":"msg_1"}}"#).is_none());
        assert!(interpret(r#"{"type":"content_block_start","index":0,"content_block":{"type":"text","text":""}}"#).is_none());
    }

    #[test]
    fn test_interpret_stop_and_error() {
        assert_eq!(
            interpret(r#"{"type":"message_stop"}"#).unwrap().unwrap(),
            StreamChunk::Stop
        );
        let err = interpret(r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#)
            .unwrap()
            .unwrap_err();
        assert!(err.to_string().contains("Overloaded"));
    }

    #[test]
    fn test_new_requires_api_key() {
        let settings = LlmSettings::default();
        assert!(matches!(ClaudeClient::new(&settings), Err(AiError::MissingApiKey)));
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![Message::user("Bonjour")];
        let request = ClaudeRequest {
            model: "claude-test",
            max_tokens: 100,
            messages: &messages,
            system: None,
            stream: Some(true),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "user");
        assert!(json.get("system").is_none());
    }
}
