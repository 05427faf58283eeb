//! OpenAI Responses API backend implementation.
//!
//! Talks to `POST {base}/responses` in two modes:
//! - non-streaming, for the tool-use decision call
//! - streaming SSE, for the user-visible answer passes
//!
//! The wire shape is normalized here so the orchestrator only ever sees
//! the core `ConversationItem` / `StreamChunk` types.

use async_trait::async_trait;
use futures::StreamExt;
use pharmhand_core::backend::{
    BackendRequest, BackendResponse, ModelBackend, StreamChunk, StreamReceiver, ToolDefinition,
    Usage,
};
use pharmhand_core::error::BackendError;
use pharmhand_core::input::ConversationItem;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// A backend for the OpenAI Responses API and compatible endpoints.
pub struct OpenAiResponsesBackend {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiResponsesBackend {
    /// Create a new Responses API backend.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create an OpenAI backend (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    /// Convert tool definitions to the Responses API format.
    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            })
            .collect()
    }

    fn request_body(request: &BackendRequest, stream: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "input": request.input,
            "stream": stream,
        });

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
            body["tool_choice"] = serde_json::json!(request.tool_choice);
        }

        body
    }

    fn map_send_error(e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(e.to_string())
        } else {
            BackendError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl ModelBackend for OpenAiResponsesBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        let url = format!("{}/responses", self.base_url);
        let body = Self::request_body(&request, false);

        debug!(backend = %self.name, model = %request.model, "Sending decision request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(BackendError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(BackendError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Backend returned error");
            return Err(BackendError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| BackendError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let usage = api_response.usage.map(|u| Usage {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(BackendResponse {
            output: api_response.output,
            model: api_response.model,
            usage,
        })
    }

    async fn stream(&self, request: BackendRequest) -> Result<StreamReceiver, BackendError> {
        let url = format!("{}/responses", self.base_url);
        let body = Self::request_body(&request, true);

        debug!(backend = %self.name, model = %request.model, "Sending streaming request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(BackendError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(BackendError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Backend streaming error");
            return Err(BackendError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let (tx, rx) = tokio::sync::mpsc::channel(64);
        let backend_name = self.name.clone();

        // Spawn task to read the SSE byte stream and parse events
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(BackendError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                // Append new bytes to our line buffer
                buffer.push_str(&String::from_utf8_lossy(&bytes));

                // Process complete lines
                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim_end_matches('\r').to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    // Skip empty lines, SSE comments, and `event:` framing;
                    // the data payload repeats the event type.
                    if line.is_empty() || line.starts_with(':') || line.starts_with("event:") {
                        continue;
                    }

                    let Some(data) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    let data = data.trim();

                    if data == "[DONE]" {
                        let _ = tx
                            .send(Ok(StreamChunk {
                                delta: None,
                                done: true,
                            }))
                            .await;
                        return;
                    }

                    match serde_json::from_str::<StreamEventPayload>(data) {
                        Ok(event) => match event.kind.as_str() {
                            "response.output_text.delta" => {
                                let chunk = StreamChunk {
                                    delta: event.delta,
                                    done: false,
                                };
                                if tx.send(Ok(chunk)).await.is_err() {
                                    return; // receiver dropped
                                }
                            }
                            "response.error" | "error" => {
                                let message = event
                                    .error
                                    .map(|e| e.message)
                                    .or(event.message)
                                    .unwrap_or_else(|| "stream error event".into());
                                let _ = tx
                                    .send(Err(BackendError::StreamInterrupted(message)))
                                    .await;
                                return;
                            }
                            "response.completed" => {
                                let _ = tx
                                    .send(Ok(StreamChunk {
                                        delta: None,
                                        done: true,
                                    }))
                                    .await;
                                return;
                            }
                            _ => {}
                        },
                        Err(e) => {
                            trace!(
                                backend = %backend_name,
                                data = %data,
                                error = %e,
                                "Ignoring unparseable SSE event"
                            );
                        }
                    }
                }
            }

            // Stream ended without a completed event
            let _ = tx
                .send(Ok(StreamChunk {
                    delta: None,
                    done: true,
                }))
                .await;
        });

        Ok(rx)
    }
}

// --- Responses API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolDefinition {
    r#type: String,
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    #[serde(default)]
    output: Vec<ConversationItem>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
    total_tokens: u32,
}

// --- Streaming SSE types ---

/// A single SSE `data: {...}` event from a streaming response.
///
/// The payload's `type` field mirrors the SSE event name, so the event
/// framing line itself can be skipped.
#[derive(Debug, Deserialize)]
struct StreamEventPayload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    delta: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<ApiStreamError>,
}

#[derive(Debug, Deserialize)]
struct ApiStreamError {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmhand_core::backend::ToolChoice;
    use serde_json::json;

    #[test]
    fn openai_constructor() {
        let backend = OpenAiResponsesBackend::openai("sk-test");
        assert_eq!(backend.name(), "openai");
        assert!(backend.base_url.contains("api.openai.com"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend = OpenAiResponsesBackend::new("test", "http://localhost:9999/v1/", "key");
        assert_eq!(backend.base_url, "http://localhost:9999/v1");
    }

    #[test]
    fn tool_definition_conversion_is_flat() {
        let tools = vec![ToolDefinition {
            name: "check_stock".into(),
            description: "Check stock".into(),
            parameters: json!({"type": "object"}),
        }];
        let api_tools = OpenAiResponsesBackend::to_api_tools(&tools);
        assert_eq!(api_tools.len(), 1);
        assert_eq!(api_tools[0].r#type, "function");
        assert_eq!(api_tools[0].name, "check_stock");

        // Flat shape: name at top level, no nested "function" object.
        let value = serde_json::to_value(&api_tools[0]).unwrap();
        assert_eq!(value["name"], "check_stock");
        assert!(value.get("function").is_none());
    }

    #[test]
    fn request_body_includes_tool_choice_only_with_tools() {
        let without_tools = BackendRequest {
            model: "gpt-5".into(),
            input: vec![ConversationItem::user("hi")],
            tools: vec![],
            tool_choice: ToolChoice::Auto,
        };
        let body = OpenAiResponsesBackend::request_body(&without_tools, false);
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());

        let with_tools = BackendRequest {
            tools: vec![ToolDefinition {
                name: "check_stock".into(),
                description: "Check stock".into(),
                parameters: json!({"type": "object"}),
            }],
            tool_choice: ToolChoice::None,
            ..without_tools
        };
        let body = OpenAiResponsesBackend::request_body(&with_tools, true);
        assert_eq!(body["tool_choice"], "none");
        assert_eq!(body["stream"], true);
        assert_eq!(body["tools"][0]["name"], "check_stock");
    }

    #[test]
    fn parse_decision_response_with_function_calls() {
        let data = json!({
            "id": "resp_1",
            "model": "gpt-5",
            "output": [
                {"type": "reasoning", "id": "rs_1", "summary": []},
                {
                    "type": "function_call",
                    "id": "fc_1",
                    "name": "get_medication_by_name",
                    "arguments": "{\"name\": \"Paracetamol\"}",
                    "call_id": "call_1"
                }
            ],
            "usage": {"input_tokens": 120, "output_tokens": 18, "total_tokens": 138}
        });

        let parsed: ApiResponse = serde_json::from_value(data).unwrap();
        assert_eq!(parsed.model, "gpt-5");
        assert_eq!(parsed.output.len(), 2);

        let calls: Vec<_> = parsed
            .output
            .iter()
            .filter_map(ConversationItem::as_function_call)
            .collect();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "get_medication_by_name");
        assert_eq!(calls[0].call_id, "call_1");
        assert_eq!(parsed.usage.unwrap().total_tokens, 138);
    }

    #[test]
    fn parse_text_delta_event() {
        let data = r#"{"type":"response.output_text.delta","delta":"Para"}"#;
        let event: StreamEventPayload = serde_json::from_str(data).unwrap();
        assert_eq!(event.kind, "response.output_text.delta");
        assert_eq!(event.delta.as_deref(), Some("Para"));
    }

    #[test]
    fn parse_error_event() {
        let data = r#"{"type":"error","error":{"message":"server exploded"}}"#;
        let event: StreamEventPayload = serde_json::from_str(data).unwrap();
        assert_eq!(event.kind, "error");
        assert_eq!(event.error.unwrap().message, "server exploded");
    }

    #[test]
    fn parse_completed_event() {
        let data = r#"{"type":"response.completed","response":{"id":"resp_1"}}"#;
        let event: StreamEventPayload = serde_json::from_str(data).unwrap();
        assert_eq!(event.kind, "response.completed");
        assert!(event.delta.is_none());
    }
}
