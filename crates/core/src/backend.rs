//! ModelBackend trait: the abstraction over LLM backends.
//!
//! A backend knows how to send a conversation input to a model and get a
//! response back, either as a complete decision response or as a stream
//! of text deltas. The backend is constructed once at startup and handed
//! to the orchestrator as an injected dependency.

use crate::error::BackendError;
use crate::input::{ConversationItem, FunctionCallItem};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Tool-choice policy for a backend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// The model decides freely whether to invoke tools.
    Auto,
    /// Tool calling is disabled for this request.
    None,
}

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// Configuration for a backend request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendRequest {
    /// The model to use (e.g., "gpt-5")
    pub model: String,

    /// The ordered conversation input items
    pub input: Vec<ConversationItem>,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Tool-choice policy
    pub tool_choice: ToolChoice,
}

/// A complete (non-streaming) decision response from a backend.
///
/// `output` is kept verbatim: a follow-up request that feeds tool results
/// back must include the original function-call items, not a paraphrase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendResponse {
    /// The output items, in the order the backend returned them
    pub output: Vec<ConversationItem>,

    /// Which model actually responded
    pub model: String,

    /// Token usage statistics
    pub usage: Option<Usage>,
}

impl BackendResponse {
    /// Every function-call item in the output, in backend order.
    pub fn function_calls(&self) -> Vec<&FunctionCallItem> {
        self.output
            .iter()
            .filter_map(ConversationItem::as_function_call)
            .collect()
    }
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

/// A single chunk in a streaming response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Partial text delta
    #[serde(default)]
    pub delta: Option<String>,

    /// Whether this is the final chunk
    #[serde(default)]
    pub done: bool,
}

/// The receiver half of a backend text stream.
///
/// A stream-level error event from the backend arrives as an `Err` on
/// the channel; the sequence is forward-only and single-pass.
pub type StreamReceiver = tokio::sync::mpsc::Receiver<Result<StreamChunk, BackendError>>;

/// The core ModelBackend trait.
///
/// The orchestrator calls `complete()` for the decision pass and
/// `stream()` for the answer passes without knowing which backend is in
/// use.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// A human-readable name for this backend (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete decision response.
    async fn complete(&self, request: BackendRequest) -> Result<BackendResponse, BackendError>;

    /// Send a request and get a lazy stream of response chunks.
    async fn stream(&self, request: BackendRequest) -> Result<StreamReceiver, BackendError>;
}
