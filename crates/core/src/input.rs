//! Conversation input and output items.
//!
//! These are the value objects exchanged with the model backend: plain
//! role/content messages, function-call items emitted by a decision call,
//! and function-call-output items carrying tool results back. Items the
//! backend emits that we do not model (reasoning traces, rich message
//! content) are preserved verbatim so they can be replayed in a follow-up
//! request.

use serde::{Deserialize, Serialize};

/// The role of a message in a conversation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (policy, context)
    System,
    /// The end user
    User,
    /// The model
    Assistant,
}

/// A plain role/content message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageItem {
    pub role: Role,
    pub content: String,
}

// Unit enums pin the `type` discriminator of the items below so the
// untagged `ConversationItem` can tell them apart during deserialization.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum FunctionCallTag {
    #[serde(rename = "function_call")]
    FunctionCall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum FunctionCallOutputTag {
    #[serde(rename = "function_call_output")]
    FunctionCallOutput,
}

/// Raw tool-call arguments as the backend sent them.
///
/// Backends emit either an already-structured JSON object or a textual
/// encoding that still needs parsing. The union is resolved by
/// [`ToolArguments::normalize`] before anything reaches a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolArguments {
    Structured(serde_json::Map<String, serde_json::Value>),
    Text(String),
    /// Anything else (null, arrays, numbers). Normalizes to an empty map.
    Other(serde_json::Value),
}

impl ToolArguments {
    /// Resolve into one canonical key/value mapping.
    ///
    /// A textual payload that fails to parse as a JSON object yields an
    /// empty mapping; a parse failure is never propagated.
    pub fn normalize(&self) -> serde_json::Map<String, serde_json::Value> {
        match self {
            Self::Structured(map) => map.clone(),
            Self::Text(raw) => match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(serde_json::Value::Object(map)) => map,
                _ => serde_json::Map::new(),
            },
            Self::Other(_) => serde_json::Map::new(),
        }
    }
}

/// A function-call item from a decision-call response.
///
/// `call_id` binds this call to its eventual output item. Fields the
/// backend adds beyond the ones we read (item ids, status) are kept in
/// `extra` so the item serializes back exactly as it arrived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCallItem {
    #[serde(rename = "type")]
    tag: FunctionCallTag,

    /// Name of the tool to invoke
    pub name: String,

    /// Raw argument payload, structured or textual
    pub arguments: ToolArguments,

    /// Correlation identifier for the matching output item
    pub call_id: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FunctionCallItem {
    pub fn new(
        name: impl Into<String>,
        arguments: ToolArguments,
        call_id: impl Into<String>,
    ) -> Self {
        Self {
            tag: FunctionCallTag::FunctionCall,
            name: name.into(),
            arguments,
            call_id: call_id.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// A tool result item, paired to its originating call by `call_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCallOutputItem {
    #[serde(rename = "type")]
    tag: FunctionCallOutputTag,

    /// Correlation identifier of the originating function call
    pub call_id: String,

    /// JSON-serialized tool result envelope
    pub output: String,
}

impl FunctionCallOutputItem {
    pub fn new(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tag: FunctionCallOutputTag::FunctionCallOutput,
            call_id: call_id.into(),
            output: output.into(),
        }
    }
}

/// One item in a conversation input or a decision-call output.
///
/// Variant order matters: the tagged items are tried first, then plain
/// messages, and anything unrecognized falls through to `Other` with its
/// payload intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConversationItem {
    FunctionCall(FunctionCallItem),
    FunctionCallOutput(FunctionCallOutputItem),
    Message(MessageItem),
    Other(serde_json::Value),
}

impl ConversationItem {
    /// Create a system message item.
    pub fn system(content: impl Into<String>) -> Self {
        Self::Message(MessageItem {
            role: Role::System,
            content: content.into(),
        })
    }

    /// Create a user message item.
    pub fn user(content: impl Into<String>) -> Self {
        Self::Message(MessageItem {
            role: Role::User,
            content: content.into(),
        })
    }

    /// Borrow this item as a function call, if it is one.
    pub fn as_function_call(&self) -> Option<&FunctionCallItem> {
        match self {
            Self::FunctionCall(call) => Some(call),
            _ => None,
        }
    }
}
