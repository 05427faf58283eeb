//! Tool trait, result envelope, and registry.
//!
//! Every lookup tool returns exactly one [`ToolEnvelope`]: a success
//! payload or an error payload with a machine-readable code. Callers
//! branch only on the discriminator, never on payload shape guessing.
//! The registry routes calls by name and converts every failure mode
//! into an envelope; nothing escapes it as a Rust error.

use crate::backend::ToolDefinition;
use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Machine-readable error codes carried in failure envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultCode {
    /// User identifier not present in the store
    UnknownUser,
    /// Medication not present in the store
    NotFound,
    /// The dispatcher received an unrecognized tool name
    UnknownTool,
    /// Unexpected failure during tool execution
    ToolError,
}

/// The error payload of a failure envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolFault {
    pub code: FaultCode,
    pub message: String,
}

/// The discriminated outcome of a tool execution.
#[derive(Debug, Clone)]
pub enum ToolEnvelope {
    /// Operation-specific result fields
    Success(serde_json::Map<String, serde_json::Value>),
    /// An error kind and a human-readable message
    Failure(ToolFault),
}

impl ToolEnvelope {
    /// Build a success envelope from a JSON object of result fields.
    /// A non-object value is wrapped under a `"result"` key.
    pub fn success(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(fields) => Self::Success(fields),
            other => {
                let mut fields = serde_json::Map::new();
                fields.insert("result".into(), other);
                Self::Success(fields)
            }
        }
    }

    /// Build a failure envelope.
    pub fn failure(code: FaultCode, message: impl Into<String>) -> Self {
        Self::Failure(ToolFault {
            code,
            message: message.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The fault code, if this is a failure envelope.
    pub fn fault_code(&self) -> Option<FaultCode> {
        match self {
            Self::Success(_) => None,
            Self::Failure(fault) => Some(fault.code),
        }
    }

    /// The JSON wire shape handed back to the model:
    /// `{"ok": true, ...fields}` or `{"ok": false, "error": {...}}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Success(fields) => {
                let mut object = serde_json::Map::new();
                object.insert("ok".into(), serde_json::Value::Bool(true));
                for (key, value) in fields {
                    object.insert(key.clone(), value.clone());
                }
                serde_json::Value::Object(object)
            }
            Self::Failure(fault) => serde_json::json!({
                "ok": false,
                "error": { "code": fault.code, "message": fault.message },
            }),
        }
    }

    /// The serialized wire shape, for a function-call-output item.
    pub fn to_output_string(&self) -> String {
        serde_json::to_string(&self.to_json()).unwrap_or_default()
    }
}

impl Serialize for ToolEnvelope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// The core Tool trait.
///
/// Each lookup tool implements this trait and is registered in the
/// [`ToolRegistry`], which makes it available to the orchestrator.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "check_stock").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with a normalized argument mapping.
    ///
    /// Domain outcomes, including lookup misses, are envelopes; an `Err`
    /// means the call itself was malformed (missing argument, bad type)
    /// and is turned into a `TOOL_ERROR` envelope by the dispatcher.
    async fn execute(
        &self,
        arguments: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<ToolEnvelope, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// The orchestrator uses this to:
/// 1. Get tool definitions to send to the model
/// 2. Dispatch calls when the model requests them
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions (for sending to the model).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Route a call by tool name.
    ///
    /// Never returns a Rust error: an unrecognized name yields an
    /// `UNKNOWN_TOOL` envelope and a failing tool yields a `TOOL_ERROR`
    /// envelope carrying the failure's message.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: &serde_json::Map<String, serde_json::Value>,
    ) -> ToolEnvelope {
        let Some(tool) = self.get(name) else {
            return ToolEnvelope::failure(
                FaultCode::UnknownTool,
                format!("Tool '{name}' not implemented"),
            );
        };

        match tool.execute(arguments).await {
            Ok(envelope) => envelope,
            Err(e) => ToolEnvelope::failure(FaultCode::ToolError, e.to_string()),
        }
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
