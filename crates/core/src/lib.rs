//! # pharmhand Core
//!
//! Domain types, traits, and error definitions for the pharmhand chat
//! assistant. This crate has **zero framework dependencies**: it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in
//! their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod backend;
pub mod error;
pub mod input;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use backend::{
    BackendRequest, BackendResponse, ModelBackend, StreamChunk, StreamReceiver, ToolChoice,
    ToolDefinition, Usage,
};
pub use error::{BackendError, Error, Result, ToolError};
pub use input::{
    ConversationItem, FunctionCallItem, FunctionCallOutputItem, MessageItem, Role, ToolArguments,
};
pub use tool::{FaultCode, Tool, ToolEnvelope, ToolFault, ToolRegistry};
