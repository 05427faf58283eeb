//! Streaming tool-call orchestration for pharmhand.
//!
//! The orchestrator sequences one chat turn: identity gate, decision
//! call, tool dispatch with deterministic short-circuits, and the final
//! streaming answer. Everything user-visible flows through the fragment
//! receiver it hands back.

pub mod language;
pub mod orchestrator;
pub mod replies;

pub use language::Lang;
pub use orchestrator::Orchestrator;
