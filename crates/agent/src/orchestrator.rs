//! The streaming tool-call orchestration flow.
//!
//! One request runs one sequential flow: identity gate, a non-streaming
//! decision call to learn which tools the model wants, sequential tool
//! dispatch with a deterministic not-found short-circuit, and a final
//! streaming call over the reassembled context. The consumer sees a
//! lazy, forward-only sequence of text fragments on an mpsc receiver;
//! dropping the receiver abandons the flow.

use crate::language;
use crate::replies;
use pharmhand_core::backend::{BackendRequest, ModelBackend, ToolChoice};
use pharmhand_core::input::{ConversationItem, FunctionCallItem, FunctionCallOutputItem};
use pharmhand_core::tool::{FaultCode, ToolEnvelope, ToolRegistry};
use pharmhand_store::LookupStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Fixed system instructions for both model passes.
const SYSTEM_PROMPT: &str = "\
You are a real-time conversational pharmacy assistant for a retail pharmacy chain.

You are STATELESS: do not assume any memory of past messages beyond the current user message and tool outputs.

Language:
- Answer in the same language as the user (Hebrew or English).

Safety / Policy:
- Provide factual information about medications based on the provided tools.
- Use ONLY the internal database provided via tools for factual medical information. Do NOT use any other source.
- You MAY explain dosage/usage instructions as general label-style information (non-personalized).
- NO medical advice, NO diagnosis, NO treatment recommendations, NO suitability judgments.
- Do NOT encourage purchasing.
- If the user requests advice (e.g., “what should I take for…”, “is it safe for me?”, “what do you recommend?”),
  refuse briefly and redirect to a pharmacist/doctor.
- Do NOT end your responses with a follow-up question UNLESS a clarifying question is REQUIRED to use the tools.
- If a medication name is provided in Hebrew - When using tools, pass the english translation of the medical name.
- Style: Be concise and final. Avoid offers like “If you’d like, I can…”. Provide the answer and stop.
- Capability limits: Never claim you can check other branches, check locations, set notifications, place orders, reserve items, arrange pickup, or check refill/pickup status.

Tool usage (IMPORTANT):
- For any question about medication details (dosage/usage/safety), stock/availability, or prescription requirements,
  you MUST use the provided tools and not guess.
- If the medication name is missing or ambiguous, ask a short clarifying question.
";

/// The tool whose missing `user_id` argument is filled from the gate.
const PRESCRIPTION_TOOL: &str = "check_prescription";

/// Orchestrates one chat turn against the model backend.
///
/// Holds no per-request state: every [`Orchestrator::reply`] invocation
/// is independent, so one instance serves concurrent requests.
pub struct Orchestrator {
    backend: Arc<dyn ModelBackend>,
    store: Arc<LookupStore>,
    tools: Arc<ToolRegistry>,
    model: String,
}

impl Orchestrator {
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        store: Arc<LookupStore>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            store,
            tools,
            model: model.into(),
        }
    }

    /// Produce the streamed reply for one `(user_id, message)` request.
    ///
    /// The receiver yields text fragments in emission order and closes
    /// when the turn is finished.
    pub async fn reply(&self, user_id: &str, message: &str) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel::<String>(64);

        let backend = self.backend.clone();
        let store = self.store.clone();
        let tools = self.tools.clone();
        let model = self.model.clone();
        let user_id = user_id.to_string();
        let message = message.to_string();

        tokio::spawn(async move {
            run_turn(backend, store, tools, model, user_id, message, tx).await;
        });

        rx
    }
}

async fn run_turn(
    backend: Arc<dyn ModelBackend>,
    store: Arc<LookupStore>,
    tools: Arc<ToolRegistry>,
    model: String,
    user_id: String,
    message: String,
    tx: mpsc::Sender<String>,
) {
    info!(user_id = %user_id, message = %message, "chat request");

    // Reply language always follows the user's message, not the model's.
    let lang = language::detect(&message);

    // ── User gate: no model call for unknown users ──
    let Some(user) = store.find_user(&user_id) else {
        warn!(user_id = %user_id, "unknown user");
        let _ = tx.send(replies::unknown_user(lang, &user_id)).await;
        return;
    };
    info!(user_id = %user_id, name = %user.name, "user ok");

    let base_input = vec![
        ConversationItem::system(SYSTEM_PROMPT),
        ConversationItem::system(format!(
            "User context: user_id={}, name={}, prescriptions={:?}",
            user.user_id, user.name, user.prescriptions
        )),
        ConversationItem::user(&message),
    ];

    // ── Decision call: which tools, if any ──
    let decision = match backend
        .complete(BackendRequest {
            model: model.clone(),
            input: base_input.clone(),
            tools: tools.definitions(),
            tool_choice: ToolChoice::Auto,
        })
        .await
    {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "decision call failed");
            let _ = tx.send(replies::stream_failure().to_string()).await;
            return;
        }
    };

    let calls: Vec<FunctionCallItem> = decision
        .function_calls()
        .into_iter()
        .cloned()
        .collect();

    info!(
        count = calls.len(),
        calls = ?calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        "model tool calls"
    );

    // ── No tools: stream the direct answer ──
    if calls.is_empty() {
        let request = BackendRequest {
            model,
            input: base_input,
            tools: vec![],
            tool_choice: ToolChoice::Auto,
        };
        relay_stream(backend.as_ref(), request, &tx).await;
        return;
    }

    // ── Execute tools sequentially, one output item per call ──
    let mut envelopes: Vec<ToolEnvelope> = Vec::with_capacity(calls.len());
    let mut outputs: Vec<ConversationItem> = Vec::with_capacity(calls.len());

    for call in &calls {
        let mut args = call.arguments.normalize();

        // The model is never required to repeat the gated user id.
        if call.name == PRESCRIPTION_TOOL && !args.contains_key("user_id") {
            args.insert(
                "user_id".into(),
                serde_json::Value::String(user_id.clone()),
            );
        }

        info!(tool = %call.name, args = ?args, "tool start");
        let envelope = tools.dispatch(&call.name, &args).await;
        info!(
            tool = %call.name,
            ok = envelope.is_success(),
            code = ?envelope.fault_code(),
            "tool end"
        );

        outputs.push(ConversationItem::FunctionCallOutput(
            FunctionCallOutputItem::new(&call.call_id, envelope.to_output_string()),
        ));
        envelopes.push(envelope);
    }

    // ── Deterministic override: a missed lookup never reaches the model ──
    if envelopes
        .iter()
        .any(|e| e.fault_code() == Some(FaultCode::NotFound))
    {
        let _ = tx
            .send(replies::medication_not_found(lang).to_string())
            .await;
        return;
    }

    info!(
        user_id = %user_id,
        tools_used = ?calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        "flow summary"
    );

    // Calls were extracted from this output, so it cannot be empty here;
    // the guard covers the invariant anyway.
    if decision.output.is_empty() {
        let _ = tx.send(replies::missing_tool_context().to_string()).await;
        return;
    }

    // ── Final streaming call over the reassembled context ──
    // Original decision items keep their call ids; each output item
    // references one of them.
    let mut final_input = base_input;
    final_input.extend(decision.output.iter().cloned());
    final_input.extend(outputs);

    let request = BackendRequest {
        model,
        input: final_input,
        tools: tools.definitions(),
        tool_choice: ToolChoice::None,
    };
    relay_stream(backend.as_ref(), request, &tx).await;
}

/// Relay every text delta to the consumer as it arrives. A stream-level
/// error appends one fixed apology line and ends the turn; no retry.
async fn relay_stream(
    backend: &dyn ModelBackend,
    request: BackendRequest,
    tx: &mpsc::Sender<String>,
) {
    let mut stream = match backend.stream(request).await {
        Ok(receiver) => receiver,
        Err(e) => {
            error!(error = %e, "streaming call failed");
            let _ = tx.send(replies::stream_failure().to_string()).await;
            return;
        }
    };

    while let Some(event) = stream.recv().await {
        match event {
            Ok(chunk) => {
                if let Some(delta) = chunk.delta {
                    if tx.send(delta).await.is_err() {
                        return; // consumer gone
                    }
                }
                if chunk.done {
                    return;
                }
            }
            Err(e) => {
                warn!(error = %e, "stream error event");
                let _ = tx.send(replies::stream_failure().to_string()).await;
                return;
            }
        }
    }
}
