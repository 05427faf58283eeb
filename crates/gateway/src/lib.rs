//! HTTP chat gateway for pharmhand.
//!
//! Exposes the chat endpoint and a health check. The chat endpoint is
//! stateless: each request carries its own `user_id` and message, and
//! the response body is the orchestrator's fragment stream relayed as
//! `text/plain`.
//!
//! Built on Axum for high performance async HTTP.

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use pharmhand_agent::Orchestrator;
use pharmhand_config::AppConfig;
use pharmhand_core::error::Error;
use pharmhand_providers::OpenAiResponsesBackend;
use pharmhand_store::LookupStore;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: Orchestrator,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
///
/// Builds the backend, store, and tool registry once and shares them
/// across requests; nothing here holds per-request state.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let Some(api_key) = config.api_key.clone() else {
        return Err(Box::new(Error::Config {
            message: "No API key configured — set OPENAI_API_KEY or api_key in config.toml".into(),
        }));
    };

    let backend = Arc::new(OpenAiResponsesBackend::new(
        "openai",
        &config.base_url,
        api_key,
    ));
    let store = Arc::new(LookupStore::seeded());
    let tools = Arc::new(pharmhand_tools::pharmacy_registry(store.clone()));
    let orchestrator = Orchestrator::new(backend, store, tools, &config.model);

    let state = Arc::new(GatewayState {
        orchestrator,
        started_at: chrono::Utc::now(),
    });

    let app = build_router(state);

    info!(addr = %addr, model = %config.model, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: i64,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime = chrono::Utc::now() - state.started_at;
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: uptime.num_seconds(),
    })
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    user_id: String,
    message: String,
}

/// `POST /chat` — relay the orchestrator's fragment stream as a plain
/// text body, in emission order, as it is produced.
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> impl IntoResponse {
    let request_id = uuid::Uuid::new_v4();
    info!(
        %request_id,
        user_id = %payload.user_id,
        message_len = payload.message.len(),
        "chat request received"
    );

    let fragments = state
        .orchestrator
        .reply(&payload.user_id, &payload.message)
        .await;

    let stream =
        ReceiverStream::new(fragments).map(|fragment| Ok::<String, std::convert::Infallible>(fragment));

    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
}
