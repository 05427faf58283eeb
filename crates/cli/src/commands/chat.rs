//! `pharmhand chat` — One-shot message, streamed reply on stdout.

use pharmhand_agent::Orchestrator;
use pharmhand_config::AppConfig;
use pharmhand_providers::OpenAiResponsesBackend;
use pharmhand_store::LookupStore;
use std::io::Write;
use std::sync::Arc;

pub async fn run(user_id: String, message: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let Some(api_key) = config.api_key.clone() else {
        return Err("No API key configured — set OPENAI_API_KEY or api_key in config.toml".into());
    };

    let backend = Arc::new(OpenAiResponsesBackend::new(
        "openai",
        &config.base_url,
        api_key,
    ));
    let store = Arc::new(LookupStore::seeded());
    let tools = Arc::new(pharmhand_tools::pharmacy_registry(store.clone()));
    let orchestrator = Orchestrator::new(backend, store, tools, &config.model);

    let mut fragments = orchestrator.reply(&user_id, &message).await;

    let mut stdout = std::io::stdout();
    while let Some(fragment) = fragments.recv().await {
        print!("{fragment}");
        let _ = stdout.flush();
    }
    println!();

    Ok(())
}
