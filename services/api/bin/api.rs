//! Main Entrypoint for the Amie API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing the reply backend and the profile store.
//! 3. Constructing the Axum router and applying middleware.
//! 4. Starting the web server and handling graceful shutdown.

use amie_api::{
    config::{Config, Provider},
    router::create_router,
    state::AppState,
};
use amie_core::{
    EngineConfig, JsonProfileStore, Lexicon, OpenAIReplyGenerator, ProfileStore, ReplyGenerator,
};
use anyhow::Context;
use async_openai::config::OpenAIConfig;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Shared Services ---
    let reply_gen: Arc<dyn ReplyGenerator> = match &config.provider {
        Provider::OpenAI => {
            info!("Using OpenAI provider.");
            let api_key = config
                .openai_api_key
                .as_ref()
                .context("OPENAI_API_KEY is checked at config load")?;
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base("https://api.openai.com/v1/");
            Arc::new(OpenAIReplyGenerator::new(
                openai_config,
                config.chat_model.clone(),
            ))
        }
        Provider::Gemini => {
            info!("Using Gemini provider.");
            let api_key = config
                .gemini_api_key
                .as_ref()
                .context("GEMINI_API_KEY is checked at config load")?;
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base("https://generativelanguage.googleapis.com/v1beta/openai");
            Arc::new(OpenAIReplyGenerator::new(
                openai_config,
                config.chat_model.clone(),
            ))
        }
    };

    let profile_store: Arc<dyn ProfileStore> =
        Arc::new(JsonProfileStore::new(config.profile_path.clone()));

    let engine_config = EngineConfig {
        collect_feedback: config.collect_feedback,
        ..EngineConfig::default()
    };

    let app_state = Arc::new(AppState {
        lexicon: Arc::new(Lexicon::default()),
        reply_gen,
        profile_store,
        engine_config,
        sessions: Arc::new(Mutex::new(HashMap::new())),
        config: Arc::new(config.clone()),
    });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server has shut down.");
    Ok(())
}
