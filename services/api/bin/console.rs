//! Interactive Console Session
//!
//! Runs one complete Amie session on the terminal: profile slot-filling on
//! first use, then the full turn loop until the user says goodbye. Uses the
//! same configuration and reply backend as the web service.

use amie_api::config::{Config, Provider};
use amie_core::{
    ConsoleInput, ConsoleOutput, DialogueEngine, EngineConfig, JsonProfileStore, Lexicon,
    OpenAIReplyGenerator, ProfileStore, ReplyGenerator, SessionRuntime,
};
use anyhow::Context;
use async_openai::config::OpenAIConfig;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();

    let reply_gen: Arc<dyn ReplyGenerator> = match &config.provider {
        Provider::OpenAI => {
            let api_key = config
                .openai_api_key
                .as_ref()
                .context("OPENAI_API_KEY is checked at config load")?;
            Arc::new(OpenAIReplyGenerator::new(
                OpenAIConfig::new()
                    .with_api_key(api_key)
                    .with_api_base("https://api.openai.com/v1/"),
                config.chat_model.clone(),
            ))
        }
        Provider::Gemini => {
            let api_key = config
                .gemini_api_key
                .as_ref()
                .context("GEMINI_API_KEY is checked at config load")?;
            Arc::new(OpenAIReplyGenerator::new(
                OpenAIConfig::new()
                    .with_api_key(api_key)
                    .with_api_base("https://generativelanguage.googleapis.com/v1beta/openai"),
                config.chat_model.clone(),
            ))
        }
    };

    let store: Arc<dyn ProfileStore> = Arc::new(JsonProfileStore::new(config.profile_path.clone()));
    let profile = store.load().await?;
    info!(returning = profile.is_some(), "Starting console session");

    let engine = DialogueEngine::new(
        Arc::new(Lexicon::default()),
        reply_gen,
        store,
        EngineConfig {
            collect_feedback: config.collect_feedback,
            ..EngineConfig::default()
        },
        profile,
    );

    let runtime = SessionRuntime::new(engine, Arc::new(ConsoleInput::new()), Arc::new(ConsoleOutput));
    runtime.run().await;

    Ok(())
}
