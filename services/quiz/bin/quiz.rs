//! Main Entrypoint for the Standalone Quiz Runner
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Loading the capability manifest (and optionally gating on a
//!    simulated invocation utterance, the way the host routes hotwords).
//! 4. Initializing the chat-model client for the configured provider.
//! 5. Running one quiz session against the console responder.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use clap::Parser;
use quiz_core::{
    capability::CapabilityManifest,
    flow::QuizFlow,
    llm_client::{OpenAICompatibleClient, TextGenerator},
    question::QuizConfig,
    responder::{HostSession, Responder},
};
use quiz_service::{
    config::{Config, Provider},
    console::{ConsoleResponder, ConsoleSession},
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "quiz", about = "Run the quiz capability standalone")]
struct Args {
    /// Simulated invocation utterance; when given, the quiz only starts if
    /// it matches one of the manifest's hotwords.
    #[arg(long)]
    utterance: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing capability...");

    // --- 3. Load Capability Manifest ---
    let manifest = CapabilityManifest::from_path(&config.manifest_path)?;
    info!(
        capability = %manifest.unique_name,
        hotwords = ?manifest.matching_hotwords,
        "Capability registered."
    );
    if let Some(utterance) = &args.utterance {
        if !manifest.matches(utterance) {
            info!(%utterance, "Utterance does not match any hotword. Not starting the quiz.");
            return Ok(());
        }
        info!(%utterance, "Utterance routed to this capability.");
    }

    // --- 4. Initialize the Chat-Model Client ---
    let generator: Arc<dyn TextGenerator> = match &config.provider {
        Provider::OpenAI => {
            info!("Using OpenAI provider.");
            let api_key = config.openai_api_key.as_ref().unwrap();
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base("https://api.openai.com/v1/");
            Arc::new(OpenAICompatibleClient::new(
                openai_config,
                config.chat_model.clone(),
            ))
        }
        Provider::Gemini => {
            info!("Using Gemini provider.");
            let api_key = config.gemini_api_key.as_ref().unwrap();
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base("https://generativelanguage.googleapis.com/v1beta/openai");
            Arc::new(OpenAICompatibleClient::new(
                openai_config,
                config.chat_model.clone(),
            ))
        }
    };

    // --- 5. Run the Quiz ---
    let responder: Arc<dyn Responder> = Arc::new(ConsoleResponder::new(generator));
    let session: Arc<dyn HostSession> = Arc::new(ConsoleSession);
    let quiz_config = QuizConfig::new(config.category.clone(), config.num_questions);
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        category = %quiz_config.category,
        questions = quiz_config.num_questions,
        "Capability configured. Starting quiz session..."
    );

    let flow = QuizFlow::new(quiz_config, responder, session);
    let state = flow.run().await?;

    info!(
        correct = state.correct_count,
        asked = state.current_index,
        exited = state.terminated,
        "Quiz session finished."
    );
    Ok(())
}
