//! Console-backed implementations of the capability's trait seams.
//!
//! In the hosting agent framework, speaking and listening go through the
//! voice pipeline. For standalone runs this module stands in with stdout
//! and stdin while model calls go through a real [`TextGenerator`].

use anyhow::Result;
use async_trait::async_trait;
use quiz_core::{
    llm_client::TextGenerator,
    responder::{Exchange, HostSession, Responder},
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// A `Responder` that prints spoken lines and reads user utterances from
/// the terminal.
pub struct ConsoleResponder {
    generator: Arc<dyn TextGenerator>,
}

impl ConsoleResponder {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Responder for ConsoleResponder {
    async fn respond(&self, prompt: String, history: Vec<Exchange>) -> Result<String> {
        self.generator.complete(prompt, history).await
    }

    async fn speak(&self, text: String) -> Result<()> {
        // Pass-through to the diagnostic log, mirroring what the host's
        // voice pipeline would record.
        info!(line = %text, "speak");
        println!("{text}");
        Ok(())
    }

    async fn user_response(&self) -> Result<String> {
        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        Ok(line.trim().to_string())
    }
}

/// Host-session stand-in for standalone runs: there is no surrounding
/// agent to hand control back to, so the hand-back is just logged.
pub struct ConsoleSession;

#[async_trait]
impl HostSession for ConsoleSession {
    async fn resume_normal_flow(&self) {
        info!("Hand-back received. Resuming normal flow.");
    }
}
