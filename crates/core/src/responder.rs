//! The narrow interfaces the quiz flow consumes.
//!
//! The hosting agent framework owns text-to-speech, speech-to-text and the
//! language model; the flow only ever talks to them through [`Responder`].
//! [`HostSession`] is the handle used to give control back to the host once
//! the quiz is over.

use anyhow::Result;
use async_trait::async_trait;

/// Who produced a prior line of conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One prior exchange supplied as conversation history to [`Responder::respond`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub role: Role,
    pub content: String,
}

impl Exchange {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Abstraction over the language-model / TTS / STT boundary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Responder: Send + Sync {
    /// Sends a prompt (plus optional history) to the model and returns the
    /// generated text.
    async fn respond(&self, prompt: String, history: Vec<Exchange>) -> Result<String>;

    /// Vocalizes or displays a line to the user.
    async fn speak(&self, text: String) -> Result<()>;

    /// Blocks until the user's next utterance is available.
    async fn user_response(&self) -> Result<String>;
}

/// The hosting framework's control handle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostSession: Send + Sync {
    /// Hands control back to the host's default behavior. Called exactly
    /// once per quiz run, whether it completed or the user exited early.
    async fn resume_normal_flow(&self);
}
