//! The per-turn entry point.
//!
//! Each turn runs `crisis check -> retrieve -> compose -> generate`, or stops
//! at the crisis check with the fixed safety message. Nothing carries over
//! between turns.

use std::sync::Arc;

use sukoon_retrieval::{RetrievalHit, Retriever};
use tracing::{debug, error, warn};

use crate::crisis::{CrisisGate, SAFETY_MESSAGE};
use crate::error::{CompanionError, Result};
use crate::generation::{GenerationProvider, extract_reply};
use crate::prompt::compose_prompt;

/// Reply shown when a turn fails for any reason other than an empty message.
pub const FALLBACK_MESSAGE: &str =
    "Sorry, something went wrong on my side. Please try again in a moment.";

/// How a reply was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Fixed safety message; nothing was retrieved or generated.
    Safety,
    /// Generated from retrieved context.
    Generated,
}

/// The answer to one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,

    pub kind: ReplyKind,

    /// Some context came from metadata previews or was missing, so the
    /// model saw truncated or no text for those hits.
    pub degraded: bool,
}

/// Answers user messages with retrieval-grounded generation.
pub struct Companion {
    gate: CrisisGate,
    retriever: Retriever,
    generator: Arc<dyn GenerationProvider>,
}

impl Companion {
    pub fn new(retriever: Retriever, generator: Arc<dyn GenerationProvider>) -> Self {
        Self {
            gate: CrisisGate::new(),
            retriever,
            generator,
        }
    }

    /// Replace the crisis gate.
    pub fn with_crisis_gate(mut self, gate: CrisisGate) -> Self {
        self.gate = gate;
        self
    }

    /// Answer one message, surfacing any failure.
    pub async fn respond(&self, user_text: &str) -> Result<Reply> {
        if user_text.trim().is_empty() {
            return Err(CompanionError::EmptyMessage);
        }

        if let Some(phrase) = self.gate.detect(user_text) {
            warn!("Crisis phrase {phrase:?} detected; returning safety message");
            return Ok(Reply {
                text: SAFETY_MESSAGE.to_string(),
                kind: ReplyKind::Safety,
                degraded: false,
            });
        }

        let hits = self.retriever.retrieve(user_text).await?;
        let degraded = hits.iter().any(RetrievalHit::is_degraded);
        debug!("Retrieved {} hits (degraded={degraded})", hits.len());

        let prompt = compose_prompt(user_text, &hits);
        let response = self.generator.generate(&prompt).await?;

        Ok(Reply {
            text: extract_reply(&response),
            kind: ReplyKind::Generated,
            degraded,
        })
    }

    /// Answer one message with a reply that is always safe to show.
    ///
    /// Failures are logged and replaced with [`FALLBACK_MESSAGE`].
    pub async fn handle_user_input(&self, user_text: &str) -> String {
        match self.respond(user_text).await {
            Ok(reply) => reply.text,
            Err(CompanionError::EmptyMessage) => CompanionError::EmptyMessage.to_string(),
            Err(e) => {
                error!("Failed to answer message: {e}");
                FALLBACK_MESSAGE.to_string()
            }
        }
    }
}
