//! # Companion
//!
//! The conversational layer of Sukoon AI: a crisis gate in front of
//! retrieval-grounded generation.
//!
//! ```text
//! user text ──► CrisisGate ──► crisis?  ── yes ──► SAFETY_MESSAGE
//!                                 │
//!                                 no
//!                                 ▼
//!               Retriever ──► compose_prompt ──► GenerationProvider ──► extract_reply
//! ```

pub mod companion;
pub mod crisis;
pub mod error;
pub mod generation;
pub mod prompt;

pub use companion::{Companion, FALLBACK_MESSAGE, Reply, ReplyKind};
pub use crisis::{CRISIS_PHRASES, CrisisGate, SAFETY_MESSAGE};
pub use error::{CompanionError, Result};
pub use generation::{
    DEFAULT_GENERATION_MODEL, GeminiGenerator, GenerationConfig, GenerationProvider,
    extract_reply,
};
pub use prompt::{PERSONA, build_context, compose_prompt};
