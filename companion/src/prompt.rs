//! Grounded prompt composition.

use sukoon_retrieval::RetrievalHit;

/// Persona instruction placed at the top of every prompt.
pub const PERSONA: &str = "You are Sukoon AI — a calm, kind, big-brother style mental health companion. Use the context below (do not invent facts). Respond empathetically, in short paragraphs (3–5), practical, and supportive and also suggest some exercises or activities that the user can do to improve their mental health. If the user shows crisis signs, respond with empathy and encourage immediate help.";

/// Join the non-empty hit texts with blank lines.
pub fn build_context(hits: &[RetrievalHit]) -> String {
    hits.iter()
        .map(|hit| hit.text.as_str())
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the generation prompt from retrieved hits and the raw user text.
pub fn compose_prompt(user_text: &str, hits: &[RetrievalHit]) -> String {
    let context = build_context(hits);
    format!("{PERSONA}\n\nContext:\n{context}\n\nUser: {user_text}\n\nSukoon AI:")
}
