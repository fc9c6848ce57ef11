//! Crisis gate.
//!
//! A keyword screen run before any retrieval or generation. When it fires,
//! the user gets a fixed safety message and no external service is called.

/// Lower-case phrases that indicate suicidal ideation or self-harm.
pub const CRISIS_PHRASES: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "i am going to die",
    "i want to die",
    "hurt myself",
    "self-harm",
    "want to end",
    "i can't go on",
];

/// Fixed reply sent instead of a generated answer.
pub const SAFETY_MESSAGE: &str = "I’m really sorry you’re feeling so overwhelmed. I’m not equipped to provide emergency help. If you are in immediate danger or think you might harm yourself, please contact your local emergency services or a suicide prevention hotline. Would you like help finding local resources?";

/// Substring matcher over a fixed phrase list.
#[derive(Debug, Clone)]
pub struct CrisisGate {
    phrases: Vec<String>,
}

impl CrisisGate {
    /// Create a gate over [`CRISIS_PHRASES`].
    pub fn new() -> Self {
        Self::with_phrases(CRISIS_PHRASES.iter().copied())
    }

    /// Create a gate over custom phrases. Matching is case-insensitive.
    pub fn with_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// The first phrase found in `text`, if any.
    pub fn detect(&self, text: &str) -> Option<&str> {
        let lowered = normalize_apostrophes(&text.to_lowercase());
        self.phrases
            .iter()
            .find(|phrase| lowered.contains(phrase.as_str()))
            .map(String::as_str)
    }

    /// Whether `text` contains a crisis phrase.
    pub fn is_crisis(&self, text: &str) -> bool {
        self.detect(text).is_some()
    }
}

impl Default for CrisisGate {
    fn default() -> Self {
        Self::new()
    }
}

// Phones and word processors often send curly apostrophes.
fn normalize_apostrophes(text: &str) -> String {
    text.replace(['\u{2018}', '\u{2019}'], "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detects_phrases_case_insensitively() {
        let gate = CrisisGate::new();
        assert_eq!(gate.detect("I want to die"), Some("i want to die"));
        assert_eq!(
            gate.detect("I feeling sad and I WANT TO DIE"),
            Some("i want to die")
        );
        assert!(gate.is_crisis("thinking about self-harm again"));
        assert!(gate.is_crisis("Sometimes I think about suicide"));
    }

    #[test]
    fn test_curly_apostrophe() {
        assert!(CrisisGate::new().is_crisis("I can’t go on like this"));
    }

    #[test]
    fn test_ordinary_messages_pass() {
        let gate = CrisisGate::new();
        assert!(!gate.is_crisis("I feel anxious before exams"));
        assert!(!gate.is_crisis("How can I sleep better?"));
        assert!(!gate.is_crisis(""));
    }

    #[test]
    fn test_custom_phrases() {
        let gate = CrisisGate::with_phrases(["No Way Out", ""]);
        assert!(gate.is_crisis("there is no way out"));
        assert!(!gate.is_crisis("I want to die"));
    }
}
