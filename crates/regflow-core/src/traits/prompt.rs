//! Operator confirmation
//!
//! Paid actions sit behind an interactive double confirmation. The gate is
//! injected into the orchestrator as a [`Prompt`] so tests can substitute a
//! scripted responder and embedders can refuse outright with [`DeclinePrompt`].

/// Source of operator answers
///
/// Implementations return the raw answer text; the caller decides what
/// counts as consent.
pub trait Prompt: Send + Sync {
    /// Show `question` and block until the operator answers
    fn ask(&self, question: &str) -> crate::Result<String>;
}

/// A prompt that answers every question with an empty string
///
/// Any confirmation gate behind it is declined.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclinePrompt;

impl Prompt for DeclinePrompt {
    fn ask(&self, _question: &str) -> crate::Result<String> {
        Ok(String::new())
    }
}
