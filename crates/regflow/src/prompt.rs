//! Terminal confirmation prompt

use dialoguer::Input;
use regflow_core::{Error, Prompt, Result};

/// Reads operator answers from the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&self, question: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::prompt(e.to_string()))
    }
}
