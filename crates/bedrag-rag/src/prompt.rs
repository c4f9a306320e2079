//! Prompt construction

use serde::{Deserialize, Serialize};

use bedrag_core::Prompt;

pub const DEFAULT_PREAMBLE: &str = "Given the following context, please answer the question.";
pub const DEFAULT_ANSWER_CUE: &str = "Based on the provided context, my answer is:";

/// Builds generation prompts from a query and ranked context passages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptBuilder {
    preamble: String,
    answer_cue: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            preamble: DEFAULT_PREAMBLE.to_string(),
            answer_cue: DEFAULT_ANSWER_CUE.to_string(),
        }
    }
}

impl PromptBuilder {
    pub fn new(preamble: impl Into<String>, answer_cue: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            answer_cue: answer_cue.into(),
        }
    }

    /// Render the prompt.
    ///
    /// With no contexts the result is the bare query, which is exactly what
    /// the no-retrieval path sends.
    pub fn build<S: AsRef<str>>(&self, query: &str, contexts: &[S]) -> Prompt {
        if contexts.is_empty() {
            return Prompt::new(query);
        }

        let mut prompt = String::new();
        prompt.push_str(&self.preamble);
        prompt.push_str("\n\nContext:\n");
        for (rank, context) in contexts.iter().enumerate() {
            prompt.push_str(&format!("[{}] {}\n", rank + 1, context.as_ref()));
        }
        prompt.push_str("\nQuestion: ");
        prompt.push_str(query);
        prompt.push_str("\n\n");
        prompt.push_str(&self.answer_cue);

        Prompt::new(prompt)
    }
}
