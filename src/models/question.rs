use serde::{Deserialize, Serialize};

pub const DEFAULT_HINT: &str = "Let's think about that from another angle.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    #[serde(default)]
    pub rubric: String,
    #[serde(default = "default_hint")]
    pub hint: String,
}

fn default_hint() -> String {
    DEFAULT_HINT.to_string()
}

impl QuestionRecord {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            rubric: String::new(),
            hint: default_hint(),
        }
    }

    pub fn with_rubric(mut self, rubric: impl Into<String>) -> Self {
        self.rubric = rubric.into();
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    /// Hint shown on a retry. Blank hints in the bank fall back to the generic one.
    pub fn hint_or_default(&self) -> &str {
        if self.hint.trim().is_empty() {
            DEFAULT_HINT
        } else {
            &self.hint
        }
    }
}
