use serde::{Deserialize, Serialize};

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;
/// Score recorded when the evaluator could not produce a rubric score.
pub const FAILED_SCORE: i32 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: i32,
    pub justification: String,
}

impl EvaluationResult {
    pub fn new(score: i32, justification: impl Into<String>) -> Self {
        Self {
            score,
            justification: justification.into(),
        }
    }

    pub fn failed(detail: impl std::fmt::Display) -> Self {
        Self {
            score: FAILED_SCORE,
            justification: format!("Error during evaluation. Details: {}", detail),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.score == FAILED_SCORE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub question: String,
    pub answer: String,
    pub evaluation: EvaluationResult,
}
