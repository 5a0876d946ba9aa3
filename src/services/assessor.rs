use async_trait::async_trait;

use crate::models::evaluation::{EvaluationResult, TurnRecord};

/// The external judgement an interview depends on.
///
/// Both calls are infallible at this boundary: implementations degrade their
/// own failures to the score-0 sentinel or a fixed report text, so a session
/// never aborts because the model was unreachable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Assessor: Send + Sync {
    /// Scores `answer` to `question` against `rubric` (which may be empty).
    async fn evaluate_answer(&self, question: &str, answer: &str, rubric: &str)
        -> EvaluationResult;

    /// Writes the narrative report for a finished interview.
    async fn generate_report(&self, results: &[TurnRecord]) -> String;
}
