use crate::error::{Error, Result};
use crate::models::evaluation::TurnRecord;
use crate::models::question::QuestionRecord;
use crate::models::session::{ChatMessage, Progress, Stage};
use crate::services::assessor::Assessor;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

/// Scores below this earn a hint and one more attempt.
pub const RETRY_SCORE_THRESHOLD: i32 = 3;
/// A running average strictly below this ends the interview early.
pub const EARLY_STOP_AVERAGE: f64 = 3.0;

const EARLY_STOP_MESSAGE: &str = "Thank you for your time. Based on the responses so far, I have enough information to complete the assessment. I will now generate your performance report.";
const COMPLETION_MESSAGE: &str = "Thank you, that was the final question. Please wait a moment while I generate your performance report.";
const NO_QUESTIONS_MESSAGE: &str = "There are no questions available for this session. I will now generate your performance report.";

/// What a single submission did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Input in the welcome stage that did not ask to start.
    Ignored,
    Started,
    RetryRequested,
    Advanced,
    EarlyStopped,
    Completed,
}

/// One user's interview, from the welcome message to the cached report.
///
/// All mutation goes through [`InterviewSession::submit_user_input`]; the
/// remaining methods are read-only views for the presentation layer.
#[derive(Debug, Clone)]
pub struct InterviewSession {
    id: Uuid,
    stage: Stage,
    question_index: usize,
    questions: Vec<QuestionRecord>,
    results: Vec<TurnRecord>,
    retry_pending: bool,
    messages: Vec<ChatMessage>,
    report: Option<String>,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl InterviewSession {
    pub fn new(questions: Vec<QuestionRecord>) -> Self {
        let welcome = welcome_message(questions.len());
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            stage: Stage::Welcome,
            question_index: 0,
            questions,
            results: Vec::new(),
            retry_pending: false,
            messages: vec![ChatMessage::assistant(welcome)],
            report: None,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn results(&self) -> &[TurnRecord] {
        &self.results
    }

    pub fn retry_pending(&self) -> bool {
        self.retry_pending
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last accepted input, or creation if there was none.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Time since the last accepted input as of `now`; zero if `now` is earlier.
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_activity).to_std().unwrap_or(Duration::ZERO)
    }

    /// Finished sessions are kept for `finished_ttl` after their final turn,
    /// the rest for `idle_ttl` after their last input.
    pub fn is_expired(&self, now: DateTime<Utc>, idle_ttl: Duration, finished_ttl: Duration) -> bool {
        let ttl = if self.stage == Stage::Finished {
            finished_ttl
        } else {
            idle_ttl
        };
        self.idle_for(now) >= ttl
    }

    pub fn progress(&self) -> Progress {
        Progress::new(self.question_index, self.questions.len())
    }

    /// Mean score over recorded results; `None` until the first answer is accepted.
    pub fn average_score(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        let total: i32 = self.results.iter().map(|r| r.evaluation.score).sum();
        Some(total as f64 / self.results.len() as f64)
    }

    pub async fn submit_user_input(
        &mut self,
        text: &str,
        assessor: &dyn Assessor,
    ) -> Result<TurnOutcome> {
        if self.stage == Stage::Finished {
            return Err(Error::Conflict("interview_finished".to_string()));
        }
        if text.trim().is_empty() {
            return Err(Error::BadRequest("Answer must not be empty".to_string()));
        }

        self.last_activity = Utc::now();
        self.messages.push(ChatMessage::user(text));

        match self.stage {
            Stage::Welcome => self.handle_welcome(text, assessor).await,
            Stage::Interviewing => self.handle_answer(text, assessor).await,
            Stage::Finished => Err(Error::Conflict("interview_finished".to_string())),
        }
    }

    /// Generates the report on first call and returns the cached text afterwards.
    pub async fn ensure_report(&mut self, assessor: &dyn Assessor) -> &str {
        if self.report.is_none() {
            tracing::info!(session_id = %self.id, results = self.results.len(), "Generating final report");
            let report = assessor.generate_report(&self.results).await;
            self.report = Some(report);
        }
        self.report.as_deref().unwrap_or_default()
    }

    async fn handle_welcome(&mut self, text: &str, assessor: &dyn Assessor) -> Result<TurnOutcome> {
        if !text.to_lowercase().contains("start") {
            return Ok(TurnOutcome::Ignored);
        }

        if self.questions.is_empty() {
            tracing::warn!(session_id = %self.id, "Interview started with no questions");
            self.finish(NO_QUESTIONS_MESSAGE, assessor).await;
            return Ok(TurnOutcome::Completed);
        }

        let first = self.questions[0].question.clone();
        self.stage = Stage::Interviewing;
        self.messages.push(ChatMessage::assistant(first));
        tracing::info!(session_id = %self.id, total = self.questions.len(), "Interview started");
        Ok(TurnOutcome::Started)
    }

    async fn handle_answer(&mut self, answer: &str, assessor: &dyn Assessor) -> Result<TurnOutcome> {
        let current = self
            .questions
            .get(self.question_index)
            .cloned()
            .ok_or_else(|| Error::Internal("Question index out of range".to_string()))?;

        let evaluation = assessor
            .evaluate_answer(&current.question, answer, &current.rubric)
            .await;
        if evaluation.is_failure() {
            tracing::warn!(session_id = %self.id, "Evaluation failed, recording sentinel score");
        }

        if evaluation.score < RETRY_SCORE_THRESHOLD && !self.retry_pending {
            self.retry_pending = true;
            self.messages.push(ChatMessage::assistant(format!(
                "That's not quite what I was looking for. Here's a hint: *{}* \n\nWhy don't you try answering that question again?",
                current.hint_or_default()
            )));
            tracing::info!(
                session_id = %self.id,
                question = self.question_index + 1,
                score = evaluation.score,
                "Low score, offering a retry"
            );
            return Ok(TurnOutcome::RetryRequested);
        }

        self.retry_pending = false;
        tracing::info!(
            session_id = %self.id,
            question = self.question_index + 1,
            score = evaluation.score,
            "Answer accepted"
        );
        self.results.push(TurnRecord {
            question: current.question,
            answer: answer.to_string(),
            evaluation,
        });
        self.question_index += 1;

        let total = self.questions.len();
        if self.should_stop_early() {
            tracing::info!(
                session_id = %self.id,
                answered = self.question_index,
                total,
                "Stopping interview early"
            );
            self.finish(EARLY_STOP_MESSAGE, assessor).await;
            Ok(TurnOutcome::EarlyStopped)
        } else if self.question_index < total {
            let next = &self.questions[self.question_index].question;
            self.messages.push(ChatMessage::assistant(format!(
                "Thank you. Here is the next question:\n\n{}",
                next
            )));
            Ok(TurnOutcome::Advanced)
        } else {
            self.finish(COMPLETION_MESSAGE, assessor).await;
            Ok(TurnOutcome::Completed)
        }
    }

    fn should_stop_early(&self) -> bool {
        if self.question_index < early_stop_threshold(self.questions.len()) {
            return false;
        }
        match self.average_score() {
            Some(avg) => avg > 0.0 && avg < EARLY_STOP_AVERAGE,
            None => false,
        }
    }

    async fn finish(&mut self, closing: &str, assessor: &dyn Assessor) {
        self.stage = Stage::Finished;
        self.retry_pending = false;
        self.messages.push(ChatMessage::assistant(closing));
        self.ensure_report(assessor).await;
    }
}

/// `ceil(0.75 * total)`: the answered count from which early stopping is considered.
pub fn early_stop_threshold(total: usize) -> usize {
    (3 * total + 3) / 4
}

fn welcome_message(total: usize) -> String {
    format!(
        r#"Hello! I'm your adaptive AI interviewer.

**Here's how this will work:**
1.  I will ask you a series of questions to assess your Excel skills.
2.  If an answer isn't quite right, I may give you a hint and a chance to try again.
3.  The interview will adapt based on your performance and may end early if a clear skill level is determined.

This session will have up to **{} questions**. Ready? Type **'start'**.
"#,
        total
    )
}
