use crate::models::session::{ChatMessage, Progress, Stage};
use crate::services::interview_session::InterviewSession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitMessageRequest {
    #[validate(length(min = 1, max = 10000))]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub id: Uuid,
    pub stage: Stage,
    pub messages: Vec<ChatMessage>,
    pub progress: Progress,
    pub average_score: Option<f64>,
    pub retry_pending: bool,
    pub report: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SessionView {
    pub fn from_session(session: &InterviewSession) -> Self {
        Self {
            id: session.id(),
            stage: session.stage(),
            messages: session.messages().to_vec(),
            progress: session.progress(),
            average_score: session.average_score(),
            retry_pending: session.retry_pending(),
            report: session.report().map(|r| r.to_string()),
            created_at: session.created_at(),
        }
    }
}
