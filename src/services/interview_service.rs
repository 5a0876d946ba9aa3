use crate::dto::interview_dto::SessionView;
use crate::error::Result;
use crate::services::assessor::Assessor;
use crate::services::interview_session::InterviewSession;
use crate::services::question_bank::QuestionBank;
use crate::services::session_store::{SessionRetention, SessionStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct InterviewService {
    bank: Arc<QuestionBank>,
    store: SessionStore,
    assessor: Arc<dyn Assessor>,
    interview_length: usize,
    retention: SessionRetention,
}

impl InterviewService {
    pub fn new(
        bank: Arc<QuestionBank>,
        assessor: Arc<dyn Assessor>,
        interview_length: usize,
    ) -> Self {
        Self {
            bank,
            store: SessionStore::new(),
            assessor,
            interview_length,
            retention: SessionRetention::default(),
        }
    }

    pub fn with_retention(mut self, retention: SessionRetention) -> Self {
        self.retention = retention;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let evicted = self.store.evict_expired(now, self.retention);
        if evicted > 0 {
            tracing::info!(
                evicted,
                remaining = self.store.len(),
                "Evicted expired interview sessions"
            );
        }
        evicted
    }

    pub async fn start_session(&self) -> SessionView {
        self.evict_expired(Utc::now());
        let questions = self
            .bank
            .sample(self.interview_length, &mut rand::thread_rng());
        let shared = self.store.insert(InterviewSession::new(questions));
        let session = shared.lock().await;
        tracing::info!(
            session_id = %session.id(),
            questions = session.total_questions(),
            "Interview session created"
        );
        SessionView::from_session(&session)
    }

    pub async fn get_session(&self, id: Uuid) -> Result<SessionView> {
        let shared = self.store.get(id)?;
        let session = shared.lock().await;
        Ok(SessionView::from_session(&session))
    }

    pub async fn submit(&self, id: Uuid, text: &str) -> Result<SessionView> {
        let shared = self.store.get(id)?;
        let mut session = shared.lock().await;
        let outcome = session
            .submit_user_input(text, self.assessor.as_ref())
            .await?;
        tracing::info!(
            session_id = %id,
            outcome = ?outcome,
            answered = session.question_index(),
            "Processed interview turn"
        );
        Ok(SessionView::from_session(&session))
    }

    pub fn end_session(&self, id: Uuid) -> Result<()> {
        self.store.remove(id)?;
        tracing::info!(session_id = %id, "Interview session ended");
        Ok(())
    }
}
