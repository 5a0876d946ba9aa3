use crate::error::{Error, Result};
use crate::services::interview_session::InterviewSession;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

/// A session guarded so that only one submission runs against it at a time.
pub type SharedSession = Arc<Mutex<InterviewSession>>;

/// How long sessions stay in the store without input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRetention {
    pub idle_ttl: Duration,
    pub finished_ttl: Duration,
}

impl Default for SessionRetention {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(30 * 60),
            finished_ttl: Duration::from_secs(5 * 60),
        }
    }
}

/// In-memory registry of live sessions. Nothing here outlives the process.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: InterviewSession) -> SharedSession {
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .insert(id, shared.clone());
        shared
    }

    pub fn get(&self, id: Uuid) -> Result<SharedSession> {
        self.sessions
            .read()
            .expect("session store lock poisoned")
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Interview session {} not found", id)))
    }

    pub fn remove(&self, id: Uuid) -> Result<()> {
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("Interview session {} not found", id)))
    }

    /// Drops every session past its retention as of `now` and returns how many
    /// went. Sessions locked by an in-flight turn are left for the next sweep.
    pub fn evict_expired(&self, now: DateTime<Utc>, retention: SessionRetention) -> usize {
        let mut sessions = self.sessions.write().expect("session store lock poisoned");
        let before = sessions.len();
        sessions.retain(|_, shared| match shared.try_lock() {
            Ok(session) => !session.is_expired(now, retention.idle_ttl, retention.finished_ttl),
            Err(_) => true,
        });
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().expect("session store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
