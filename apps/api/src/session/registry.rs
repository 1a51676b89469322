use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::analysis::models::AnalysisResult;
use crate::errors::AppError;
use crate::session::history::{HistoryEntry, HistoryStore};
use crate::session::learning::{ImprovementExtractor, LearningInsights};

/// One user's analysis history and learned insights. Never shared between users.
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    history: HistoryStore,
}

impl Session {
    fn new(extractor: Arc<dyn ImprovementExtractor>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            history: HistoryStore::new(extractor),
        }
    }

    pub fn record_analysis(
        &mut self,
        resume_text: String,
        results: AnalysisResult,
        job_description: Option<String>,
        is_modified: bool,
    ) -> HistoryEntry {
        self.history
            .append(resume_text, results, job_description, is_modified)
            .clone()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    pub fn insights(&self) -> LearningInsights {
        self.history.insights()
    }

    pub fn personalized_hints(&self, resume_text: &str) -> Vec<String> {
        self.history.personalized_hints(resume_text)
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

/// Process-wide map of live sessions, keyed by session id.
///
/// Every accessor addresses exactly one session. Closures run under the lock,
/// so callers must not hold on to borrowed session data across an `.await`.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    extractor: Arc<dyn ImprovementExtractor>,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(extractor: Arc<dyn ImprovementExtractor>, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            extractor,
            max_sessions,
        }
    }

    /// Opens a fresh, empty session and returns its id and creation time.
    /// Fails with `Capacity` once `max_sessions` sessions are live.
    pub fn create(&self) -> Result<(Uuid, DateTime<Utc>), AppError> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        if sessions.len() >= self.max_sessions {
            return Err(AppError::Capacity(format!(
                "Session limit of {} reached; end an existing session first",
                self.max_sessions
            )));
        }

        let session = Session::new(Arc::clone(&self.extractor));
        let created = (session.id, session.created_at);
        sessions.insert(session.id, session);
        Ok(created)
    }

    pub fn read<R>(&self, id: Uuid, f: impl FnOnce(&Session) -> R) -> Result<R, AppError> {
        let sessions = self.sessions.read().map_err(|_| poisoned())?;
        let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
        Ok(f(session))
    }

    pub fn write<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Result<R, AppError> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        Ok(f(session))
    }

    /// Ends a session, discarding its history and insights.
    pub fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .map_err(|_| poisoned())?
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    pub fn active_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

fn poisoned() -> AppError {
    AppError::Internal(anyhow::anyhow!("session registry lock poisoned"))
}
