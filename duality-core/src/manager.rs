//! Owned store of live sessions.
//!
//! Each session sits behind its own async mutex so one table's narrator call
//! never blocks another table, while actions within a table run one at a
//! time.

use crate::character::{Character, PlayerId};
use crate::config::EngineConfig;
use crate::session::{GameSession, SessionError, SessionId, SessionState, SessionStatus};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// A session shared between tasks.
pub type SharedSession = Arc<Mutex<GameSession>>;

/// Default retention for [`SessionManager::cleanup`].
pub fn default_max_age() -> Duration {
    Duration::hours(24)
}

#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, SharedSession>>,
    config: EngineConfig,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// New sessions take their player cap and settings from `config`.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            sessions: RwLock::default(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a waiting session and return its id.
    pub async fn create_session(&self, gm_id: impl Into<PlayerId>, name: impl Into<String>) -> SessionId {
        let mut session = GameSession::new(gm_id, name).with_max_players(self.config.max_players);
        session.settings = self.config.settings.clone();
        self.insert(session).await
    }

    /// Take ownership of an existing session, e.g. one loaded from disk.
    pub async fn insert(&self, session: GameSession) -> SessionId {
        let id = session.id;
        tracing::info!(session = %id, name = %session.name, "Registered session");
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    pub async fn get(&self, id: &SessionId) -> Option<SharedSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Like [`SessionManager::get`] but unknown ids are an error.
    pub async fn require(&self, id: &SessionId) -> Result<SharedSession, SessionError> {
        self.get(id).await.ok_or(SessionError::SessionNotFound(*id))
    }

    pub async fn join(
        &self,
        id: &SessionId,
        player_id: impl Into<PlayerId>,
        character: Character,
    ) -> Result<(), SessionError> {
        let session = self.require(id).await?;
        let mut session = session.lock().await;
        session.add_player(player_id, character)
    }

    pub async fn remove(&self, id: &SessionId) -> Option<SharedSession> {
        self.sessions.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Status of every waiting or active session.
    pub async fn list_active(&self) -> Vec<SessionStatus> {
        let sessions: Vec<SharedSession> = self.sessions.read().await.values().cloned().collect();
        let mut out = Vec::new();
        for session in sessions {
            let session = session.lock().await;
            if matches!(session.state(), SessionState::Waiting | SessionState::Active) {
                out.push(session.status());
            }
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Drop completed sessions and sessions idle for longer than `max_age`.
    /// Returns the number removed.
    pub async fn cleanup(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let sessions: Vec<(SessionId, SharedSession)> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(id, s)| (*id, Arc::clone(s)))
            .collect();

        let mut stale = Vec::new();
        for (id, session) in sessions {
            let session = session.lock().await;
            if session.state() == SessionState::Completed || session.last_activity < cutoff {
                stale.push(id);
            }
        }

        let mut map = self.sessions.write().await;
        for id in &stale {
            map.remove(id);
        }
        if !stale.is_empty() {
            tracing::info!(removed = stale.len(), "Cleaned up sessions");
        }
        stale.len()
    }

    /// [`SessionManager::cleanup`] with the configured max age.
    pub async fn cleanup_stale(&self) -> usize {
        self.cleanup(self.config.session_max_age).await
    }
}
