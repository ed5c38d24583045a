//! Session manager - one [`ChatSession`] per client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use super::{ChatSession, SessionError};
use crate::gemini::{ChatConfig, ChatProvider};

struct Entry {
    session: Arc<Mutex<ChatSession>>,
    /// Teardown was requested while a turn was running. The entry is hidden
    /// from lookups and dropped once the turn ends.
    closing: bool,
}

impl Entry {
    fn live(&self) -> Option<&Arc<Mutex<ChatSession>>> {
        (!self.closing).then_some(&self.session)
    }
}

/// Outcome of [`SessionManager::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    /// A turn is in flight; the session goes away when it finishes.
    Deferred,
}

/// Owns every live session and the configuration new ones are created with.
pub struct SessionManager {
    provider: Arc<dyn ChatProvider>,
    config: ChatConfig,
    /// Map of session id -> session. Each session has its own lock so a slow
    /// turn never blocks other clients.
    sessions: RwLock<HashMap<Uuid, Entry>>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn ChatProvider>, config: ChatConfig) -> Self {
        Self {
            provider,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub const fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Return the session for `id`, creating a new one if `id` is absent or
    /// unknown.
    ///
    /// Existing sessions are returned untouched, so calling this again for
    /// the same id never loses history. A new session always gets a freshly
    /// generated id; the caller must use the returned one.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, Arc<Mutex<ChatSession>>) {
        if let Some(id) = id {
            if let Some(session) = self.sessions.read().await.get(&id).and_then(Entry::live) {
                return (id, session.clone());
            }
        }

        let mut sessions = self.sessions.write().await;

        // Re-check: another request may have won the race for this id.
        if let Some(id) = id {
            if let Some(session) = sessions.get(&id).and_then(Entry::live) {
                return (id, session.clone());
            }
        }

        let id = Uuid::now_v7();
        let session = Arc::new(Mutex::new(ChatSession::new(
            id,
            self.provider.clone(),
            self.config.clone(),
        )));
        sessions.insert(
            id,
            Entry {
                session: session.clone(),
                closing: false,
            },
        );
        tracing::info!(session = %id, live = sessions.len(), "session created");
        (id, session)
    }

    /// Look up an existing session.
    pub async fn get(&self, id: Uuid) -> Result<Arc<Mutex<ChatSession>>, SessionError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .and_then(Entry::live)
            .cloned()
            .ok_or(SessionError::NotFound(id))
    }

    /// Lock a session for exclusive use, failing fast if a turn is running.
    pub async fn acquire(&self, id: Uuid) -> Result<OwnedMutexGuard<ChatSession>, SessionError> {
        let mut session = self
            .get(id)
            .await?
            .try_lock_owned()
            .map_err(|_| SessionError::Busy(id))?;
        session.touch();
        Ok(session)
    }

    /// Tear a session down.
    ///
    /// A session with a turn in flight is hidden at once and dropped by
    /// [`SessionManager::finish_turn`] when the turn ends.
    pub async fn remove(&self, id: Uuid) -> Result<Removal, SessionError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(&id)
            .filter(|entry| !entry.closing)
            .ok_or(SessionError::NotFound(id))?;

        if entry.session.try_lock().is_err() {
            entry.closing = true;
            tracing::info!(session = %id, "session removal deferred until turn ends");
            return Ok(Removal::Deferred);
        }

        sessions.remove(&id);
        tracing::info!(session = %id, live = sessions.len(), "session removed");
        Ok(Removal::Removed)
    }

    /// Called once a turn has released the session lock. Completes a deferred
    /// removal, if any.
    pub async fn finish_turn(&self, id: Uuid) {
        let mut sessions = self.sessions.write().await;
        if sessions.get(&id).is_some_and(|entry| entry.closing) {
            sessions.remove(&id);
            tracing::info!(session = %id, live = sessions.len(), "session removed after turn");
        }
    }

    /// Drop sessions unused for at least `max_idle`, along with any pending
    /// removals. Sessions with a turn in flight are kept. Returns how many
    /// were dropped.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let Ok(session) = entry.session.try_lock() else {
                return true;
            };
            let keep = !entry.closing && session.idle_for() < max_idle;
            if !keep {
                tracing::debug!(session = %id, idle_secs = session.idle_for().as_secs(), "evicting session");
            }
            keep
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, live = sessions.len(), "idle sessions evicted");
        }
        evicted
    }

    /// Number of live sessions.
    pub async fn live_count(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|entry| !entry.closing)
            .count()
    }
}
