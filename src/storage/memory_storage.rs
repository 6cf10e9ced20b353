use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use log::{debug, info};

use crate::error_handling::types::StorageError;
use crate::storage::session_filter::by_creator;
use crate::storage::storage_trait::SessionStore;
use crate::storage::types::{Session, SessionFilter};

const BACKEND: &str = "memorystore";

struct MemoryState {
    next_id: i64,
    // `None` once the store has been closed
    sessions: Option<HashMap<i64, Session>>,
}

/// Process-local session store for local runs and tests.
///
/// A single mutex covers all state and is held for the whole of every
/// operation, so access is fully serialized.
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        info!("MemoryStorage initialized");
        Self {
            state: Mutex::new(MemoryState {
                next_id: 1,
                sessions: Some(HashMap::new()),
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state.lock().map_err(|_| StorageError::ReadFailed {
            backend: BACKEND,
            operation: "lock",
            reason: "state mutex poisoned".into(),
        })
    }

    fn list(&self, filter: SessionFilter) -> Result<Vec<Session>, StorageError> {
        let state = self.lock()?;
        let mut sessions: Vec<Session> = match &state.sessions {
            Some(map) => map.values().filter(|s| filter.matches(s)).cloned().collect(),
            None => Vec::new(),
        };
        sessions.sort_by(|a, b| a.title.cmp(&b.title));
        debug!("Listed {} session(s) with {:?}", sessions.len(), filter);
        Ok(sessions)
    }
}

#[async_trait]
impl SessionStore for MemoryStorage {
    async fn list_sessions(&self) -> Result<Vec<Session>, StorageError> {
        self.list(SessionFilter::default())
    }

    async fn list_sessions_created_by(
        &self,
        user_id: &str,
    ) -> Result<Vec<Session>, StorageError> {
        self.list(by_creator(user_id))
    }

    async fn get_session(&self, id: i64) -> Result<Session, StorageError> {
        let state = self.lock()?;
        state
            .sessions
            .as_ref()
            .and_then(|map| map.get(&id))
            .cloned()
            .ok_or(StorageError::NotFound { backend: BACKEND, id })
    }

    async fn add_session(&self, session: &Session) -> Result<i64, StorageError> {
        let mut state = self.lock()?;
        let id = state.next_id;
        let map = state
            .sessions
            .as_mut()
            .ok_or(StorageError::Closed { backend: BACKEND })?;
        let mut stored = session.clone();
        stored.id = id;
        map.insert(id, stored);
        state.next_id += 1;
        debug!("Added session {}", id);
        Ok(id)
    }

    async fn update_session(&self, session: &Session) -> Result<(), StorageError> {
        if !session.is_persisted() {
            return Err(StorageError::UnassignedId {
                backend: BACKEND,
                operation: "update_session",
            });
        }
        let mut state = self.lock()?;
        match state.sessions.as_mut().and_then(|map| map.get_mut(&session.id)) {
            Some(stored) => {
                *stored = session.clone();
                debug!("Updated session {}", session.id);
                Ok(())
            }
            None => Err(StorageError::NotFound {
                backend: BACKEND,
                id: session.id,
            }),
        }
    }

    async fn delete_session(&self, id: i64) -> Result<(), StorageError> {
        if id == 0 {
            return Err(StorageError::UnassignedId {
                backend: BACKEND,
                operation: "delete_session",
            });
        }
        let mut state = self.lock()?;
        match state.sessions.as_mut().and_then(|map| map.remove(&id)) {
            Some(_) => {
                debug!("Deleted session {}", id);
                Ok(())
            }
            None => Err(StorageError::NotFound { backend: BACKEND, id }),
        }
    }

    async fn close(&self) {
        if let Ok(mut state) = self.state.lock() {
            if state.sessions.take().is_some() {
                info!("MemoryStorage closed");
            }
        }
    }
}
