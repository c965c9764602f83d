//! Snapshot store port
//!
//! The outer caller owns an agent instance's lifetime between turns. This port
//! is how it keeps an [`AgentSnapshot`] per conversation/session id.

use agentry_domain::AgentSnapshot;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt snapshot for session {session}: {reason}")]
    Corrupt { session: String, reason: String },

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<AgentSnapshot>, StoreError>;

    async fn save(&self, session_id: &str, snapshot: &AgentSnapshot) -> Result<(), StoreError>;

    /// Removing a session that does not exist is not an error.
    async fn delete(&self, session_id: &str) -> Result<(), StoreError>;
}

/// Process-local store for tests and single-process embedding.
#[derive(Default)]
pub struct InMemorySnapshotStore {
    snapshots: Mutex<HashMap<String, AgentSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self, session_id: &str) -> Result<Option<AgentSnapshot>, StoreError> {
        Ok(self
            .snapshots
            .lock()
            .ok()
            .and_then(|s| s.get(session_id).cloned()))
    }

    async fn save(&self, session_id: &str, snapshot: &AgentSnapshot) -> Result<(), StoreError> {
        if let Ok(mut snapshots) = self.snapshots.lock() {
            snapshots.insert(session_id.to_string(), snapshot.clone());
        }
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), StoreError> {
        if let Ok(mut snapshots) = self.snapshots.lock() {
            snapshots.remove(session_id);
        }
        Ok(())
    }
}
