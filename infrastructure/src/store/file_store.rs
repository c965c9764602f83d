//! One pretty-printed JSON file per session under a base directory.

use agentry_application::{SnapshotStore, StoreError};
use agentry_domain::AgentSnapshot;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const MAX_SESSION_ID_LEN: usize = 128;

pub struct JsonFileSnapshotStore {
    dir: PathBuf,
}

impl JsonFileSnapshotStore {
    /// The directory is created lazily on the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<session>.json`. Ids are limited to ASCII letters, digits,
    /// `-`, `_` and `.` and may not start with a dot.
    fn path_for(&self, session_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !session_id.is_empty()
            && session_id.len() <= MAX_SESSION_ID_LEN
            && !session_id.starts_with('.')
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StoreError::InvalidSessionId(session_id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", session_id)))
    }
}

#[async_trait]
impl SnapshotStore for JsonFileSnapshotStore {
    async fn load(&self, session_id: &str) -> Result<Option<AgentSnapshot>, StoreError> {
        let path = self.path_for(session_id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot = serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            session: session_id.to_string(),
            reason: e.to_string(),
        })?;
        debug!(session = session_id, path = %path.display(), "Loaded snapshot");
        Ok(Some(snapshot))
    }

    async fn save(&self, session_id: &str, snapshot: &AgentSnapshot) -> Result<(), StoreError> {
        let path = self.path_for(session_id)?;
        let body = serde_json::to_vec_pretty(snapshot).map_err(|e| StoreError::Corrupt {
            session: session_id.to_string(),
            reason: e.to_string(),
        })?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // write-then-rename so a crash never leaves a half-written snapshot
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(session = session_id, status = %snapshot.status(), "Saved snapshot");
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), StoreError> {
        let path = self.path_for(session_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
