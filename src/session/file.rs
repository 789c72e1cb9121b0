use super::store::{Session, SessionEntries, SessionStore};
use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Session store backed by a JSON file
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// reader never sees a half-written session.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<SessionEntries> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SessionEntries::default()),
            Err(e) => {
                return Err(Error::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        match serde_json::from_slice::<SessionEntries>(&data) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // Unreadable storage is treated as logged out
                warn!("Ignoring corrupt session file {}: {}", self.path.display(), e);
                Ok(SessionEntries::default())
            }
        }
    }

    async fn write_entries(&self, entries: &SessionEntries) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| Error::Storage(format!("Failed to create {}: {}", dir.display(), e)))?;
        }

        let payload = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp, payload)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::Storage(format!("Failed to replace {}: {}", self.path.display(), e)))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self) -> Result<Option<Session>> {
        let entries = self.read_entries().await?;
        let session = entries.to_session();

        if session.is_none() && !entries.is_empty() {
            debug!("Session file holds partial entries, treating as logged out");
        }

        Ok(session)
    }

    async fn set(&self, session: &Session) -> Result<()> {
        self.write_entries(&SessionEntries::from(session)).await?;
        info!("Session stored for {}", session.username);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}
