use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// An authenticated identity. Only ever built with all three fields present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub user_id: String,
}

impl Session {
    pub fn new(
        token: impl Into<String>,
        username: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
            user_id: user_id.into(),
        }
    }
}

/// The raw key-value entries as persisted (`token`, `username`, `userId`).
///
/// Storage may hold any subset of the keys; a subset is not a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl SessionEntries {
    /// `Some` only when every key holds a non-empty value
    pub fn to_session(&self) -> Option<Session> {
        let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_owned);

        Some(Session {
            token: present(&self.token)?,
            username: present(&self.username)?,
            user_id: present(&self.user_id)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.username.is_none() && self.user_id.is_none()
    }
}

impl From<&Session> for SessionEntries {
    fn from(session: &Session) -> Self {
        Self {
            token: Some(session.token.clone()),
            username: Some(session.username.clone()),
            user_id: Some(session.user_id.clone()),
        }
    }
}

/// Session repository shared by login, logout, profile and upload flows.
///
/// Writes are last-writer-wins; `set` and `clear` replace all three keys in a
/// single step.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// The stored session, or `None` when absent or incomplete
    async fn get(&self) -> Result<Option<Session>>;

    async fn set(&self, session: &Session) -> Result<()>;

    async fn clear(&self) -> Result<()>;

    /// User id of the stored session, `MissingIdentity` when there is none
    async fn user_id(&self) -> Result<String> {
        self.get()
            .await?
            .map(|s| s.user_id)
            .ok_or(Error::MissingIdentity)
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<SessionEntries>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with arbitrary (possibly partial) entries
    pub fn from_entries(entries: SessionEntries) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn with_session(session: &Session) -> Self {
        Self::from_entries(SessionEntries::from(session))
    }

    pub async fn entries(&self) -> SessionEntries {
        self.entries.read().await.clone()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self) -> Result<Option<Session>> {
        Ok(self.entries.read().await.to_session())
    }

    async fn set(&self, session: &Session) -> Result<()> {
        *self.entries.write().await = SessionEntries::from(session);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.entries.write().await = SessionEntries::default();
        Ok(())
    }
}
