//! Persisted session management
//!
//! The authenticated identity `{token, username, userId}` lives behind the
//! [`SessionStore`] trait so each flow receives its store explicitly:
//! - `MemorySessionStore` for tests and short-lived processes
//! - `FileSessionStore` for a JSON file on disk

mod file;
mod store;

pub use file::FileSessionStore;
pub use store::{MemorySessionStore, Session, SessionEntries, SessionStore};

use crate::error::Result;
use tracing::info;

/// Forget the stored identity
pub async fn logout(store: &dyn SessionStore) -> Result<()> {
    store.clear().await?;
    info!("Logged out, session cleared");
    Ok(())
}
