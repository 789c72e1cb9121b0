//! Account management: profile reads and edits, phone change, deletion

use crate::api::{ApiClient, UserProfile};
use crate::auth::validate;
use crate::error::{Error, Result};
use crate::session::{self, Session, SessionStore};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ProfileService {
    api: ApiClient,
    store: Arc<dyn SessionStore>,
}

impl ProfileService {
    pub fn new(api: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        Self { api, store }
    }

    pub async fn fetch(&self) -> Result<UserProfile> {
        let user_id = self.store.user_id().await?;
        self.api.get_profile(&user_id).await
    }

    /// Rename the account and keep the stored session's username in step
    pub async fn update_username(&self, username: &str) -> Result<UserProfile> {
        let username = validate::username(username)?;
        let current = self
            .store
            .get()
            .await?
            .ok_or(Error::MissingIdentity)?;

        let profile = self.api.update_profile(&current.user_id, username).await?;
        info!("Username updated to {}", profile.username);

        let renamed = Session {
            username: profile.username.clone(),
            ..current
        };
        self.store.set(&renamed).await?;

        Ok(profile)
    }

    pub async fn change_phone_number(&self, new_number: &str, otp: &str) -> Result<UserProfile> {
        let new_number = validate::phone_number(new_number)?;
        let otp = validate::otp(otp)?;
        let user_id = self.store.user_id().await?;

        let profile = self
            .api
            .change_phone_number(&user_id, new_number, otp)
            .await?;
        info!("Phone number changed");

        Ok(profile)
    }

    /// Delete the account; the session is cleared only once the server agrees
    pub async fn delete_account(&self) -> Result<()> {
        let user_id = self.store.user_id().await?;

        if let Err(e) = self.api.delete_profile(&user_id).await {
            warn!("Account deletion refused: {}", e);
            return Err(e);
        }

        info!("Account deleted");
        session::logout(self.store.as_ref()).await
    }

    pub async fn logout(&self) -> Result<()> {
        session::logout(self.store.as_ref()).await
    }
}
