use super::validate;
use crate::api::{ApiClient, AuthProbe, AuthToken};
use crate::error::{Error, Result};
use crate::session::{Session, SessionStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Where the user is in the login sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStage {
    /// Waiting for a phone number
    PhoneEntry,
    /// OTP sent to a known number
    OtpRequested { phone_number: String },
    /// OTP sent to an unknown number; verification also needs a username
    RegistrationPending { phone_number: String },
    /// Session stored
    Verified { username: String },
}

impl AuthStage {
    fn phone_number(&self) -> Option<&str> {
        match self {
            AuthStage::OtpRequested { phone_number }
            | AuthStage::RegistrationPending { phone_number } => Some(phone_number),
            _ => None,
        }
    }
}

/// Login/registration state machine
pub struct AuthFlow {
    api: ApiClient,
    store: Arc<dyn SessionStore>,
    stage: AuthStage,
}

impl AuthFlow {
    pub fn new(api: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            store,
            stage: AuthStage::PhoneEntry,
        }
    }

    pub fn stage(&self) -> &AuthStage {
        &self.stage
    }

    /// Whether `verify_otp` needs a username
    pub fn needs_username(&self) -> bool {
        matches!(self.stage, AuthStage::RegistrationPending { .. })
    }

    /// Submit a phone number and have an OTP sent to it.
    ///
    /// Invalid numbers are rejected before any request is made and leave the
    /// stage untouched.
    pub async fn request_otp(&mut self, phone_number: &str) -> Result<AuthProbe> {
        let phone = validate::phone_number(phone_number)?.to_string();

        let probe = match self.api.send_otp(&phone).await {
            Ok(probe) => probe,
            Err(e) => return Err(self.fail(e)),
        };

        match &probe {
            AuthProbe::Known { .. } => {
                info!("OTP sent, awaiting verification");
                self.stage = AuthStage::OtpRequested { phone_number: phone };
            }
            AuthProbe::Unknown => {
                info!("Number not registered, requesting registration OTP");
                if let Err(e) = self.api.register_request_otp(&phone).await {
                    return Err(self.fail(e));
                }
                self.stage = AuthStage::RegistrationPending { phone_number: phone };
            }
        }

        Ok(probe)
    }

    /// Verify the OTP for the number an OTP was requested for and store the
    /// resulting session.
    pub async fn verify_otp(
        &mut self,
        phone_number: &str,
        otp: &str,
        username: Option<&str>,
    ) -> Result<Session> {
        let otp = validate::otp(otp)?;
        let phone = phone_number.trim();

        if self.stage.phone_number() != Some(phone) {
            return Err(Error::Validation(
                "Request an OTP for this phone number first".to_string(),
            ));
        }

        let result = if self.needs_username() {
            let name = validate::username(username.unwrap_or_default())?;
            self.api.register_verify_otp(name, phone, otp).await
        } else {
            let name = username.map(str::trim).filter(|n| !n.is_empty());
            self.api.verify_otp(phone, otp, name).await
        };

        let token = match result {
            Ok(token) => token,
            Err(e) => return Err(self.fail(e)),
        };

        let session = match session_from(token) {
            Ok(session) => session,
            Err(e) => return Err(self.fail(e)),
        };
        if let Err(e) = self.store.set(&session).await {
            return Err(self.fail(e));
        }

        info!("Authenticated as {}", session.username);
        self.stage = AuthStage::Verified {
            username: session.username.clone(),
        };

        Ok(session)
    }

    /// Abandon the current number and start over
    pub fn reset(&mut self) {
        self.stage = AuthStage::PhoneEntry;
    }

    fn fail(&mut self, error: Error) -> Error {
        warn!("Authentication step failed: {}", error);
        self.stage = AuthStage::PhoneEntry;
        error
    }
}

fn session_from(token: AuthToken) -> Result<Session> {
    if token.access_token.is_empty() || token.username.is_empty() || token.user_id.is_empty() {
        return Err(Error::Decode(
            "Verification response is missing credentials".to_string(),
        ));
    }

    Ok(Session::new(token.access_token, token.username, token.user_id))
}
