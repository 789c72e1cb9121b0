use super::messages::{
    AuthProbe, AuthToken, PhoneChange, PhoneRequest, PlayerDetails, Player, ProbeResponse,
    ProfileUpdate, Transcript, UserProfile, VerifyRequest,
};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Header carrying the caller's user id on user-scoped endpoints
pub const USER_ID_HEADER: &str = "user-id";

/// HTTP client for the remote API
///
/// Holds one connection pool; clone freely.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// POST /auth/sendotp
    pub async fn send_otp(&self, phone_number: &str) -> Result<AuthProbe> {
        info!("Requesting OTP for {}", mask(phone_number));

        let req = self
            .http
            .post(self.url("/auth/sendotp"))
            .json(&PhoneRequest { phone_number });
        let probe: ProbeResponse = self.send_json(req).await?;

        Ok(probe.into())
    }

    /// POST /auth/register/requestotp
    pub async fn register_request_otp(&self, phone_number: &str) -> Result<()> {
        info!("Requesting registration OTP for {}", mask(phone_number));

        let req = self
            .http
            .post(self.url("/auth/register/requestotp"))
            .json(&PhoneRequest { phone_number });
        self.send(req).await?;

        Ok(())
    }

    /// POST /auth/verifyotp
    pub async fn verify_otp(
        &self,
        phone_number: &str,
        otp: &str,
        username: Option<&str>,
    ) -> Result<AuthToken> {
        let req = self.http.post(self.url("/auth/verifyotp")).json(&VerifyRequest {
            phone_number,
            otp,
            username,
        });

        self.send_json(req).await
    }

    /// POST /auth/register/verifyotp
    pub async fn register_verify_otp(
        &self,
        username: &str,
        phone_number: &str,
        otp: &str,
    ) -> Result<AuthToken> {
        let req = self
            .http
            .post(self.url("/auth/register/verifyotp"))
            .json(&VerifyRequest {
                phone_number,
                otp,
                username: Some(username),
            });

        self.send_json(req).await
    }

    // ========================================================================
    // Transcripts
    // ========================================================================

    /// GET /transcripts/transcripts/
    pub async fn list_transcripts(&self, user_id: &str) -> Result<Vec<Transcript>> {
        let req = self
            .http
            .get(self.url("/transcripts/transcripts/"))
            .header(USER_ID_HEADER, user_id);

        self.send_json(req).await
    }

    /// GET /transcript/transcript/{id}
    pub async fn get_transcript(&self, user_id: &str, transcript_id: &str) -> Result<Transcript> {
        let req = self
            .http
            .get(self.url(&format!("/transcript/transcript/{}", transcript_id)))
            .header(USER_ID_HEADER, user_id);

        self.send_json(req).await
    }

    // ========================================================================
    // Players
    // ========================================================================

    /// GET /players/players/{userId}
    pub async fn list_players(&self, user_id: &str) -> Result<Vec<Player>> {
        let req = self.http.get(self.url(&format!("/players/players/{}", user_id)));
        self.send_json(req).await
    }

    /// GET /api/v1/players/{playerId}/hands-notes
    pub async fn player_hands_notes(&self, player_id: &str) -> Result<PlayerDetails> {
        let req = self
            .http
            .get(self.url(&format!("/api/v1/players/{}/hands-notes", player_id)));
        self.send_json(req).await
    }

    /// POST /api/v1/analyze/players/{playerId}/analyze
    pub async fn analyze_player(&self, player_id: &str) -> Result<()> {
        info!("Requesting analysis for player {}", player_id);

        let req = self
            .http
            .post(self.url(&format!("/api/v1/analyze/players/{}/analyze", player_id)));
        self.send(req).await?;

        Ok(())
    }

    // ========================================================================
    // Profile
    // ========================================================================

    /// GET /profile/profile/?user_id=
    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile> {
        let req = self
            .http
            .get(self.url("/profile/profile/"))
            .query(&[("user_id", user_id)]);
        self.send_json(req).await
    }

    /// PUT /profile/profile/?user_id=
    pub async fn update_profile(&self, user_id: &str, username: &str) -> Result<UserProfile> {
        let req = self
            .http
            .put(self.url("/profile/profile/"))
            .query(&[("user_id", user_id)])
            .json(&ProfileUpdate {
                username,
                profile_pic: None,
            });
        self.send_json(req).await
    }

    /// DELETE /profile/profile/?user_id=
    pub async fn delete_profile(&self, user_id: &str) -> Result<()> {
        let req = self
            .http
            .delete(self.url("/profile/profile/"))
            .query(&[("user_id", user_id)]);
        self.send(req).await?;

        Ok(())
    }

    /// POST /profile/profile/change-phone-number/?user_id=
    pub async fn change_phone_number(
        &self,
        user_id: &str,
        new_mobile_number: &str,
        otp: &str,
    ) -> Result<UserProfile> {
        let req = self
            .http
            .post(self.url("/profile/profile/change-phone-number/"))
            .query(&[("user_id", user_id)])
            .json(&PhoneChange {
                new_mobile_number,
                otp,
            });
        self.send_json(req).await
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    /// Send and require a success status
    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let resp = req.send().await?;
        let status = resp.status();
        debug!("{} {}", status.as_u16(), resp.url().path());

        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = error_detail(&body)
            .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
        warn!("Request rejected ({}): {}", status.as_u16(), message);

        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let resp = self.send(req).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// The `detail` field of an error body, when it is a plain string
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(|d| d.as_str())
        .map(str::to_owned)
}

/// Keep phone numbers out of logs apart from the last digits
fn mask(phone_number: &str) -> String {
    let hidden = phone_number.chars().count().saturating_sub(4);
    phone_number
        .chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { '*' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://api.local:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://api.local:8000");
        assert_eq!(
            client.url("/auth/sendotp"),
            "http://api.local:8000/auth/sendotp"
        );
        assert_eq!(
            client.url("audio/upload/"),
            "http://api.local:8000/audio/upload/"
        );
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(
            error_detail(r#"{"detail": "Invalid OTP"}"#).as_deref(),
            Some("Invalid OTP")
        );
        assert_eq!(error_detail(r#"{"detail": [{"loc": []}]}"#), None);
        assert_eq!(error_detail("Internal Server Error"), None);
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("5551234567"), "******4567");
        assert_eq!(mask("12"), "12");
    }
}
