use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Auth
// ============================================================================

/// Outcome of submitting a phone number, decoded from the `status` string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthProbe {
    /// The number belongs to an existing account
    Known { username: Option<String> },
    /// No account yet; verification will need a username
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProbeResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl From<ProbeResponse> for AuthProbe {
    fn from(resp: ProbeResponse) -> Self {
        match resp.status.as_deref() {
            Some("user_not_found") => AuthProbe::Unknown,
            _ => AuthProbe::Known {
                username: resp.username,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PhoneRequest<'a> {
    pub phone_number: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifyRequest<'a> {
    pub phone_number: &'a str,
    pub otp: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
}

/// Credentials returned by a successful verification
#[derive(Debug, Clone, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    pub username: String,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
}

// ============================================================================
// Transcripts
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(rename = "_id")]
    pub id: String,
    pub transcript_id: String,
    #[serde(default)]
    pub filename: String,
    pub created_at: String,
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub insight: String,
}

impl Transcript {
    /// e.g. `07 Mar 2025`
    pub fn date_label(&self) -> Option<String> {
        parse_timestamp(&self.created_at).map(|t| t.format("%d %b %Y").to_string())
    }

    /// e.g. `14:05`
    pub fn time_label(&self) -> Option<String> {
        parse_timestamp(&self.created_at).map(|t| t.format("%H:%M").to_string())
    }
}

// ============================================================================
// Players, hands and notes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user_id", default)]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub total_hands: u32,
    #[serde(default)]
    pub total_wins: u32,
    #[serde(default)]
    pub hand_references: Vec<HandReference>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub strengths: Option<Vec<String>>,
    #[serde(default)]
    pub weaknesses: Option<Vec<String>>,
}

impl Player {
    /// Fraction of recorded hands won, 0 when none are recorded
    pub fn win_rate(&self) -> f64 {
        if self.total_hands == 0 {
            0.0
        } else {
            self.total_wins as f64 / self.total_hands as f64
        }
    }

    /// e.g. `March 07, 2025`
    pub fn created_label(&self) -> Option<String> {
        parse_timestamp(&self.created_at).map(|t| t.format("%B %d, %Y").to_string())
    }

    pub fn updated_label(&self) -> Option<String> {
        parse_timestamp(&self.updated_at).map(|t| t.format("%B %d, %Y").to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandReference {
    pub hand_id: String,
    pub note_id: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub won: bool,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hand {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user_id", default)]
    pub user_id: String,
    pub note_id: String,
    #[serde(default)]
    pub my_position: String,
    #[serde(default)]
    pub i_won: bool,
    #[serde(default)]
    pub pot_size: Option<f64>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub players: Vec<HandPlayer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandPlayer {
    pub player_id: String,
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub won: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user_id", default)]
    pub user_id: String,
    pub hand_id: String,
    #[serde(default)]
    pub audio_file_url: String,
    #[serde(default)]
    pub transcript_from_deepgram: String,
    #[serde(rename = "summaryFromGPT", default)]
    pub summary: String,
    #[serde(rename = "insightFromGPT", default)]
    pub insight: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandAndNote {
    pub hand: Hand,
    pub note: Note,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDetails {
    pub player: Player,
    #[serde(default)]
    pub hand_and_notes: Vec<HandAndNote>,
}

impl PlayerDetails {
    pub fn find(&self, hand_id: &str, note_id: &str) -> Option<&HandAndNote> {
        self.hand_and_notes
            .iter()
            .find(|hn| hn.hand.id == hand_id && hn.note.id == note_id)
    }
}

// ============================================================================
// Profile
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "user_id", deserialize_with = "string_or_number")]
    pub user_id: String,
    pub mobile_number: String,
    pub username: String,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileUpdate<'a> {
    pub username: &'a str,
    pub profile_pic: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PhoneChange<'a> {
    #[serde(rename = "new_mobileNumber")]
    pub new_mobile_number: &'a str,
    pub otp: &'a str,
}

// ============================================================================
// Upload
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct UploadResponse {
    #[serde(default)]
    pub success: bool,
}

// ============================================================================
// Helpers
// ============================================================================

/// Server ids arrive as strings or bare integers depending on the endpoint
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// RFC 3339, or a naive ISO timestamp as emitted by the server
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}
