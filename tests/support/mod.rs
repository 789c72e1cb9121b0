// In-process mock of the remote hand-notes API
//
// Every handler records the request it saw so tests can assert on exactly
// which calls were made (and which were not).

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use hand_notes::ApiClient;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const VALID_OTP: &str = "123456";

/// One request as the mock server received it
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub query: HashMap<String, String>,
    pub body: Bytes,
}

impl Hit {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Knobs and recorded traffic
pub struct MockState {
    pub hits: Vec<Hit>,
    /// phone number → username
    pub accounts: HashMap<String, String>,
    pub send_otp_status: StatusCode,
    pub upload_status: StatusCode,
    pub upload_body: Value,
    pub profile_username: String,
    pub delete_status: StatusCode,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            hits: Vec::new(),
            accounts: HashMap::new(),
            send_otp_status: StatusCode::OK,
            upload_status: StatusCode::OK,
            upload_body: json!({ "success": true }),
            profile_username: "ace".to_string(),
            delete_status: StatusCode::OK,
        }
    }
}

#[derive(Clone, Default)]
pub struct MockApi {
    state: Arc<Mutex<MockState>>,
}

impl MockApi {
    /// Bind to an ephemeral port and return a client pointed at it
    pub async fn start() -> (ApiClient, MockApi) {
        let mock = MockApi::default();
        let router = create_router(mock.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = ApiClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        (client, mock)
    }

    pub fn configure(&self, f: impl FnOnce(&mut MockState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn add_account(&self, phone: &str, username: &str) {
        self.configure(|s| {
            s.accounts.insert(phone.to_string(), username.to_string());
        });
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.state.lock().unwrap().hits.clone()
    }

    pub fn hits_for(&self, path: &str) -> Vec<Hit> {
        self.hits().into_iter().filter(|h| h.path == path).collect()
    }

    fn record(&self, method: Method, uri: &Uri, headers: HeaderMap, body: Bytes) {
        let query = uri
            .query()
            .map(|q| {
                q.split('&')
                    .filter_map(|pair| pair.split_once('='))
                    .map(|(k, v)| (k.to_string(), decode(v)))
                    .collect()
            })
            .unwrap_or_default();

        self.state.lock().unwrap().hits.push(Hit {
            method,
            path: uri.path().to_string(),
            headers,
            query,
            body,
        });
    }
}

fn decode(v: &str) -> String {
    // Enough for the values used in tests
    v.replace('+', " ").replace("%20", " ")
}

// ============================================================================
// Routes
// ============================================================================

fn create_router(mock: MockApi) -> Router {
    Router::new()
        // Auth
        .route("/auth/sendotp", post(send_otp))
        .route("/auth/register/requestotp", post(register_request_otp))
        .route("/auth/verifyotp", post(verify_otp))
        .route("/auth/register/verifyotp", post(register_verify_otp))
        // Audio
        .route("/audio/upload/", post(upload))
        // Reads
        .route("/transcripts/transcripts/", get(list_transcripts))
        .route("/transcript/transcript/:id", get(get_transcript))
        .route("/players/players/:user_id", get(list_players))
        .route("/api/v1/players/:player_id/hands-notes", get(hands_notes))
        .route("/api/v1/analyze/players/:player_id/analyze", post(analyze))
        // Profile
        .route(
            "/profile/profile/",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
        .route("/profile/profile/change-phone-number/", post(change_phone))
        .with_state(mock)
}

fn token_for(phone: &str, username: &str) -> Value {
    json!({
        "access_token": format!("token-{}", phone),
        "username": username,
        "user_id": format!("user-{}", phone),
    })
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

async fn send_otp(
    State(mock): State<MockApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    mock.record(method, &uri, headers, body.clone());
    let req: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let phone = req["phone_number"].as_str().unwrap_or_default().to_string();

    let state = mock.state.lock().unwrap();
    if state.send_otp_status != StatusCode::OK {
        return detail(state.send_otp_status, "SMS gateway unavailable");
    }

    match state.accounts.get(&phone) {
        Some(username) => Json(json!({ "status": "success", "username": username })).into_response(),
        None => Json(json!({ "status": "user_not_found" })).into_response(),
    }
}

async fn register_request_otp(
    State(mock): State<MockApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    mock.record(method, &uri, headers, body);
    Json(json!({ "message": "OTP sent" })).into_response()
}

async fn verify_otp(
    State(mock): State<MockApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    mock.record(method, &uri, headers, body.clone());
    let req: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let phone = req["phone_number"].as_str().unwrap_or_default();

    if req["otp"].as_str() != Some(VALID_OTP) {
        return detail(StatusCode::BAD_REQUEST, "Invalid OTP");
    }

    let state = mock.state.lock().unwrap();
    match state.accounts.get(phone) {
        Some(username) => Json(token_for(phone, username)).into_response(),
        None => detail(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn register_verify_otp(
    State(mock): State<MockApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    mock.record(method, &uri, headers, body.clone());
    let req: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let phone = req["phone_number"].as_str().unwrap_or_default().to_string();
    let username = req["username"].as_str().unwrap_or_default().to_string();

    if req["otp"].as_str() != Some(VALID_OTP) {
        return detail(StatusCode::BAD_REQUEST, "Invalid OTP");
    }

    let mut state = mock.state.lock().unwrap();
    if state.accounts.values().any(|u| *u == username) {
        return detail(StatusCode::CONFLICT, "Username already taken");
    }
    state.accounts.insert(phone.clone(), username.clone());

    Json(token_for(&phone, &username)).into_response()
}

async fn upload(
    State(mock): State<MockApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    mock.record(method, &uri, headers, body);

    let state = mock.state.lock().unwrap();
    (state.upload_status, Json(state.upload_body.clone())).into_response()
}

async fn list_transcripts(
    State(mock): State<MockApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let user_id = headers
        .get("user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    mock.record(method, &uri, headers, Bytes::new());

    let Some(user_id) = user_id else {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "user-id header required");
    };

    Json(json!([
        {
            "_id": "a1",
            "transcript_id": "t-1",
            "filename": "recording.wav",
            "created_at": "2025-03-07T14:05:09.123456",
            "transcript": "raised from the button",
            "user_id": user_id,
            "summary": "Button raise, called by the blinds",
            "insight": "Tighten up out of position"
        }
    ]))
    .into_response()
}

async fn get_transcript(
    State(mock): State<MockApi>,
    Path(id): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    mock.record(method, &uri, headers, Bytes::new());

    if id != "t-1" {
        return detail(StatusCode::NOT_FOUND, "Transcript not found");
    }

    Json(json!({
        "_id": "a1",
        "transcript_id": "t-1",
        "filename": "recording.wav",
        "created_at": "2025-03-07T14:05:09Z",
        "transcript": "raised from the button",
        "user_id": "user-5551234567",
        "summary": "Button raise",
        "insight": "Fine"
    }))
    .into_response()
}

async fn list_players(
    State(mock): State<MockApi>,
    Path(user_id): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    mock.record(method, &uri, headers, Bytes::new());

    Json(json!([
        {
            "_id": "p1",
            "user_id": user_id,
            "name": "Villain",
            "totalHands": 10,
            "totalWins": 4,
            "handReferences": [
                { "handId": "h1", "noteId": "n1", "position": "BTN", "won": true,
                  "date": "2025-03-07T14:05:09Z" }
            ],
            "createdAt": "2025-03-01T10:00:00Z",
            "updatedAt": "2025-03-07T10:00:00Z",
            "strengths": ["aggressive"]
        }
    ]))
    .into_response()
}

async fn hands_notes(
    State(mock): State<MockApi>,
    Path(player_id): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    mock.record(method, &uri, headers, Bytes::new());

    let analyzed = mock
        .hits()
        .iter()
        .any(|h| h.path.ends_with("/analyze"));
    let weaknesses = if analyzed { json!(["overfolds rivers"]) } else { Value::Null };

    Json(json!({
        "player": {
            "_id": player_id,
            "user_id": "user-5551234567",
            "name": "Villain",
            "totalHands": 10,
            "totalWins": 4,
            "handReferences": [],
            "createdAt": "2025-03-01T10:00:00Z",
            "updatedAt": "2025-03-07T10:00:00Z",
            "weaknesses": weaknesses
        },
        "handAndNotes": [
            {
                "hand": {
                    "_id": "h1",
                    "user_id": "user-5551234567",
                    "noteId": "n1",
                    "myPosition": "BB",
                    "iWon": false,
                    "potSize": null,
                    "date": "2025-03-07T14:05:09Z",
                    "createdAt": "2025-03-07T14:05:09Z",
                    "updatedAt": "2025-03-07T14:05:09Z",
                    "players": [
                        { "playerId": player_id, "name": "Villain", "position": "BTN", "won": true }
                    ]
                },
                "note": {
                    "_id": "n1",
                    "user_id": "user-5551234567",
                    "handId": "h1",
                    "audioFileUrl": "https://files.example/n1.wav",
                    "transcriptFromDeepgram": "villain raised",
                    "summaryFromGPT": "Villain steals from the button",
                    "insightFromGPT": "3-bet wider",
                    "date": "2025-03-07T14:05:09Z",
                    "createdAt": "2025-03-07T14:05:09Z",
                    "updatedAt": "2025-03-07T14:05:09Z"
                }
            }
        ]
    }))
    .into_response()
}

async fn analyze(
    State(mock): State<MockApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    mock.record(method, &uri, headers, Bytes::new());
    Json(json!({ "status": "ok" })).into_response()
}

fn profile_json(user_id: &str, username: &str) -> Value {
    json!({
        "user_id": user_id,
        "mobileNumber": "5551234567",
        "username": username,
        "profilePic": null,
        "isVerified": true,
        "createdAt": "2025-03-01T10:00:00Z",
        "updatedAt": "2025-03-07T10:00:00Z"
    })
}

async fn get_profile(
    State(mock): State<MockApi>,
    Query(query): Query<HashMap<String, String>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    mock.record(method, &uri, headers, Bytes::new());

    let Some(user_id) = query.get("user_id") else {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "user_id required");
    };
    let username = mock.state.lock().unwrap().profile_username.clone();
    Json(profile_json(user_id, &username)).into_response()
}

async fn update_profile(
    State(mock): State<MockApi>,
    Query(query): Query<HashMap<String, String>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    mock.record(method, &uri, headers, body.clone());
    let req: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let username = req["username"].as_str().unwrap_or_default().to_string();
    let user_id = query.get("user_id").cloned().unwrap_or_default();

    mock.state.lock().unwrap().profile_username = username.clone();
    Json(profile_json(&user_id, &username)).into_response()
}

async fn delete_profile(
    State(mock): State<MockApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    mock.record(method, &uri, headers, Bytes::new());

    let status = mock.state.lock().unwrap().delete_status;
    if status != StatusCode::OK {
        return detail(status, "Could not delete account");
    }
    Json(json!({ "message": "deleted" })).into_response()
}

async fn change_phone(
    State(mock): State<MockApi>,
    Query(query): Query<HashMap<String, String>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    mock.record(method, &uri, headers, body.clone());
    let req: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    if req["otp"].as_str() != Some(VALID_OTP) {
        return detail(StatusCode::BAD_REQUEST, "Invalid OTP");
    }

    let user_id = query.get("user_id").cloned().unwrap_or_default();
    let username = mock.state.lock().unwrap().profile_username.clone();
    let mut profile = profile_json(&user_id, &username);
    profile["mobileNumber"] = req["new_mobileNumber"].clone();
    Json(profile).into_response()
}
