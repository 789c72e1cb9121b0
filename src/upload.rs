//! Audio artifact upload
//!
//! Wire contract for `POST /audio/upload/`:
//! - multipart field `file` holding the artifact bytes
//! - header `user-id` (required)
//! - header `room-id` only when configured
//! - query `description` only when the caller supplies one
//!
//! There is no retry. A response lost after the server stored the file is
//! reported as a failure.

use crate::api::client::USER_ID_HEADER;
use crate::api::messages::UploadResponse;
use crate::api::ApiClient;
use crate::config::UploadConfig;
use crate::error::{Error, Result};
use reqwest::multipart::{Form, Part};
use std::path::PathBuf;
use tracing::{error, info, warn};

pub const ROOM_ID_HEADER: &str = "room-id";

/// Everything needed to post one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub artifact: PathBuf,
    pub mime_type: String,
    pub file_name: String,
    pub user_id: Option<String>,
    pub room_id: Option<String>,
    pub description: Option<String>,
}

impl UploadRequest {
    pub fn new(artifact: PathBuf, settings: &UploadConfig, user_id: Option<String>) -> Self {
        Self {
            artifact,
            mime_type: settings.mime_type.clone(),
            file_name: settings.file_name.clone(),
            user_id,
            room_id: settings.room_id.clone(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Server acknowledgement of an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadReceipt {
    pub success: bool,
}

/// Posts artifacts to the upload endpoint
#[derive(Debug, Clone)]
pub struct UploadClient {
    api: ApiClient,
}

impl UploadClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn upload(&self, request: &UploadRequest) -> Result<UploadReceipt> {
        let user_id = request
            .user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingIdentity)?;

        let bytes = tokio::fs::read(&request.artifact).await?;
        let size = bytes.len();

        let part = Part::bytes(bytes)
            .file_name(request.file_name.clone())
            .mime_str(&request.mime_type)
            .map_err(|e| Error::Validation(format!("Invalid MIME type {}: {}", request.mime_type, e)))?;
        let form = Form::new().part("file", part);

        let mut req = self
            .api
            .http()
            .post(self.api.url("/audio/upload/"))
            .header(USER_ID_HEADER, user_id)
            .multipart(form);
        if let Some(room_id) = &request.room_id {
            req = req.header(ROOM_ID_HEADER, room_id);
        }
        if let Some(description) = &request.description {
            req = req.query(&[("description", description)]);
        }

        info!(
            "Uploading {} ({} bytes) as {}",
            request.artifact.display(),
            size,
            request.file_name
        );

        let resp = req.send().await.map_err(|e| {
            error!("Upload transport failure: {}", e);
            Error::Network(e.to_string())
        })?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            error!("Upload rejected with status {}", status.as_u16());
            return Err(Error::Upload {
                status: status.as_u16(),
                body,
            });
        }

        let ack = serde_json::from_str::<UploadResponse>(&body).unwrap_or_else(|e| {
            warn!("Upload response was not understood: {}", e);
            UploadResponse::default()
        });
        info!("Upload complete (success={})", ack.success);

        Ok(UploadReceipt {
            success: ack.success,
        })
    }
}
