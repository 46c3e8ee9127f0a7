//! Wire types shared by the HTTP client and the server.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::SessionId;

/// Body of `POST /query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub session_id: SessionId,
}

/// Body of `POST /clear`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearRequest {
    pub session_id: SessionId,
}

/// Response of `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub size: u64,
}

/// Response of `POST /query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub file_analyzed: Option<String>,
}

/// Response of `POST /clear`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub message: String,
}

/// Response of `POST /cleanup-all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub deleted_count: Option<usize>,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Error body returned with non-2xx statuses.
///
/// `detail` is usually a string but validation failures may carry structured
/// JSON, so it is kept as a raw value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: serde_json::Value::String(detail.into()),
        }
    }

    /// Human-readable form of `detail`.
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// A local file ready to be sent as the multipart `file` field.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Read `path` from disk, naming the upload after its final component.
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().to_string());

        Ok(Self {
            content_type: guess_content_type(&file_name),
            file_name,
            bytes,
        })
    }
}

/// MIME type inferred from the file extension, if it is a known one.
pub fn guess_content_type(file_name: &str) -> Option<String> {
    mime_guess::from_path(file_name).first().map(|mime| mime.to_string())
}
