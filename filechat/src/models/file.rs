//! Metadata of the file uploaded in the current session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::render::format_bytes;

/// What the client knows about the uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// File name as echoed back by the server.
    pub name: String,
    /// MIME type, when the server knew it.
    pub content_type: Option<String>,
    /// Size in bytes as reported by the server.
    pub size: u64,
    /// When the upload completed on the client side.
    pub uploaded_at: DateTime<Utc>,
}

impl UploadedFile {
    pub fn new(name: String, content_type: Option<String>, size: u64) -> Self {
        Self {
            name,
            content_type,
            size,
            uploaded_at: Utc::now(),
        }
    }

    /// Human-readable size, e.g. `2 KB`.
    pub fn display_size(&self) -> String {
        format_bytes(self.size)
    }
}
