//! HTTP client for the upload/query/clear endpoints.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::ApiError;
use super::types::{
    ClearRequest, ClearResponse, CleanupResponse, ErrorBody, FileUpload, HealthResponse,
    QueryRequest, QueryResponse, UploadResponse,
};
use crate::models::SessionId;

/// The remote collaborator as seen by the chat controllers.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Ask the server to drop every stored session.
    async fn cleanup_all(&self) -> Result<CleanupResponse, ApiError>;

    /// Upload a file for `session_id`.
    async fn upload(
        &self,
        session_id: &SessionId,
        file: FileUpload,
    ) -> Result<UploadResponse, ApiError>;

    /// Ask a question about the session's uploaded file.
    async fn query(&self, session_id: &SessionId, query: &str) -> Result<QueryResponse, ApiError>;

    /// Delete the session's files and history on the server.
    async fn clear(&self, session_id: &SessionId) -> Result<ClearResponse, ApiError>;
}

/// [`ChatApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        read_json(resp).await
    }
}

/// Decode a success body as `T`, or a failure body as [`ErrorBody`].
///
/// Only a failure that carries a `{detail}` body is an application error. A
/// body that is not the expected JSON is a transport error whatever the status.
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.text().await?;
    debug!(status = status.as_u16(), bytes = body.len(), "Response received");

    if status.is_success() {
        return serde_json::from_str(&body).map_err(invalid_response);
    }

    let err: ErrorBody = serde_json::from_str(&body).map_err(invalid_response)?;
    Err(ApiError::Application {
        status: status.as_u16(),
        detail: err.message(),
    })
}

fn invalid_response(err: serde_json::Error) -> ApiError {
    ApiError::Transport(format!("Invalid response from server: {err}"))
}

#[async_trait]
impl ChatApi for HttpApi {
    async fn cleanup_all(&self) -> Result<CleanupResponse, ApiError> {
        let resp = self
            .client
            .post(self.url("/cleanup-all"))
            .json(&serde_json::json!({}))
            .send()
            .await?;
        read_json(resp).await
    }

    async fn upload(
        &self,
        session_id: &SessionId,
        file: FileUpload,
    ) -> Result<UploadResponse, ApiError> {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(mime) = file.content_type.as_deref() {
            part = part.mime_str(mime)?;
        }

        let form = Form::new()
            .part("file", part)
            .text("session_id", session_id.to_string());

        let resp = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn query(&self, session_id: &SessionId, query: &str) -> Result<QueryResponse, ApiError> {
        let body = QueryRequest {
            query: query.to_string(),
            session_id: session_id.clone(),
        };

        let resp = self
            .client
            .post(self.url("/query"))
            .json(&body)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn clear(&self, session_id: &SessionId) -> Result<ClearResponse, ApiError> {
        let body = ClearRequest {
            session_id: session_id.clone(),
        };

        let resp = self
            .client
            .post(self.url("/clear"))
            .json(&body)
            .send()
            .await?;
        read_json(resp).await
    }
}
