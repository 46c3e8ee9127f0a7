//! filechat server - the upload/query collaborator the chat client talks to.
//!
//! Sessions live in memory, keyed by the client-generated session id, and their
//! files are written under `<upload_dir>/<session_id>/`.
//!
//! Endpoints:
//! - POST /upload - Store a file for a session (multipart: file, session_id)
//! - POST /query - Answer a query about the session's latest file
//! - POST /clear - Delete one session's files and state
//! - POST /cleanup-all - Delete every session
//! - GET /health - Liveness probe
//! - GET / - Landing page

mod analysis;
mod error;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{multipart::Multipart, rejection::JsonRejection, DefaultBodyLimit, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::api::{
    ClearRequest, ClearResponse, CleanupResponse, HealthResponse, QueryRequest, QueryResponse,
    UploadResponse,
};
pub use crate::config::ServerConfig;

pub use error::ServerError;
use store::{is_valid_session_id, SessionStore};

const SERVICE_NAME: &str = "filechat";
const CLEAR_MESSAGE: &str =
    "Upload history cleared successfully. All files deleted from your session.";
const NO_FILE_MESSAGE: &str = "No file uploaded. Please upload a file first.";

/// Shared server state.
pub struct ServerState {
    store: RwLock<SessionStore>,
    preview_chars: usize,
}

/// Build the router for `config`.
pub fn router(config: &ServerConfig) -> Router {
    let state = Arc::new(ServerState {
        store: RwLock::new(SessionStore::new(config.upload_dir.clone())),
        preview_chars: config.preview_chars,
    });

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health))
        .route("/upload", post(upload_file))
        .route("/query", post(process_query))
        .route("/clear", post(clear_history))
        .route("/cleanup-all", post(cleanup_all_sessions))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on an already bound listener until the process stops.
pub async fn serve(listener: TcpListener, config: ServerConfig) -> Result<()> {
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.upload_dir.display()))?;

    let app = router(&config);
    axum::serve(listener, app).await.context("Server error")
}

/// Bind `host:port` from `config` and serve.
pub async fn start_server(config: ServerConfig, open_browser: bool) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, upload_dir = %config.upload_dir.display(), "filechat server starting");

    if open_browser {
        let url = format!("http://127.0.0.1:{}", config.port);
        if let Err(e) = open::that(&url) {
            warn!(%url, error = %e, "Could not open browser");
        }
    }

    serve(listener, config).await
}

// === Handlers ===

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

/// Uploaded `file` field.
struct FilePart {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

async fn upload_file(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServerError> {
    let mut file: Option<FilePart> = None;
    let mut session_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.body_text()))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(String::from);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.body_text()))?;
                file = Some(FilePart {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("session_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.body_text()))?;
                session_id = Some(text);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ServerError::BadRequest("Missing form field: file".into()))?;
    let session_id =
        session_id.ok_or_else(|| ServerError::BadRequest("Missing form field: session_id".into()))?;
    check_session_id(&session_id)?;

    let mut store = state.store.write().await;
    let stored = store
        .save(&session_id, &file.filename, file.content_type, &file.bytes)
        .await
        .map_err(|e| ServerError::internal("Error uploading file", e))?;
    info!(
        %session_id,
        file = %stored.filename,
        path = %stored.path.display(),
        size = stored.size,
        "File uploaded"
    );

    Ok(Json(UploadResponse {
        message: Some("File uploaded successfully".to_string()),
        file_id: Some(stored.file_id.clone()),
        filename: stored.filename.clone(),
        content_type: stored.content_type.clone(),
        size: stored.size,
    }))
}

async fn process_query(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ServerError> {
    let Json(req) = body.map_err(|e| ServerError::Unprocessable(e.body_text()))?;
    let session_id = req.session_id.as_str();

    let store = state.store.read().await;
    let file = store
        .latest(session_id)
        .ok_or_else(|| ServerError::BadRequest(NO_FILE_MESSAGE.into()))?;

    let response = analysis::build_answer(&req.query, file, state.preview_chars);
    info!(%session_id, file = %file.filename, "Query answered");

    Ok(Json(QueryResponse {
        response,
        query: Some(req.query.clone()),
        file_analyzed: Some(file.filename.clone()),
    }))
}

async fn clear_history(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<ClearRequest>, JsonRejection>,
) -> Result<Json<ClearResponse>, ServerError> {
    let Json(req) = body.map_err(|e| ServerError::Unprocessable(e.body_text()))?;
    let session_id = req.session_id.as_str();
    check_session_id(session_id)?;

    state
        .store
        .write()
        .await
        .clear_session(session_id)
        .await
        .map_err(|e| ServerError::internal("Error clearing history", e))?;
    info!(%session_id, "Session cleared");

    Ok(Json(ClearResponse {
        message: CLEAR_MESSAGE.to_string(),
    }))
}

async fn cleanup_all_sessions(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<CleanupResponse>, ServerError> {
    let mut store = state.store.write().await;
    let sessions = store.session_count();
    let deleted = store
        .clear_all()
        .await
        .map_err(|e| ServerError::internal("Error cleaning up all sessions", e))?;
    info!(sessions, deleted, "All sessions cleaned up");

    Ok(Json(CleanupResponse {
        message: Some(format!(
            "All sessions cleaned up successfully. Removed {deleted} items."
        )),
        deleted_count: Some(deleted),
    }))
}

fn check_session_id(session_id: &str) -> Result<(), ServerError> {
    if is_valid_session_id(session_id) {
        Ok(())
    } else {
        Err(ServerError::BadRequest("Invalid session id".into()))
    }
}
