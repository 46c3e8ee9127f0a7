//! Server-side errors, rendered as `{"detail": ...}` JSON bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::api::ErrorBody;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The request was understood but cannot be served (400).
    #[error("{0}")]
    BadRequest(String),

    /// The request body did not match the expected shape (422).
    #[error("{0}")]
    Unprocessable(String),

    /// Filesystem failure while handling the request (500).
    #[error("{context}: {source}")]
    Internal {
        context: &'static str,
        source: std::io::Error,
    },
}

impl ServerError {
    pub const fn internal(context: &'static str, source: std::io::Error) -> Self {
        Self::Internal { context, source }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Internal { .. }) {
            error!(error = %self, "Request failed");
        }
        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
