//! Errors returned by the REST collaborator client.

use thiserror::Error;

/// Why a remote call did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a usable response: connection failure,
    /// unreadable body, or a body that was not the expected JSON.
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-2xx status and a `detail` message.
    #[error("{detail}")]
    Application { status: u16, detail: String },
}

impl ApiError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    /// HTTP status for application errors.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(_) => None,
            Self::Application { status, .. } => Some(*status),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err)
    }
}
