//! Errors surfaced to the user by the chat controllers.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;

/// Remote operation a controller can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Upload,
    Query,
    Clear,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Query => "query",
            Self::Clear => "clear",
        }
    }

    /// Message shown when the remote call for this operation failed.
    pub fn failure_message(self, err: &ApiError) -> String {
        match (self, err) {
            (Self::Upload, ApiError::Application { detail, .. }) => {
                format!("Upload failed: {detail}")
            }
            (Self::Upload, ApiError::Transport(msg)) => format!("Error uploading file: {msg}"),
            (Self::Query, ApiError::Application { detail, .. }) => {
                format!("Query failed: {detail}")
            }
            (Self::Query, ApiError::Transport(msg)) => format!("Error processing query: {msg}"),
            (Self::Clear, ApiError::Application { detail, .. }) => {
                format!("Failed to clear history: {detail}")
            }
            (Self::Clear, ApiError::Transport(msg)) => format!("Error clearing history: {msg}"),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input rejected before any request was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a file")]
    NoFileSelected,

    #[error("Please enter a query")]
    EmptyQuery,

    #[error("Please upload a file first")]
    NoFileUploaded,

    #[error("A file has already been uploaded in this session. Clear the session to upload another.")]
    UploadConsumed,

    #[error("Please wait for the pending {0} to finish")]
    Busy(Operation),
}

/// Anything a controller reports back to the user.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Error reading file {}: {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}", op.failure_message(source))]
    Remote { op: Operation, source: ApiError },
}

impl ChatError {
    pub const fn remote(op: Operation, source: ApiError) -> Self {
        Self::Remote { op, source }
    }

    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
