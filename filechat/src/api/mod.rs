//! Client side of the REST collaborator.
//!
//! [`ChatApi`] is the seam the chat controllers talk through; [`HttpApi`] is the
//! real implementation over `reqwest`.

mod client;
mod error;
mod types;

pub use client::{ChatApi, HttpApi};
pub use error::ApiError;
pub use types::{
    ClearRequest, ClearResponse, CleanupResponse, ErrorBody, FileUpload, HealthResponse,
    QueryRequest, QueryResponse, UploadResponse,
};
