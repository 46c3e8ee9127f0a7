//! Data models shared by the client and the server.

mod file;
mod message;
mod session;

pub use file::UploadedFile;
pub use message::{Role, TranscriptEntry};
pub use session::SessionId;
