//! Per-session file storage: on disk under the upload root, indexed in memory.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};
use uuid::Uuid;

static SESSION_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("session id pattern is valid"));

/// Whether `session_id` is safe to use as a directory name.
pub fn is_valid_session_id(session_id: &str) -> bool {
    SESSION_ID_RE.is_match(session_id)
}

/// Reduce a client-supplied file name to a bare, harmless final component.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match base {
        "" | "." | ".." => "upload".to_string(),
        other => other.to_string(),
    }
}

/// A file uploaded into a session.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_id: String,
    pub filename: String,
    pub path: PathBuf,
    pub content_type: Option<String>,
    pub size: u64,
    /// Content decoded as UTF-8, invalid sequences replaced.
    pub content: String,
}

/// Session store. One directory per session under `root`.
pub struct SessionStore {
    root: PathBuf,
    sessions: HashMap<String, Vec<StoredFile>>,
}

impl SessionStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            sessions: HashMap::new(),
        }
    }

    fn session_dir(&self, session_id: &str) -> PathBuf {
        self.root.join(session_id)
    }

    /// Write `bytes` to disk and record the file as the session's latest.
    pub async fn save(
        &mut self,
        session_id: &str,
        filename: &str,
        content_type: Option<String>,
        bytes: &[u8],
    ) -> std::io::Result<&StoredFile> {
        let dir = self.session_dir(session_id);
        tokio::fs::create_dir_all(&dir).await?;

        let filename = sanitize_filename(filename);
        let file_id = format!("file_{}_{filename}", Uuid::now_v7().simple());
        let path = dir.join(&file_id);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "Stored upload");

        let stored = StoredFile {
            file_id,
            filename,
            path,
            content_type,
            size: bytes.len() as u64,
            content: String::from_utf8_lossy(bytes).into_owned(),
        };

        let files = self.sessions.entry(session_id.to_string()).or_default();
        files.push(stored);
        Ok(&files[files.len() - 1])
    }

    /// Most recently uploaded file for a session.
    pub fn latest(&self, session_id: &str) -> Option<&StoredFile> {
        self.sessions.get(session_id).and_then(|files| files.last())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Forget a session and delete its directory. Unknown sessions are fine.
    pub async fn clear_session(&mut self, session_id: &str) -> std::io::Result<()> {
        self.sessions.remove(session_id);

        let dir = self.session_dir(session_id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Delete everything under the upload root and forget every session.
    ///
    /// Returns how many top-level entries were removed. Entries that cannot be
    /// removed are logged and skipped.
    pub async fn clear_all(&mut self) -> std::io::Result<usize> {
        self.sessions.clear();

        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut deleted = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let result = if entry.file_type().await?.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };

            match result {
                Ok(()) => deleted += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove upload entry"),
            }
        }

        Ok(deleted)
    }
}
