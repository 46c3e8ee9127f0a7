//! Chat session state and the upload/query/clear controllers.
//!
//! Every remote operation is split in two halves:
//! - `begin_*` validates input, applies the optimistic UI changes and returns a
//!   ticket;
//! - `finish_*` consumes the ticket together with the call result.
//!
//! Between the two halves the session is marked busy, so the submit, upload and
//! clear controls all read as disabled and overlapping operations are rejected.
//! The async `upload`/`ask`/`clear` helpers chain both halves around a
//! [`ChatApi`] call; the REPL drives the halves itself so it can keep reading
//! input while a request is in flight.

mod error;
mod transcript;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::api::{ApiError, ChatApi, ClearResponse, FileUpload, QueryResponse, UploadResponse};
use crate::models::{SessionId, TranscriptEntry, UploadedFile};

pub use error::{ChatError, Operation, ValidationError};
pub use transcript::{LoadingHandle, Transcript, TranscriptItem};

/// How long the upload success banner stays visible.
pub const BANNER_TTL: Duration = Duration::from_secs(3);

const UPLOAD_SUCCESS: &str = "File uploaded successfully!";

/// One-upload-per-session constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadGate {
    consumed: bool,
}

impl UploadGate {
    pub const fn is_consumed(self) -> bool {
        self.consumed
    }

    /// Fail if an upload already went through in this session.
    pub const fn check(self) -> Result<(), ValidationError> {
        if self.consumed {
            Err(ValidationError::UploadConsumed)
        } else {
            Ok(())
        }
    }

    fn consume(&mut self) {
        self.consumed = true;
    }

    fn release(&mut self) {
        self.consumed = false;
    }
}

/// Transient notice that hides itself after a fixed delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub text: String,
    shown_at: Instant,
    ttl: Duration,
}

impl Banner {
    fn new(text: impl Into<String>, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            shown_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) < self.ttl
    }
}

/// Pending upload. Hand it back to [`ChatSession::finish_upload`].
#[derive(Debug)]
#[must_use = "an unfinished ticket leaves the session busy"]
pub struct UploadTicket {
    path: PathBuf,
}

impl UploadTicket {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Pending query. Hand it back to [`ChatSession::finish_query`].
#[derive(Debug)]
#[must_use = "an unfinished ticket leaves the session busy"]
pub struct QueryTicket {
    query: String,
    loading: LoadingHandle,
}

impl QueryTicket {
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Pending clear. Hand it back to [`ChatSession::finish_clear`].
#[derive(Debug)]
#[must_use = "an unfinished ticket leaves the session busy"]
pub struct ClearTicket {
    _private: (),
}

/// Client-side state for one run of the chat front end.
#[derive(Debug)]
pub struct ChatSession {
    session_id: SessionId,
    transcript: Transcript,
    file: Option<UploadedFile>,
    gate: UploadGate,
    chat_visible: bool,
    in_flight: Option<Operation>,
    banner: Option<Banner>,
    banner_ttl: Duration,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// Start a session with a freshly generated id.
    pub fn new() -> Self {
        Self::with_session_id(SessionId::generate())
    }

    pub const fn with_session_id(session_id: SessionId) -> Self {
        Self {
            session_id,
            transcript: Transcript::new(),
            file: None,
            gate: UploadGate { consumed: false },
            chat_visible: false,
            in_flight: None,
            banner: None,
            banner_ttl: BANNER_TTL,
        }
    }

    #[cfg(test)]
    #[must_use]
    pub const fn with_banner_ttl(mut self, ttl: Duration) -> Self {
        self.banner_ttl = ttl;
        self
    }

    /// Fire the best-effort `cleanup-all` call. Failures are logged only.
    pub async fn start(&self, api: &dyn ChatApi) {
        info!(session_id = %self.session_id, "New session started");
        match api.cleanup_all().await {
            Ok(resp) => info!(
                message = resp.message.as_deref().unwrap_or(""),
                deleted = resp.deleted_count.unwrap_or(0),
                "Cleanup complete"
            ),
            Err(e) => warn!(error = %e, "Cleanup of old sessions failed"),
        }
    }

    // === Accessors ===

    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub const fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    pub const fn gate(&self) -> UploadGate {
        self.gate
    }

    /// Whether the chat surface is shown (a file is present).
    pub const fn chat_visible(&self) -> bool {
        self.chat_visible
    }

    pub const fn in_flight(&self) -> Option<Operation> {
        self.in_flight
    }

    /// Queries need an idle session with the chat surface shown.
    pub const fn submit_enabled(&self) -> bool {
        self.in_flight.is_none() && self.chat_visible
    }

    pub const fn upload_enabled(&self) -> bool {
        self.in_flight.is_none() && !self.gate.is_consumed()
    }

    pub const fn clear_enabled(&self) -> bool {
        self.in_flight.is_none()
    }

    /// The success banner, if it has not expired yet.
    pub fn banner(&self) -> Option<&Banner> {
        self.banner_at(Instant::now())
    }

    pub fn banner_at(&self, now: Instant) -> Option<&Banner> {
        self.banner.as_ref().filter(|b| b.is_visible_at(now))
    }

    const fn ensure_idle(&self) -> Result<(), ValidationError> {
        match self.in_flight {
            Some(op) => Err(ValidationError::Busy(op)),
            None => Ok(()),
        }
    }

    // === Upload ===

    /// Validate an upload request and mark the session busy.
    pub fn begin_upload(&mut self, path: Option<&Path>) -> Result<UploadTicket, ChatError> {
        self.ensure_idle()?;
        self.gate.check()?;

        let path = path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ValidationError::NoFileSelected)?;

        self.in_flight = Some(Operation::Upload);
        Ok(UploadTicket {
            path: path.to_path_buf(),
        })
    }

    /// Settle an upload. On success the transcript is reset and the gate closes.
    pub fn finish_upload(
        &mut self,
        ticket: UploadTicket,
        result: Result<UploadResponse, ChatError>,
    ) -> Result<&UploadedFile, ChatError> {
        self.in_flight = None;

        let resp = result.inspect_err(|e| {
            warn!(path = %ticket.path.display(), error = %e, "Upload failed");
        })?;

        info!(file = %resp.filename, size = resp.size, "Upload complete");
        self.transcript.reset();
        self.chat_visible = true;
        self.gate.consume();
        self.banner = Some(Banner::new(UPLOAD_SUCCESS, self.banner_ttl));

        let file = UploadedFile::new(resp.filename, resp.content_type, resp.size);
        Ok(&*self.file.insert(file))
    }

    /// Read `path` and upload it for this session.
    pub async fn upload(
        &mut self,
        api: &dyn ChatApi,
        path: Option<&Path>,
    ) -> Result<&UploadedFile, ChatError> {
        let ticket = self.begin_upload(path)?;
        let result = send_upload(api, &self.session_id, ticket.path()).await;
        self.finish_upload(ticket, result)
    }

    // === Query ===

    /// Append the user entry and a loading placeholder, then mark the session busy.
    pub fn begin_query(&mut self, text: &str) -> Result<QueryTicket, ChatError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(ValidationError::EmptyQuery.into());
        }
        self.ensure_idle()?;
        if !self.chat_visible {
            return Err(ValidationError::NoFileUploaded.into());
        }

        self.transcript.append(TranscriptEntry::user(query));
        let loading = self.transcript.insert_loading();
        self.in_flight = Some(Operation::Query);
        debug!(query, "Query submitted");

        Ok(QueryTicket {
            query: query.to_string(),
            loading,
        })
    }

    /// Remove the placeholder and append the assistant reply on success.
    ///
    /// The user entry stays in place whatever the outcome.
    pub fn finish_query(
        &mut self,
        ticket: QueryTicket,
        result: Result<QueryResponse, ApiError>,
    ) -> Result<TranscriptEntry, ChatError> {
        self.in_flight = None;
        self.transcript.remove(ticket.loading);

        let resp = result.map_err(|e| {
            warn!(query = %ticket.query, status = e.status(), error = %e, "Query failed");
            ChatError::remote(Operation::Query, e)
        })?;

        let entry = TranscriptEntry::assistant(resp.response);
        self.transcript.append(entry.clone());
        Ok(entry)
    }

    /// Submit a query and wait for the answer.
    pub async fn ask(&mut self, api: &dyn ChatApi, text: &str) -> Result<TranscriptEntry, ChatError> {
        let ticket = self.begin_query(text)?;
        let result = api.query(&self.session_id, ticket.query()).await;
        self.finish_query(ticket, result)
    }

    // === Clear ===

    /// Start a clear. Returns `Ok(None)` when the user declined the confirmation.
    pub fn begin_clear(&mut self, confirmed: bool) -> Result<Option<ClearTicket>, ChatError> {
        self.ensure_idle()?;
        if !confirmed {
            debug!("Clear cancelled by user");
            return Ok(None);
        }

        self.in_flight = Some(Operation::Clear);
        Ok(Some(ClearTicket { _private: () }))
    }

    /// Settle a clear. Client state is reset only on success.
    pub fn finish_clear(
        &mut self,
        ticket: ClearTicket,
        result: Result<ClearResponse, ApiError>,
    ) -> Result<String, ChatError> {
        let ClearTicket { _private: () } = ticket;
        self.in_flight = None;

        let resp = result.map_err(|e| {
            warn!(status = e.status(), error = %e, "Clear failed");
            ChatError::remote(Operation::Clear, e)
        })?;

        self.transcript.reset();
        self.file = None;
        self.chat_visible = false;
        self.gate.release();
        self.banner = None;
        info!(session_id = %self.session_id, "Session cleared");

        Ok(resp.message)
    }

    /// Confirmed clear round trip. `Ok(None)` means nothing was sent.
    pub async fn clear(
        &mut self,
        api: &dyn ChatApi,
        confirmed: bool,
    ) -> Result<Option<String>, ChatError> {
        let Some(ticket) = self.begin_clear(confirmed)? else {
            return Ok(None);
        };
        let result = api.clear(&self.session_id).await;
        self.finish_clear(ticket, result).map(Some)
    }
}

/// Read the file behind an upload ticket and send it.
pub async fn send_upload(
    api: &dyn ChatApi,
    session_id: &SessionId,
    path: &Path,
) -> Result<UploadResponse, ChatError> {
    let file = FileUpload::read(path).await.map_err(|source| ChatError::File {
        path: path.to_path_buf(),
        source,
    })?;

    api.upload(session_id, file)
        .await
        .map_err(|e| ChatError::remote(Operation::Upload, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Fake collaborator that replays scripted results and counts calls.
    #[derive(Default)]
    struct ScriptedApi {
        uploads: Mutex<VecDeque<Result<UploadResponse, ApiError>>>,
        queries: Mutex<VecDeque<Result<QueryResponse, ApiError>>>,
        clears: Mutex<VecDeque<Result<ClearResponse, ApiError>>>,
        cleanup_fails: bool,
        upload_calls: AtomicUsize,
        query_calls: AtomicUsize,
        clear_calls: AtomicUsize,
        cleanup_calls: AtomicUsize,
    }

    impl ScriptedApi {
        fn upload_ok(self, name: &str, size: u64) -> Self {
            self.uploads
                .lock()
                .unwrap()
                .push_back(Ok(upload_response(name, size)));
            self
        }

        fn upload_err(self, err: ApiError) -> Self {
            self.uploads.lock().unwrap().push_back(Err(err));
            self
        }

        fn answer(self, text: &str) -> Self {
            self.queries.lock().unwrap().push_back(Ok(QueryResponse {
                response: text.into(),
                query: None,
                file_analyzed: None,
            }));
            self
        }

        fn query_err(self, err: ApiError) -> Self {
            self.queries.lock().unwrap().push_back(Err(err));
            self
        }

        fn clear_ok(self) -> Self {
            self.clears.lock().unwrap().push_back(Ok(ClearResponse {
                message: "Upload history cleared successfully.".into(),
            }));
            self
        }

        fn clear_err(self, err: ApiError) -> Self {
            self.clears.lock().unwrap().push_back(Err(err));
            self
        }

        fn calls(counter: &AtomicUsize) -> usize {
            counter.load(Ordering::SeqCst)
        }
    }

    fn unscripted() -> ApiError {
        ApiError::Transport("no scripted response".into())
    }

    #[async_trait]
    impl ChatApi for ScriptedApi {
        async fn cleanup_all(&self) -> Result<crate::api::CleanupResponse, ApiError> {
            self.cleanup_calls.fetch_add(1, Ordering::SeqCst);
            if self.cleanup_fails {
                return Err(ApiError::Transport("connection refused".into()));
            }
            Ok(crate::api::CleanupResponse {
                message: Some("done".into()),
                deleted_count: Some(0),
            })
        }

        async fn upload(
            &self,
            _session_id: &SessionId,
            _file: FileUpload,
        ) -> Result<UploadResponse, ApiError> {
            self.upload_calls.fetch_add(1, Ordering::SeqCst);
            self.uploads.lock().unwrap().pop_front().unwrap_or_else(|| Err(unscripted()))
        }

        async fn query(&self, _session_id: &SessionId, _query: &str) -> Result<QueryResponse, ApiError> {
            self.query_calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().pop_front().unwrap_or_else(|| Err(unscripted()))
        }

        async fn clear(&self, _session_id: &SessionId) -> Result<ClearResponse, ApiError> {
            self.clear_calls.fetch_add(1, Ordering::SeqCst);
            self.clears.lock().unwrap().pop_front().unwrap_or_else(|| Err(unscripted()))
        }
    }

    fn sample_file() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.pdf");
        std::fs::write(&path, vec![0_u8; 2048]).unwrap();
        (dir, path)
    }

    fn upload_response(name: &str, size: u64) -> UploadResponse {
        UploadResponse {
            message: Some("File uploaded successfully".into()),
            file_id: Some("file_1".into()),
            filename: name.into(),
            content_type: Some("application/pdf".into()),
            size,
        }
    }

    /// Session that already has a file, so the chat surface is shown.
    fn session_with_file() -> ChatSession {
        let mut session = ChatSession::new();
        let ticket = session.begin_upload(Some(Path::new("a.pdf"))).unwrap();
        session
            .finish_upload(ticket, Ok(upload_response("a.pdf", 2048)))
            .unwrap();
        session
    }

    fn roles_and_texts(session: &ChatSession) -> Vec<(Role, String)> {
        session
            .transcript()
            .entries()
            .map(|e| (e.role, e.text.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_start_swallows_cleanup_failure() {
        let api = ScriptedApi {
            cleanup_fails: true,
            ..ScriptedApi::default()
        };
        let session = ChatSession::new();
        session.start(&api).await;
        assert_eq!(ScriptedApi::calls(&api.cleanup_calls), 1);
        assert!(session.upload_enabled());
        assert!(session.clear_enabled());
    }

    #[tokio::test]
    async fn test_upload_without_file_sends_nothing() {
        let api = ScriptedApi::default();
        let mut session = ChatSession::new();

        let err = session.upload(&api, None).await.unwrap_err();
        assert!(matches!(err, ChatError::Validation(ValidationError::NoFileSelected)));

        let err = session.upload(&api, Some(Path::new(""))).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(ScriptedApi::calls(&api.upload_calls), 0);
        assert!(session.upload_enabled());
    }

    #[tokio::test]
    async fn test_upload_success_updates_state() {
        let (_dir, path) = sample_file();
        let api = ScriptedApi::default().upload_ok("a.pdf", 2048);
        let mut session = ChatSession::new();

        let file = session.upload(&api, Some(&path)).await.unwrap();
        assert_eq!(file.name, "a.pdf");
        assert_eq!(file.display_size(), "2 KB");

        assert!(session.chat_visible());
        assert!(session.gate().is_consumed());
        assert!(!session.upload_enabled());
        assert!(session.transcript().shows_empty_state());
        assert!(session.banner().is_some());
    }

    #[tokio::test]
    async fn test_gate_blocks_second_upload_until_clear() {
        let (_dir, path) = sample_file();
        let api = ScriptedApi::default()
            .upload_ok("a.pdf", 2048)
            .clear_ok()
            .upload_ok("a.pdf", 2048);
        let mut session = ChatSession::new();

        session.upload(&api, Some(&path)).await.unwrap();
        let err = session.upload(&api, Some(&path)).await.unwrap_err();
        assert!(matches!(err, ChatError::Validation(ValidationError::UploadConsumed)));
        assert_eq!(ScriptedApi::calls(&api.upload_calls), 1);

        session.clear(&api, true).await.unwrap();
        assert!(session.upload_enabled());
        session.upload(&api, Some(&path)).await.unwrap();
        assert_eq!(ScriptedApi::calls(&api.upload_calls), 2);
    }

    #[tokio::test]
    async fn test_upload_failure_leaves_state_unchanged() {
        let (_dir, path) = sample_file();
        let api = ScriptedApi::default().upload_err(ApiError::Application {
            status: 500,
            detail: "Error uploading file: disk full".into(),
        });
        let mut session = ChatSession::new();

        let err = session.upload(&api, Some(&path)).await.unwrap_err();
        assert_eq!(err.to_string(), "Upload failed: Error uploading file: disk full");
        assert!(session.file().is_none());
        assert!(!session.chat_visible());
        assert!(!session.gate().is_consumed());
        assert!(session.in_flight().is_none());
    }

    #[tokio::test]
    async fn test_upload_unreadable_file() {
        let api = ScriptedApi::default();
        let mut session = ChatSession::new();

        let err = session
            .upload(&api, Some(Path::new("/definitely/not/here.txt")))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::File { .. }));
        assert_eq!(ScriptedApi::calls(&api.upload_calls), 0);
        assert!(session.upload_enabled());
    }

    #[tokio::test]
    async fn test_empty_query_sends_nothing() {
        let api = ScriptedApi::default();
        let mut session = ChatSession::new();

        for text in ["", "   ", "\n\t"] {
            let err = session.ask(&api, text).await.unwrap_err();
            assert!(matches!(err, ChatError::Validation(ValidationError::EmptyQuery)));
        }
        assert_eq!(ScriptedApi::calls(&api.query_calls), 0);
        assert!(session.transcript().shows_empty_state());
    }

    #[tokio::test]
    async fn test_query_needs_uploaded_file() {
        let (_dir, path) = sample_file();
        let api = ScriptedApi::default()
            .upload_ok("a.pdf", 2048)
            .answer("R1")
            .clear_ok();
        let mut session = ChatSession::new();
        assert!(!session.submit_enabled());

        let err = session.ask(&api, "too early").await.unwrap_err();
        assert!(matches!(err, ChatError::Validation(ValidationError::NoFileUploaded)));
        assert!(session.transcript().shows_empty_state());

        session.upload(&api, Some(&path)).await.unwrap();
        assert!(session.submit_enabled());
        session.ask(&api, "Q1").await.unwrap();

        session.clear(&api, true).await.unwrap();
        assert!(!session.submit_enabled());
        let err = session.ask(&api, "after clear").await.unwrap_err();
        assert!(matches!(err, ChatError::Validation(ValidationError::NoFileUploaded)));
        assert_eq!(ScriptedApi::calls(&api.query_calls), 1);
    }

    #[tokio::test]
    async fn test_sequential_queries_keep_order() {
        let api = ScriptedApi::default().answer("R1").answer("R2");
        let mut session = session_with_file();

        session.ask(&api, "Q1").await.unwrap();
        session.ask(&api, "  Q2 ").await.unwrap();

        assert_eq!(
            roles_and_texts(&session),
            vec![
                (Role::User, "Q1".to_string()),
                (Role::Assistant, "R1".to_string()),
                (Role::User, "Q2".to_string()),
                (Role::Assistant, "R2".to_string()),
            ]
        );
        assert!(!session.transcript().is_loading());
    }

    #[test]
    fn test_begin_query_is_optimistic() {
        let mut session = session_with_file();
        let ticket = session.begin_query("hello").unwrap();

        assert_eq!(ticket.query(), "hello");
        assert!(session.transcript().is_loading());
        assert!(!session.submit_enabled());
        assert_eq!(session.transcript().len(), 1);

        let entry = session
            .finish_query(
                ticket,
                Ok(QueryResponse {
                    response: "hi".into(),
                    query: None,
                    file_analyzed: None,
                }),
            )
            .unwrap();
        assert_eq!(entry.role, Role::Assistant);
        assert!(session.submit_enabled());
    }

    #[tokio::test]
    async fn test_query_failure_keeps_user_entry() {
        let api = ScriptedApi::default().query_err(ApiError::Application {
            status: 400,
            detail: "No file uploaded. Please upload a file first.".into(),
        });
        let mut session = session_with_file();

        let err = session.ask(&api, "Q1").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Query failed: No file uploaded. Please upload a file first."
        );
        assert!(!session.transcript().is_loading());
        assert!(session.submit_enabled());
        assert_eq!(roles_and_texts(&session), vec![(Role::User, "Q1".to_string())]);
    }

    #[tokio::test]
    async fn test_query_transport_failure() {
        let api = ScriptedApi::default().query_err(ApiError::Transport("timed out".into()));
        let mut session = session_with_file();

        let err = session.ask(&api, "Q1").await.unwrap_err();
        assert_eq!(err.to_string(), "Error processing query: timed out");
        assert!(session.submit_enabled());
    }

    #[test]
    fn test_busy_session_rejects_other_operations() {
        let mut session = session_with_file();
        let ticket = session.begin_query("slow one").unwrap();

        assert!(!session.clear_enabled());
        let err = session.begin_clear(true).unwrap_err();
        assert!(matches!(err, ChatError::Validation(ValidationError::Busy(Operation::Query))));

        let err = session.begin_upload(Some(Path::new("a.txt"))).unwrap_err();
        assert!(matches!(err, ChatError::Validation(ValidationError::Busy(Operation::Query))));

        let err = session.begin_query("second").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(session.transcript().len(), 1);

        let _ = session.finish_query(ticket, Err(ApiError::Transport("x".into())));
        assert!(session.clear_enabled());
    }

    #[tokio::test]
    async fn test_declined_clear_sends_nothing() {
        let api = ScriptedApi::default().answer("R1");
        let mut session = session_with_file();
        session.ask(&api, "Q1").await.unwrap();

        let outcome = session.clear(&api, false).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(ScriptedApi::calls(&api.clear_calls), 0);
        assert_eq!(session.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_resets_everything() {
        let (_dir, path) = sample_file();
        let api = ScriptedApi::default()
            .upload_ok("a.pdf", 2048)
            .answer("R1")
            .clear_ok();
        let mut session = ChatSession::new();
        session.upload(&api, Some(&path)).await.unwrap();
        session.ask(&api, "Q1").await.unwrap();

        let message = session.clear(&api, true).await.unwrap();
        assert_eq!(message.as_deref(), Some("Upload history cleared successfully."));
        assert!(session.transcript().shows_empty_state());
        assert!(session.transcript().items().is_empty());
        assert!(session.file().is_none());
        assert!(!session.chat_visible());
        assert!(!session.gate().is_consumed());
        assert!(session.banner().is_none());
    }

    #[tokio::test]
    async fn test_clear_failure_keeps_state() {
        let (_dir, path) = sample_file();
        let api = ScriptedApi::default()
            .upload_ok("a.pdf", 2048)
            .answer("R1")
            .clear_err(ApiError::Application {
                status: 500,
                detail: "Error clearing history: busy".into(),
            });
        let mut session = ChatSession::new();
        session.upload(&api, Some(&path)).await.unwrap();
        session.ask(&api, "Q1").await.unwrap();

        let err = session.clear(&api, true).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to clear history: Error clearing history: busy");
        assert_eq!(session.transcript().len(), 2);
        assert!(session.file().is_some());
        assert!(session.gate().is_consumed());
        assert!(session.clear_enabled());
    }

    #[tokio::test]
    async fn test_banner_expires() {
        let (_dir, path) = sample_file();
        let api = ScriptedApi::default().upload_ok("a.pdf", 2048);
        let mut session = ChatSession::new().with_banner_ttl(Duration::from_millis(50));
        session.upload(&api, Some(&path)).await.unwrap();

        let now = Instant::now();
        assert!(session.banner_at(now).is_some());
        assert!(session.banner_at(now + Duration::from_millis(60)).is_none());
    }
}
