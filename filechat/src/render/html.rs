//! HTML rendering of the chat panel.
//!
//! Every piece of user- or server-provided text goes through [`escape_html`],
//! so message bodies are always displayed literally.

use std::fmt::Write;

use chrono::Local;

use crate::chat::{Transcript, TranscriptItem};
use crate::models::{TranscriptEntry, UploadedFile};

const EMPTY_STATE: &str = r#"<div class="empty-chat-state">
  <div class="empty-icon">💬</div>
  <p>Start a conversation by asking a question about your uploaded file</p>
</div>
"#;

const LOADING: &str = r#"<div class="message-bubble message-loading">
  <div class="message-header">Assistant</div>
  <div class="message-content"><span class="typing-indicator">Thinking...</span></div>
</div>
"#;

/// Escape the characters that are significant in HTML text and attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a single message bubble.
pub fn render_entry(entry: &TranscriptEntry) -> String {
    let time = entry.timestamp.with_timezone(&Local).format("%H:%M");
    format!(
        "<div class=\"message-bubble message-{role}\">\n  \
         <div class=\"message-header\">{header}</div>\n  \
         <div class=\"message-content\">{content}</div>\n  \
         <div class=\"message-time\">{time}</div>\n</div>\n",
        role = entry.role.as_str(),
        header = entry.role.display_name(),
        content = escape_html(&entry.text),
    )
}

/// Render the inner contents of the chat messages container.
pub fn render_transcript(transcript: &Transcript) -> String {
    let mut out = String::new();
    if transcript.shows_empty_state() {
        out.push_str(EMPTY_STATE);
    }
    for item in transcript.items() {
        match item {
            TranscriptItem::Entry(entry) => out.push_str(&render_entry(entry)),
            TranscriptItem::Loading(_) => out.push_str(LOADING),
        }
    }
    out
}

/// Render the file details table; `-` stands in for every field when no file is present.
pub fn render_file_details(file: Option<&UploadedFile>) -> String {
    let rows = super::terminal::file_detail_rows(file);
    let mut out = String::from("<dl class=\"file-details\">\n");
    for (label, value) in rows {
        let _ = writeln!(
            out,
            "  <dt>{}</dt><dd>{}</dd>",
            escape_html(label),
            escape_html(&value)
        );
    }
    out.push_str("</dl>\n");
    out
}

/// Render a standalone page holding the file details and the transcript.
pub fn render_page(session_id: &str, file: Option<&UploadedFile>, transcript: &Transcript) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>filechat transcript</title>\n</head>\n<body>\n\
         <p class=\"session\">Session: {session}</p>\n{details}\
         <div id=\"chatMessages\">\n{messages}</div>\n</body>\n</html>\n",
        session = escape_html(session_id),
        details = render_file_details(file),
        messages = render_transcript(transcript),
    )
}
