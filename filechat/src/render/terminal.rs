//! Terminal rendering for the REPL.

use chrono::Local;
use colored::Colorize;

use crate::chat::{Transcript, TranscriptItem};
use crate::models::{Role, TranscriptEntry, UploadedFile};

const PLACEHOLDER: &str = "-";

const EMPTY_STATE: &str = "Start a conversation by asking a question about your uploaded file";

/// Strip control characters (escape sequences included) except newline and tab.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Label/value pairs for the file details panel.
pub fn file_detail_rows(file: Option<&UploadedFile>) -> [(&'static str, String); 4] {
    match file {
        Some(file) => [
            ("File name", file.name.clone()),
            (
                "File type",
                file.content_type
                    .clone()
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
            ),
            ("File size", file.display_size()),
            (
                "Uploaded",
                file.uploaded_at
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            ),
        ],
        None => [
            ("File name", PLACEHOLDER.to_string()),
            ("File type", PLACEHOLDER.to_string()),
            ("File size", PLACEHOLDER.to_string()),
            ("Uploaded", PLACEHOLDER.to_string()),
        ],
    }
}

pub fn format_file_details(file: Option<&UploadedFile>) -> String {
    file_detail_rows(file)
        .iter()
        .map(|(label, value)| {
            let label = format!("{:<11}", format!("{label}:"));
            format!("{} {}", label.bold(), sanitize(value))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format one message with a coloured header line.
pub fn format_entry(entry: &TranscriptEntry) -> String {
    let time = entry.timestamp.with_timezone(&Local).format("%H:%M");
    let header = match entry.role {
        Role::User => entry.role.display_name().cyan().bold(),
        Role::Assistant => entry.role.display_name().green().bold(),
    };
    format!("{header} {}\n{}", time.to_string().dimmed(), sanitize(&entry.text))
}

pub fn format_loading() -> String {
    format!("{} {}", "Assistant".green().bold(), "Thinking...".dimmed())
}

/// Format the whole transcript, including the empty state and loading rows.
pub fn format_transcript(transcript: &Transcript) -> String {
    if transcript.shows_empty_state() && transcript.is_empty() {
        return EMPTY_STATE.dimmed().to_string();
    }

    transcript
        .items()
        .iter()
        .map(|item| match item {
            TranscriptItem::Entry(entry) => format_entry(entry),
            TranscriptItem::Loading(_) => format_loading(),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_escape_sequences() {
        assert_eq!(sanitize("a\u{1b}[31mred\u{7}"), "a[31mred");
        assert_eq!(sanitize("line\n\tindent"), "line\n\tindent");
    }

    #[test]
    fn test_placeholder_rows() {
        let rows = file_detail_rows(None);
        assert!(rows.iter().all(|(_, value)| value == PLACEHOLDER));
    }

    #[test]
    fn test_file_rows() {
        let file = UploadedFile::new("a.pdf".into(), Some("application/pdf".into()), 1536);
        let rows = file_detail_rows(Some(&file));
        assert_eq!(rows[0].1, "a.pdf");
        assert_eq!(rows[1].1, "application/pdf");
        assert_eq!(rows[2].1, "1.5 KB");
    }

    #[test]
    fn test_entry_text_is_sanitized() {
        colored::control::set_override(false);
        let entry = TranscriptEntry::assistant("ok\u{1b}]0;pwned\u{7}");
        let out = format_entry(&entry);
        assert!(out.starts_with("Assistant "));
        assert!(out.ends_with("ok]0;pwned"));
    }
}
