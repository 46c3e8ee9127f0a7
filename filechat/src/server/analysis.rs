//! Canned "analysis" answer built from the latest uploaded file.

use super::store::StoredFile;

/// Build the answer text for `query` against `file`.
///
/// This is a stand-in for a real model: it echoes the query, reports basic file
/// facts and quotes the first `preview_chars` characters of the content.
pub fn build_answer(query: &str, file: &StoredFile, preview_chars: usize) -> String {
    let preview: String = file.content.chars().take(preview_chars).collect();
    let line_count = file.content.lines().count();

    format!(
        "Query: {query}\n\
         \n\
         File Analysis:\n\
         --------------\n\
         Filename: {name}\n\
         File Size: {size} bytes\n\
         \n\
         Sample Analysis:\n\
         • Total lines in file: {line_count}\n\
         • File contains configuration data that can be analyzed\n\
         • Query processed successfully\n\
         \n\
         Response:\n\
         ---------\n\
         Based on your query \"{query}\", here are the findings from the uploaded file:\n\
         \n\
         {preview}...\n\
         \n\
         (This is a demo response. In production, this would use NLP/AI to provide intelligent answers.)\n",
        name = file.filename,
        size = file.size,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn stored(content: &str) -> StoredFile {
        StoredFile {
            file_id: "file_1_a.txt".into(),
            filename: "a.txt".into(),
            path: PathBuf::from("/tmp/a.txt"),
            content_type: None,
            size: content.len() as u64,
            content: content.into(),
        }
    }

    #[test]
    fn test_answer_mentions_query_and_file() {
        let answer = build_answer("what region?", &stored("region = eu\nzone = b\n"), 500);
        assert!(answer.starts_with("Query: what region?\n"));
        assert!(answer.contains("Filename: a.txt"));
        assert!(answer.contains("Total lines in file: 2"));
        assert!(answer.contains("region = eu\nzone = b\n..."));
    }

    #[test]
    fn test_preview_is_truncated_by_chars() {
        let answer = build_answer("q", &stored("ééééé"), 3);
        assert!(answer.contains("\nééé...\n"));
    }
}
