// ImageQA - core/export.rs
//
// Plain-text and JSON export of the conversation history.
// Core layer: writes to any Write trait object.

use crate::core::model::ConversationEntry;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Render entries as `Q: ...\nA: ...` blocks, oldest first, separated by a
/// blank line. Empty history renders as an empty string.
pub fn export_history(entries: &[ConversationEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("Q: {}\nA: {}", e.question, e.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Write the plain-text export to `writer`. Returns the number of entries written.
pub fn write_history_text<W: Write>(
    entries: &[ConversationEntry],
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let io_err = |e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    };
    writer
        .write_all(export_history(entries).as_bytes())
        .map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    Ok(entries.len())
}

/// Write entries as a pretty-printed JSON array of `{question, answer}` objects.
pub fn write_history_json<W: Write>(
    entries: &[ConversationEntry],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, entries).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(entries.len())
}

/// Whether `path` asks for the JSON export (by extension).
pub fn wants_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entries() -> Vec<ConversationEntry> {
        vec![
            ConversationEntry::new("What color is the sky?", "blue"),
            ConversationEntry::new("How many clouds?", "three"),
            ConversationEntry::new("Is it day?", "yes"),
        ]
    }

    #[test]
    fn test_empty_history_exports_empty_string() {
        assert_eq!(export_history(&[]), "");
    }

    #[test]
    fn test_single_entry_has_no_separator() {
        let text = export_history(&entries()[..1]);
        assert_eq!(text, "Q: What color is the sky?\nA: blue");
    }

    #[test]
    fn test_blocks_are_chronological_and_blank_line_separated() {
        let text = export_history(&entries());
        assert_eq!(
            text,
            "Q: What color is the sky?\nA: blue\n\n\
             Q: How many clouds?\nA: three\n\n\
             Q: Is it day?\nA: yes"
        );
        let blocks: Vec<_> = text.split("\n\n").collect();
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.starts_with("Q: ") && b.contains("\nA: ")));
    }

    #[test]
    fn test_text_writer() {
        let mut buf = Vec::new();
        let count =
            write_history_text(&entries(), &mut buf, &PathBuf::from("out.txt")).unwrap();
        assert_eq!(count, 3);
        assert_eq!(String::from_utf8(buf).unwrap(), export_history(&entries()));
    }

    #[test]
    fn test_json_writer() {
        let mut buf = Vec::new();
        let count =
            write_history_json(&entries(), &mut buf, &PathBuf::from("out.json")).unwrap();
        assert_eq!(count, 3);
        let parsed: Vec<ConversationEntry> = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed, entries());
    }

    #[test]
    fn test_wants_json() {
        assert!(wants_json(Path::new("history.JSON")));
        assert!(!wants_json(Path::new("conversation_history.txt")));
        assert!(!wants_json(Path::new("history")));
    }
}
