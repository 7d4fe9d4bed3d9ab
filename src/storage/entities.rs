use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// Characters of a writing shown in the list before it gets cut off.
pub const PREVIEW_LENGTH: usize = 30;

/// A writing as shown in the read-only view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Writing {
    /// Number the writing is stored under. Missing when the commit failed and the text only
    /// exists in memory.
    pub id: Option<u64>,
    pub path: Option<PathBuf>,
    pub content: String,
}

impl Writing {
    pub fn unsaved(content: String) -> Self {
        Self {
            id: None,
            path: None,
            content,
        }
    }
}

/// An entry of the writings list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritingSummary {
    pub id: u64,
    pub path: PathBuf,
    pub preview: String,
    pub modified: Option<DateTime<Local>>,
}

impl WritingSummary {
    pub fn new(id: u64, path: PathBuf, content: &str, modified: Option<DateTime<Local>>) -> Self {
        let single_line = content.split_whitespace().collect::<Vec<_>>().join(" ");
        Self {
            id,
            path,
            preview: trim_text(&single_line, PREVIEW_LENGTH),
            modified,
        }
    }
}

/// Standard name of the file holding writing `id`.
pub fn writing_file_name(id: u64) -> String {
    format!("{id}.txt")
}

/// Extracts the writing number from a file name. Anything before the last extension has to be
/// an integer, so `12.txt` and `12.md` are both writing 12 while `notes.txt` is ignored.
pub fn parse_writing_id(path: &Path) -> Option<u64> {
    path.file_stem()?.to_str()?.parse().ok()
}

/// Cuts `text` down to `length` characters and marks the cut with `...`.
pub fn trim_text(text: &str, length: usize) -> String {
    match text.char_indices().nth(length) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{parse_writing_id, trim_text, writing_file_name, WritingSummary};

    #[test]
    fn test_trim_text() {
        assert_eq!(trim_text("short", 30), "short");
        assert_eq!(trim_text("exactly five", 12), "exactly five");
        assert_eq!(trim_text("a bit longer than that", 8), "a bit lo...");
        // Multi byte characters are counted once.
        assert_eq!(trim_text("ééééé", 3), "ééé...");
        assert_eq!(trim_text("", 3), "");
    }

    #[test]
    fn test_parse_writing_id() {
        assert_eq!(parse_writing_id(Path::new("1.txt")), Some(1));
        assert_eq!(parse_writing_id(Path::new("dir/42.txt")), Some(42));
        assert_eq!(parse_writing_id(Path::new("7.md")), Some(7));
        assert_eq!(parse_writing_id(Path::new("9")), Some(9));
        assert_eq!(parse_writing_id(Path::new("notes.txt")), None);
        assert_eq!(parse_writing_id(Path::new("1.2.txt")), None);
        assert_eq!(parse_writing_id(Path::new("-3.txt")), None);
    }

    #[test]
    fn test_file_name_round_trips_through_parser() {
        let name = writing_file_name(15);
        assert_eq!(name, "15.txt");
        assert_eq!(parse_writing_id(Path::new(&name)), Some(15));
    }

    #[test]
    fn test_summary_preview_is_single_line() {
        let summary = WritingSummary::new(
            3,
            "3.txt".into(),
            "first line\nsecond   line\nand a third one that is long",
            None,
        );
        assert_eq!(summary.preview, "first line second line and a t...");
    }
}
