use regex::Regex;
use std::sync::LazyLock;

pub const TITLE_MARKER: &str = "title:";
pub const TOPIC_MARKER: &str = "topic:";
pub const URL_MARKER: &str = "url:";

/// Blank line between chapter/act records.
pub const RECORD_DELIMITER: &str = "\n\n";
/// Line separating sections; section bodies may contain blank lines.
pub const SECTION_DELIMITER: &str = "<<SECTION>>";

static NBSP_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\u{00A0}+").unwrap());
static NEWLINE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());

/// Collapses each run of non-breaking spaces into one space and each run of
/// newlines into one newline. Nothing else is touched.
pub fn normalize_whitespace(text: &str) -> String {
    let spaced = NBSP_RUN_RE.replace_all(text, " ");
    NEWLINE_RUN_RE.replace_all(&spaced, "\n").into_owned()
}

/// Only the non-breaking space half of [`normalize_whitespace`], for single lines.
pub fn normalize_nbsp(line: &str) -> String {
    NBSP_RUN_RE.replace_all(line, " ").into_owned()
}

/// Returns the trimmed value after `marker` when the line starts with it.
pub fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    line.trim_start().strip_prefix(marker).map(str::trim)
}
