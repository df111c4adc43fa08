use crate::types::Chapter;
use std::fmt::Write;

const UNCLASSIFIED: &str = "UNCLASSIFIED";

/// Renders chapters grouped by contiguous runs of the same topic:
///
/// ```text
/// 00: GOVERNMENT
/// |
/// --- CHAPTER 5 GENERAL PROVISIONS
/// ```
///
/// A chapter without a topic starts an `UNCLASSIFIED` group rather than
/// joining the group before it.
pub fn format_chapter_listing(chapters: &[Chapter]) -> String {
    let mut out = String::new();
    let mut current: Option<Option<&str>> = None;

    for chapter in chapters {
        let topic_name = chapter.topic.map(|topic| topic.name);
        if current != Some(topic_name) {
            if current.is_some() {
                out.push('\n');
            }
            match chapter.topic {
                Some(topic) => {
                    let _ = writeln!(out, "{}: {}", topic.series, topic.name);
                }
                None => {
                    let _ = writeln!(out, "{UNCLASSIFIED}");
                }
            }
            current = Some(topic_name);
        }
        let _ = writeln!(out, "|\n--- CHAPTER {} {}", chapter.number, chapter.title);
    }

    out
}
