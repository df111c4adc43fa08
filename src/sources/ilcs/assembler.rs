use crate::error::ParseError;
use crate::sources::common::{RECORD_DELIMITER, SECTION_DELIMITER};
use crate::sources::ilcs::parser::{parse_act, parse_chapter, parse_section};
use crate::types::{Act, Chapter, RecordKind, Section};

/// Records assembled from one raw blob, in blob order, plus what was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled<T> {
    pub records: Vec<T>,
    /// Non-blank candidates found between delimiters.
    pub candidates: usize,
    /// Candidates that failed to parse, with the reason.
    pub discarded: Vec<ParseError>,
}

impl<T> Assembled<T> {
    pub fn discarded_count(&self) -> usize {
        self.discarded.len()
    }
}

fn delimiter_for(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Chapter | RecordKind::Act => RECORD_DELIMITER,
        RecordKind::Section => SECTION_DELIMITER,
    }
}

/// Splits `blob` into candidate records for `kind` and parses each one.
/// Blank candidates are skipped silently; parse failures are kept in
/// `discarded` and logged.
pub fn assemble_records<T, F>(blob: &str, kind: RecordKind, parse_one: F) -> Assembled<T>
where
    F: Fn(&str) -> Result<T, ParseError>,
{
    let mut assembled = Assembled {
        records: Vec::new(),
        candidates: 0,
        discarded: Vec::new(),
    };

    for candidate in blob.split(delimiter_for(kind)) {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            continue;
        }
        assembled.candidates += 1;
        match parse_one(candidate) {
            Ok(record) => assembled.records.push(record),
            Err(err) => {
                tracing::debug!(
                    "[Assembler] Discarded {} candidate #{}: {}",
                    kind.as_str(),
                    assembled.candidates,
                    err
                );
                assembled.discarded.push(err);
            }
        }
    }

    if !assembled.discarded.is_empty() {
        tracing::info!(
            "[Assembler] {} of {} {} candidates discarded",
            assembled.discarded.len(),
            assembled.candidates,
            kind.as_str()
        );
    }

    assembled
}

pub fn assemble_chapters(blob: &str) -> Assembled<Chapter> {
    assemble_records(blob, RecordKind::Chapter, parse_chapter)
}

pub fn assemble_acts(blob: &str) -> Assembled<Act> {
    assemble_records(blob, RecordKind::Act, parse_act)
}

pub fn assemble_sections(blob: &str) -> Assembled<Section> {
    assemble_records(blob, RecordKind::Section, parse_section)
}
