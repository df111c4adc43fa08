use crate::error::ParseError;
use crate::sources::common::{
    normalize_nbsp, normalize_whitespace, strip_marker, TITLE_MARKER, TOPIC_MARKER, URL_MARKER,
};
use crate::sources::ilcs::topics::classify_topic;
use crate::types::{Act, Chapter, Section, SectionHeader, SectionSource, SubtopicRef};
use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static CHAPTER_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{1,3})\b").unwrap());
static CITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\(\s*(\d+\s+ILCS\s+[^)]+?)\s*\)\s*(.*)$").unwrap());
static FROM_CH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\(\s*from\s+Ch\.[^)]*\)\s*(.*)$").unwrap());
static SEC_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^Sec\.\s*([0-9A-Za-z.\-]+?)\.(?:\s+(.*))?$").unwrap()
});
static CAPTION_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\s+").unwrap());
static SOURCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\(\s*Source:\s*(.*?)\)\s*$").unwrap());
static PUBLIC_ACT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{2,3}-\d{1,4})\b").unwrap());

fn collapse_spaces(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").to_string()
}

/// Parses one chapter record made of `title:`, `topic:` and `url:` lines.
///
/// The chapter number is the first 1-3 digit numeral on the title line and
/// the title is whatever follows it, so `title: CHAPTER 5 Criminal Code`
/// yields `("5", "Criminal Code")`. Lines without a marker are ignored.
pub fn parse_chapter(record: &str) -> Result<Chapter, ParseError> {
    let record = normalize_whitespace(record);
    let mut heading: Option<(String, String)> = None;
    let mut topic = None;
    let mut url = None;

    for line in record.split('\n') {
        if let Some(value) = strip_marker(line, TITLE_MARKER) {
            if heading.is_none() {
                heading = Some(parse_chapter_heading(value)?);
            }
        } else if let Some(value) = strip_marker(line, TOPIC_MARKER) {
            topic = classify_topic(value);
        } else if let Some(value) = strip_marker(line, URL_MARKER) {
            if !value.is_empty() {
                url = Some(value.to_string());
            }
        }
    }

    let (number, title) = heading.ok_or(ParseError::MissingTitle)?;
    Ok(Chapter {
        number,
        title,
        topic,
        url,
        acts: Vec::new(),
    })
}

fn parse_chapter_heading(value: &str) -> Result<(String, String), ParseError> {
    let number = CHAPTER_NUMBER_RE
        .captures(value)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| ParseError::MissingNumber(value.to_string()))?;
    let title = collapse_spaces(&value[number.end()..]);
    if title.is_empty() {
        return Err(ParseError::MissingTitle);
    }
    Ok((number.as_str().to_string(), title))
}

/// Parses one act record. `title: 5 ILCS 100/ Illinois Administrative
/// Procedure Act.` splits into the `5 ILCS 100/` prefix and the act title.
pub fn parse_act(record: &str) -> Result<Act, ParseError> {
    let record = normalize_whitespace(record);
    let mut heading: Option<(String, String)> = None;
    let mut url = None;
    let mut subtopic = None;

    for line in record.split('\n') {
        if let Some(value) = strip_marker(line, TITLE_MARKER) {
            if heading.is_none() {
                heading = split_act_heading(value);
            }
        } else if let Some(value) = strip_marker(line, URL_MARKER) {
            if !value.is_empty() {
                url = Some(value.to_string());
            }
        } else if let Some(value) = strip_marker(line, TOPIC_MARKER) {
            subtopic = parse_act_subtopic(value).map(|name| SubtopicRef { name });
        }
    }

    let (prefix, title) = heading.ok_or(ParseError::MissingTitle)?;
    Ok(Act {
        prefix,
        title,
        url,
        subtopic,
        sections: Vec::new(),
    })
}

fn split_act_heading(value: &str) -> Option<(String, String)> {
    let value = collapse_spaces(value);
    if value.is_empty() {
        return None;
    }
    let split_at = match value.find('/') {
        Some(slash) => slash + 1,
        None => value.find(' ').unwrap_or(value.len()),
    };
    let (prefix, title) = value.split_at(split_at);
    Some((prefix.trim().to_string(), title.trim().to_string()))
}

fn parse_act_subtopic(value: &str) -> Option<String> {
    let name = collapse_spaces(value);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Parses one section record: header line first, source line last, body in
/// between. Blank lines are dropped and non-breaking spaces normalized.
///
/// A `Sec. <n>. <caption>` line directly after a bare citation line belongs
/// to the header. Text following the caption sentence on that line opens the
/// body.
pub fn parse_section(record: &str) -> Result<Section, ParseError> {
    let lines = record
        .split('\n')
        .map(|line| normalize_nbsp(line).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();

    let Some((first, rest)) = lines.split_first() else {
        return Err(ParseError::EmptySection);
    };
    let (header_line, rest) = match rest.split_first() {
        Some((next, tail)) if !has_sec_heading(first) && has_sec_heading(next) => {
            (format!("{first} {next}"), tail)
        }
        _ => (first.clone(), rest),
    };
    let (header, lead) = split_section_header(&header_line);

    let (source, body) = match rest.split_last() {
        Some((last, body)) => (Some(parse_section_source(last)), body),
        None => (None, rest),
    };
    let text = lead
        .into_iter()
        .chain(body.iter().cloned())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Section {
        header,
        text,
        source,
    })
}

/// Parses a header line: an optional `(<n> ILCS <act>/<sec>)` citation, an
/// optional `(from Ch. ...)` note, then `Sec. <n>. <caption>`.
pub fn parse_section_header(line: &str) -> SectionHeader {
    split_section_header(line).0
}

fn has_sec_heading(line: &str) -> bool {
    SEC_HEADING_RE.is_match(&strip_citation(&collapse_spaces(line)).1)
}

fn strip_citation(line: &str) -> (Option<String>, String) {
    let mut rest = line.to_string();
    let mut citation = None;
    if let Some(caps) = CITATION_RE.captures(&rest) {
        citation = Some(collapse_spaces(&caps[1]));
        rest = caps[2].to_string();
    }
    if let Some(caps) = FROM_CH_RE.captures(&rest) {
        rest = caps[1].to_string();
    }
    (citation, rest)
}

/// Header plus any text that trails the caption's first sentence.
fn split_section_header(line: &str) -> (SectionHeader, Option<String>) {
    let (citation, rest) = strip_citation(&collapse_spaces(line));

    if let Some(caps) = SEC_HEADING_RE.captures(&rest) {
        let (caption, lead) = split_caption(caps.get(2).map_or("", |m| m.as_str()));
        let header = SectionHeader {
            citation,
            number: Some(caps[1].to_string()),
            caption,
        };
        return (header, lead);
    }

    let number = citation
        .as_deref()
        .and_then(|cite| cite.rsplit_once('/'))
        .map(|(_, section)| section.trim().to_string())
        .filter(|section| !section.is_empty());

    let header = SectionHeader {
        citation,
        number,
        caption: rest.trim().to_string(),
    };
    (header, None)
}

fn split_caption(value: &str) -> (String, Option<String>) {
    let value = value.trim();
    match CAPTION_END_RE.find(value) {
        Some(end) => {
            let lead = value[end.end()..].trim();
            (
                value[..end.start() + 1].to_string(),
                (!lead.is_empty()).then(|| lead.to_string()),
            )
        }
        None => (value.to_string(), None),
    }
}

pub fn parse_section_source(line: &str) -> SectionSource {
    let raw = line.trim().to_string();
    let public_acts = SOURCE_RE
        .captures(&raw)
        .map(|caps| {
            PUBLIC_ACT_RE
                .captures_iter(&caps[1])
                .map(|pa| format!("P.A. {}", &pa[1]))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    SectionSource { raw, public_acts }
}
