use serde::Serialize;
use thiserror::Error;

/// Why a single candidate record was not turned into an entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("record has no title marker")]
    MissingTitle,
    #[error("title line has no chapter number: {0:?}")]
    MissingNumber(String),
    #[error("section record has no non-empty lines")]
    EmptySection,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrawlError {
    #[error("failed to load index page {url}: {reason}")]
    IndexLoad { url: String, reason: String },
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("extraction on {url} failed: {reason}")]
    Extraction { url: String, reason: String },
    #[error("no records matched on {url}")]
    NoRecords { url: String },
    #[error("{0} has no url")]
    MissingUrl(String),
    #[error("no {kind} at index {index}")]
    OutOfRange { kind: &'static str, index: usize },
    #[error("crawl cancelled")]
    Cancelled,
}

/// A chapter (or one of its acts, when `act_prefix` is set) that could not be
/// populated. Never aborts the crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterFailure {
    pub chapter_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act_prefix: Option<String>,
    pub url: Option<String>,
    pub error: String,
}

impl ChapterFailure {
    pub fn new(chapter_number: &str, url: Option<&str>, error: &CrawlError) -> Self {
        Self {
            chapter_number: chapter_number.to_string(),
            act_prefix: None,
            url: url.map(ToString::to_string),
            error: error.to_string(),
        }
    }

    pub fn for_act(
        chapter_number: &str,
        act_prefix: &str,
        url: Option<&str>,
        error: &CrawlError,
    ) -> Self {
        Self {
            act_prefix: Some(act_prefix.to_string()),
            ..Self::new(chapter_number, url, error)
        }
    }
}

/// An act named a subtopic the store does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReference {
    pub chapter_number: String,
    pub act_prefix: String,
    pub subtopic: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("store error: {0}")]
pub struct StoreError(pub String);
