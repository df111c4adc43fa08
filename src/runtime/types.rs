use crate::error::StoreError;
use crate::types::{Act, Chapter};
use async_trait::async_trait;

pub type RecordId = String;

/// Persistence seam. Implementations own ids, lookups and links; the crawl
/// core only hands over finished records.
#[async_trait]
pub trait StatuteStore: Send + Sync {
    async fn save_chapter(&self, chapter: &Chapter) -> Result<RecordId, StoreError>;

    async fn save_act(&self, act: &Act, chapter_id: &RecordId) -> Result<RecordId, StoreError>;

    async fn find_subtopic(&self, name: &str) -> Result<Option<RecordId>, StoreError>;

    async fn link_act_to_subtopic(
        &self,
        act_id: &RecordId,
        subtopic_id: &RecordId,
    ) -> Result<(), StoreError>;
}

/// Where the crawl is in its traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Idle,
    IndexLoaded,
    ChapterPopulated,
    Done,
}

impl CrawlState {
    pub fn as_str(&self) -> &str {
        match self {
            CrawlState::Idle => "idle",
            CrawlState::IndexLoaded => "index_loaded",
            CrawlState::ChapterPopulated => "chapter_populated",
            CrawlState::Done => "done",
        }
    }
}
