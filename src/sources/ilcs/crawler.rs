use crate::error::CrawlError;
use crate::runtime::page::{ListStyle, PageDriver};
use crate::runtime::types::CrawlState;
use crate::sources::configs::CrawlConfig;
use crate::sources::ilcs::assembler::{assemble_acts, assemble_chapters, assemble_sections, Assembled};
use crate::types::{Act, Chapter, Section};
use std::sync::Arc;
use std::time::Duration;

/// Opens `url`, extracts its list text and closes the page again, whether or
/// not extraction worked.
pub async fn extract_page_text(
    driver: &dyn PageDriver,
    url: &str,
    selector: &str,
    style: ListStyle,
    delay: Duration,
) -> Result<String, CrawlError> {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let page = driver
        .open_page(url)
        .await
        .map_err(|reason| CrawlError::Navigation {
            url: url.to_string(),
            reason,
        })?;
    let text = driver.fetch_list_text(&page, selector, style).await;
    driver.close_page(page).await;

    text.map_err(|reason| CrawlError::Extraction {
        url: url.to_string(),
        reason,
    })
}

/// Fetches and assembles the act index behind a chapter url.
pub async fn fetch_acts(
    driver: &dyn PageDriver,
    config: &CrawlConfig,
    url: &str,
) -> Result<Assembled<Act>, CrawlError> {
    let delay = Duration::from_millis(config.request_delay_ms);
    let text = extract_page_text(driver, url, &config.act_selector, ListStyle::Index, delay).await?;
    let assembled = assemble_acts(&text);
    if assembled.records.is_empty() {
        return Err(CrawlError::NoRecords {
            url: url.to_string(),
        });
    }
    Ok(assembled)
}

/// Fetches and assembles the sections of one act's full-text page.
pub async fn fetch_sections(
    driver: &dyn PageDriver,
    config: &CrawlConfig,
    url: &str,
) -> Result<Assembled<Section>, CrawlError> {
    let delay = Duration::from_millis(config.request_delay_ms);
    let text = extract_page_text(
        driver,
        url,
        &config.section_selector,
        ListStyle::Sections,
        delay,
    )
    .await?;
    let assembled = assemble_sections(&text);
    if assembled.records.is_empty() {
        return Err(CrawlError::NoRecords {
            url: url.to_string(),
        });
    }
    Ok(assembled)
}

/// Owns the page session and the chapter sequence read from the base index.
pub struct CrawlerHandle {
    driver: Arc<dyn PageDriver>,
    config: CrawlConfig,
    chapters: Vec<Chapter>,
    state: CrawlState,
    discarded_chapters: usize,
    discarded_acts: usize,
    discarded_sections: usize,
}

/// Starts a session and loads the chapter index. Any failure here is fatal
/// and the session is shut down before returning.
pub async fn init_crawl(
    driver: Arc<dyn PageDriver>,
    config: CrawlConfig,
) -> Result<CrawlerHandle, CrawlError> {
    let mut crawler = CrawlerHandle::new(driver, config);
    crawler.load_index().await?;
    Ok(crawler)
}

impl CrawlerHandle {
    /// A session with nothing loaded yet.
    pub fn new(driver: Arc<dyn PageDriver>, config: CrawlConfig) -> Self {
        Self {
            driver,
            config,
            chapters: Vec::new(),
            state: CrawlState::Idle,
            discarded_chapters: 0,
            discarded_acts: 0,
            discarded_sections: 0,
        }
    }

    /// Loads the base index page and replaces the chapter sequence with what
    /// it yields. An unreadable or empty index shuts the session down.
    pub async fn load_index(&mut self) -> Result<&[Chapter], CrawlError> {
        let base_url = self.config.base_url.clone();
        tracing::info!("[Crawler] Loading chapter index from {}", base_url);

        let text = match extract_page_text(
            self.driver.as_ref(),
            &base_url,
            &self.config.index_selector,
            ListStyle::Index,
            Duration::ZERO,
        )
        .await
        {
            Ok(text) => text,
            Err(err) => {
                self.close().await;
                return Err(CrawlError::IndexLoad {
                    url: base_url,
                    reason: err.to_string(),
                });
            }
        };

        let assembled = assemble_chapters(&text);
        if assembled.records.is_empty() {
            self.close().await;
            return Err(CrawlError::IndexLoad {
                url: base_url,
                reason: "no chapters found in index".to_string(),
            });
        }

        tracing::info!(
            "[Crawler] Found {} chapters ({} discarded)",
            assembled.records.len(),
            assembled.discarded_count()
        );
        self.discarded_chapters = assembled.discarded_count();
        self.chapters = assembled.records;
        self.state = CrawlState::IndexLoaded;
        Ok(&self.chapters)
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn driver(&self) -> Arc<dyn PageDriver> {
        self.driver.clone()
    }

    pub fn discarded(&self) -> (usize, usize, usize) {
        (
            self.discarded_chapters,
            self.discarded_acts,
            self.discarded_sections,
        )
    }

    /// Keeps only the first `limit` chapters.
    pub fn truncate(&mut self, limit: usize) {
        self.chapters.truncate(limit);
    }

    /// Loads the acts of the chapter at `index` and replaces whatever acts it
    /// had before. On failure the chapter is left untouched.
    pub async fn load_acts_for_chapter(&mut self, index: usize) -> Result<&[Act], CrawlError> {
        let url = self.chapter_url(index)?;
        let assembled = fetch_acts(self.driver.as_ref(), &self.config, &url).await?;
        self.attach_acts(index, assembled)
    }

    /// Stores an already fetched act sequence on the chapter at `index`.
    pub fn attach_acts(
        &mut self,
        index: usize,
        assembled: Assembled<Act>,
    ) -> Result<&[Act], CrawlError> {
        let chapter = self
            .chapters
            .get_mut(index)
            .ok_or(CrawlError::OutOfRange { kind: "chapter", index })?;
        tracing::debug!(
            "[Crawler] Chapter {}: {} acts",
            chapter.number,
            assembled.records.len()
        );
        self.discarded_acts += assembled.discarded_count();
        self.state = CrawlState::ChapterPopulated;
        chapter.acts = assembled.records;
        Ok(&chapter.acts)
    }

    /// Loads the sections of one act, replacing any it already had.
    pub async fn load_sections_for_act(
        &mut self,
        chapter_index: usize,
        act_index: usize,
    ) -> Result<&[Section], CrawlError> {
        let act = self.act_mut(chapter_index, act_index)?;
        let url = act
            .url
            .clone()
            .ok_or_else(|| CrawlError::MissingUrl(format!("act {}", act.prefix)))?;
        let assembled = fetch_sections(self.driver.as_ref(), &self.config, &url).await?;
        self.discarded_sections += assembled.discarded_count();
        let act = self.act_mut(chapter_index, act_index)?;
        act.sections = assembled.records;
        Ok(&act.sections)
    }

    fn chapter_url(&self, index: usize) -> Result<String, CrawlError> {
        let chapter = self
            .chapters
            .get(index)
            .ok_or(CrawlError::OutOfRange { kind: "chapter", index })?;
        chapter
            .url
            .clone()
            .ok_or_else(|| CrawlError::MissingUrl(format!("chapter {}", chapter.number)))
    }

    fn act_mut(&mut self, chapter_index: usize, act_index: usize) -> Result<&mut Act, CrawlError> {
        self.chapters
            .get_mut(chapter_index)
            .ok_or(CrawlError::OutOfRange {
                kind: "chapter",
                index: chapter_index,
            })?
            .acts
            .get_mut(act_index)
            .ok_or(CrawlError::OutOfRange {
                kind: "act",
                index: act_index,
            })
    }

    /// Shuts the session down. Safe to call more than once and after a
    /// partial crawl.
    pub async fn close(&mut self) {
        if self.state == CrawlState::Done {
            return;
        }
        tracing::info!(
            "[Crawler] Closing session (state: {})",
            self.state.as_str()
        );
        self.driver.shutdown().await;
        self.state = CrawlState::Done;
    }

    /// Closes the session and hands back the chapters.
    pub async fn finish(mut self) -> Vec<Chapter> {
        self.close().await;
        self.chapters
    }
}
