use crate::error::{ChapterFailure, CrawlError, StoreError, UnresolvedReference};
use crate::runtime::page::PageDriver;
use crate::runtime::types::StatuteStore;
use crate::sources::configs::CrawlConfig;
use crate::sources::ilcs::crawler::{fetch_acts, init_crawl, CrawlerHandle};
use crate::types::Chapter;
use chrono::{DateTime, Utc};
use futures::future;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlOptions {
    pub load_acts: bool,
    pub load_sections: bool,
    pub chapter_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscardCounts {
    pub chapters: usize,
    pub acts: usize,
    pub sections: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cancelled: bool,
    pub chapters: Vec<Chapter>,
    pub failures: Vec<ChapterFailure>,
    pub discarded: DiscardCounts,
}

/// Runs a full crawl pass: chapter index, then acts per chapter, then
/// sections per act, as `options` asks. Only an index failure is returned as
/// an error; everything below that ends up in `CrawlReport::failures`.
/// The session is always shut down before this returns.
pub async fn run_crawl(
    driver: Arc<dyn PageDriver>,
    config: CrawlConfig,
    options: CrawlOptions,
    cancel: CancellationToken,
) -> Result<CrawlReport, CrawlError> {
    let started_at = Utc::now();
    if cancel.is_cancelled() {
        driver.shutdown().await;
        return Err(CrawlError::Cancelled);
    }

    let mut crawler = init_crawl(driver, config).await?;
    if let Some(limit) = options.chapter_limit {
        crawler.truncate(limit);
    }

    let mut failures = Vec::new();
    let mut cancelled = false;
    if options.load_acts {
        cancelled = populate_acts(&mut crawler, &cancel, &mut failures).await;
    }
    if options.load_sections && !cancelled {
        cancelled = populate_sections(&mut crawler, &cancel, &mut failures).await;
    }

    let (chapters, acts, sections) = crawler.discarded();
    let chapters_out = crawler.finish().await;

    tracing::info!(
        "[Orchestrator] Crawl {}: {} chapters, {} failures",
        if cancelled { "cancelled" } else { "complete" },
        chapters_out.len(),
        failures.len()
    );

    Ok(CrawlReport {
        started_at,
        finished_at: Utc::now(),
        cancelled,
        chapters: chapters_out,
        failures,
        discarded: DiscardCounts {
            chapters,
            acts,
            sections,
        },
    })
}

/// Loads acts for every chapter, at most `max_concurrency` at a time.
/// Results are attached in chapter order. Once `cancel` fires no further
/// chapter is started, but fetches already in flight run to completion so
/// their pages get closed. Returns whether it stopped early.
async fn populate_acts(
    crawler: &mut CrawlerHandle,
    cancel: &CancellationToken,
    failures: &mut Vec<ChapterFailure>,
) -> bool {
    if cancel.is_cancelled() {
        return true;
    }

    let driver = crawler.driver();
    let config = crawler.config().clone();
    let targets = crawler
        .chapters()
        .iter()
        .enumerate()
        .map(|(index, chapter)| (index, chapter.number.clone(), chapter.url.clone()))
        .collect::<Vec<_>>();
    let total = targets.len();

    let mut results = stream::iter(targets)
        .take_while(|_| future::ready(!cancel.is_cancelled()))
        .map(|(index, number, url)| {
            let driver = driver.clone();
            let config = &config;
            async move {
                let result = match url.as_deref() {
                    Some(url) => fetch_acts(driver.as_ref(), config, url).await,
                    None => Err(CrawlError::MissingUrl(format!("chapter {number}"))),
                };
                (index, number, url, result)
            }
        })
        .buffered(config.concurrency());

    let mut done = 0;
    while let Some((index, number, url, result)) = results.next().await {
        done += 1;
        let result = result.and_then(|assembled| {
            crawler.attach_acts(index, assembled)?;
            Ok(())
        });
        if let Err(err) = result {
            tracing::warn!("[Orchestrator] Chapter {} skipped: {}", number, err);
            failures.push(ChapterFailure::new(&number, url.as_deref(), &err));
        }
    }

    if done < total {
        tracing::warn!(
            "[Orchestrator] Cancelled after {} of {} chapters",
            done,
            total
        );
        return true;
    }
    false
}

/// Loads sections for every act of every chapter, one act at a time.
async fn populate_sections(
    crawler: &mut CrawlerHandle,
    cancel: &CancellationToken,
    failures: &mut Vec<ChapterFailure>,
) -> bool {
    for chapter_index in 0..crawler.chapters().len() {
        for act_index in 0..crawler.chapters()[chapter_index].acts.len() {
            if cancel.is_cancelled() {
                tracing::warn!("[Orchestrator] Cancelled while loading sections");
                return true;
            }
            let result = crawler
                .load_sections_for_act(chapter_index, act_index)
                .await
                .map(|sections| sections.len());
            if let Err(err) = result {
                let chapter = &crawler.chapters()[chapter_index];
                let act = &chapter.acts[act_index];
                tracing::warn!(
                    "[Orchestrator] Sections for {} skipped: {}",
                    act.prefix,
                    err
                );
                failures.push(ChapterFailure::for_act(
                    &chapter.number,
                    &act.prefix,
                    act.url.as_deref(),
                    &err,
                ));
            }
        }
    }
    false
}

/// Saves a chapter and its acts, linking each act to its subtopic by name.
/// Unknown subtopics are returned as warnings; the act is saved unlinked.
pub async fn persist_chapter(
    store: &dyn StatuteStore,
    chapter: &Chapter,
) -> Result<Vec<UnresolvedReference>, StoreError> {
    let chapter_id = store.save_chapter(chapter).await?;
    let mut unresolved = Vec::new();

    for act in &chapter.acts {
        let act_id = store.save_act(act, &chapter_id).await?;
        let Some(subtopic) = &act.subtopic else {
            continue;
        };
        match store.find_subtopic(&subtopic.name).await? {
            Some(subtopic_id) => store.link_act_to_subtopic(&act_id, &subtopic_id).await?,
            None => {
                tracing::warn!("[Orchestrator] Subtopic {} not found", subtopic.name);
                unresolved.push(UnresolvedReference {
                    chapter_number: chapter.number.clone(),
                    act_prefix: act.prefix.clone(),
                    subtopic: subtopic.name.clone(),
                });
            }
        }
    }

    Ok(unresolved)
}

pub async fn persist_chapters(
    store: &dyn StatuteStore,
    chapters: &[Chapter],
) -> Result<Vec<UnresolvedReference>, StoreError> {
    let mut unresolved = Vec::new();
    for chapter in chapters {
        unresolved.extend(persist_chapter(store, chapter).await?);
    }
    Ok(unresolved)
}
