mod common;

use common::{load_fixture, MockFetcher};
use ilcs_ingest::runtime::orchestrator::{run_crawl, CrawlOptions};
use ilcs_ingest::runtime::page::{HttpPageDriver, ListStyle, PageDriver};
use ilcs_ingest::sources::configs::{CrawlConfig, DEFAULT_BASE_URL};
use ilcs_ingest::sources::ilcs::assembler::{assemble_acts, assemble_chapters};
use ilcs_ingest::sources::ilcs::crawler::init_crawl;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const CHAPTER_5_URL: &str = "https://www.ilga.gov/legislation/ilcs/ilcs2.asp?ChapterID=2";
const ACT_5_70_URL: &str = "https://www.ilga.gov/legislation/ilcs/ilcs3.asp?ActID=1&ChapterID=2";

fn fixture_fetcher() -> MockFetcher {
    let mut fetcher = MockFetcher::new();
    fetcher.add_fixture(DEFAULT_BASE_URL, &load_fixture("ilcs/chapter_index.html"));
    fetcher.add_fixture(CHAPTER_5_URL, &load_fixture("ilcs/chapter_5_acts.html"));
    fetcher.add_fixture(ACT_5_70_URL, &load_fixture("ilcs/act_5_70.html"));
    fetcher
}

fn fixture_config() -> CrawlConfig {
    CrawlConfig {
        request_delay_ms: 0,
        ..CrawlConfig::default()
    }
}

#[tokio::test]
async fn renders_chapter_index_into_marker_records() {
    let driver = HttpPageDriver::new(Arc::new(fixture_fetcher()));
    let page = driver.open_page(DEFAULT_BASE_URL).await.expect("open");
    let text = driver
        .fetch_list_text(&page, "li", ListStyle::Index)
        .await
        .expect("extract");
    driver.close_page(page).await;
    assert_eq!(driver.open_pages(), 0);

    let chapters = assemble_chapters(&text).records;
    assert_eq!(chapters.len(), 4);

    assert_eq!(chapters[0].number, "5");
    assert_eq!(chapters[0].title, "GENERAL PROVISIONS");
    assert_eq!(chapters[0].topic.map(|t| t.series), Some("00"));
    assert_eq!(chapters[0].url.as_deref(), Some(CHAPTER_5_URL));

    assert_eq!(chapters[2].number, "105");
    assert_eq!(chapters[2].topic.map(|t| t.name), Some("EDUCATION"));
    assert_eq!(chapters[3].number, "720");
    assert_eq!(chapters[3].topic.map(|t| t.series), Some("700"));
}

#[tokio::test]
async fn renders_act_index_with_subtopics() {
    let driver = HttpPageDriver::new(Arc::new(fixture_fetcher()));
    let page = driver.open_page(CHAPTER_5_URL).await.expect("open");
    let text = driver
        .fetch_list_text(&page, "li", ListStyle::Index)
        .await
        .expect("extract");
    driver.close_page(page).await;

    let acts = assemble_acts(&text).records;
    assert_eq!(acts.len(), 3);
    assert_eq!(acts[0].prefix, "5 ILCS 70/");
    assert_eq!(acts[0].title, "Statute on Statutes.");
    assert_eq!(acts[0].url.as_deref(), Some(ACT_5_70_URL));
    assert_eq!(
        acts[1].subtopic.as_ref().map(|s| s.name.as_str()),
        Some("GENERAL PROVISIONS")
    );
    assert_eq!(
        acts[2].subtopic.as_ref().map(|s| s.name.as_str()),
        Some("ADMINISTRATIVE RULES")
    );
}

#[tokio::test]
async fn crawls_fixture_site_down_to_sections() {
    let driver = Arc::new(HttpPageDriver::new(Arc::new(fixture_fetcher())));
    let mut crawler = init_crawl(driver.clone(), fixture_config())
        .await
        .expect("index should load");

    crawler.load_acts_for_chapter(0).await.expect("acts should load");
    let sections = crawler
        .load_sections_for_act(0, 0)
        .await
        .expect("sections should load");

    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].header.citation.as_deref(), Some("5 ILCS 70/0.01"));
    assert_eq!(sections[0].header.number.as_deref(), Some("0.01"));
    assert_eq!(sections[0].header.caption, "Short title.");
    assert_eq!(
        sections[0].text,
        "This Act may be cited as the Statute on Statutes."
    );
    assert_eq!(sections[1].header.number.as_deref(), Some("1"));
    assert_eq!(sections[1].header.caption, "Construction.");
    assert_eq!(
        sections[1].text,
        "All general provisions shall be construed."
    );
    assert_eq!(
        sections[1].source.as_ref().map(|s| s.public_acts.clone()),
        Some(vec!["P.A. 85-1209".to_string(), "P.A. 92-16".to_string()])
    );

    crawler.close().await;
    assert!(driver.is_shut_down());
    assert_eq!(driver.open_pages(), 0);
}

#[tokio::test]
async fn missing_chapter_pages_become_failures() {
    let driver = Arc::new(HttpPageDriver::new(Arc::new(fixture_fetcher())));
    let report = run_crawl(
        driver,
        fixture_config(),
        CrawlOptions {
            load_acts: true,
            ..CrawlOptions::default()
        },
        CancellationToken::new(),
    )
    .await
    .expect("crawl should complete");

    assert_eq!(report.chapters.len(), 4);
    assert_eq!(report.chapters[0].acts.len(), 3);
    let failed = report
        .failures
        .iter()
        .map(|f| f.chapter_number.as_str())
        .collect::<Vec<_>>();
    assert_eq!(failed, vec!["10", "105", "720"]);
}
