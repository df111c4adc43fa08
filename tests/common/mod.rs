#![allow(dead_code)]
use async_trait::async_trait;
use ilcs_ingest::error::StoreError;
use ilcs_ingest::runtime::fetcher::Fetcher;
use ilcs_ingest::runtime::page::{ListStyle, PageDriver, PageHandle};
use ilcs_ingest::runtime::types::{RecordId, StatuteStore};
use ilcs_ingest::types::{Act, Chapter};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn fixtures_dir() -> String {
    format!("{}/tests/fixtures", env!("CARGO_MANIFEST_DIR"))
}

pub fn load_fixture(filename: &str) -> String {
    let path = Path::new(&fixtures_dir()).join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

pub struct MockFetcher {
    pub fixtures: HashMap<String, String>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            fixtures: HashMap::new(),
        }
    }

    pub fn add_fixture(&mut self, url: &str, content: &str) {
        self.fixtures.insert(url.to_string(), content.to_string());
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, String> {
        self.fixtures
            .get(url)
            .cloned()
            .ok_or_else(|| format!("MockFetcher: No fixture for URL: {}", url))
    }
}

/// Serves marker text straight from a url map. Pages hold the text as content.
pub struct MockPageDriver {
    pages: Mutex<HashMap<String, String>>,
    failing_extraction: Mutex<HashSet<String>>,
    extraction_delays: Mutex<HashMap<String, Duration>>,
    pub opened: Mutex<Vec<String>>,
    next_id: AtomicU64,
    open_pages: AtomicUsize,
    max_open_pages: AtomicUsize,
    shut_down: AtomicBool,
    pub shutdown_calls: AtomicUsize,
}

impl MockPageDriver {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            failing_extraction: Mutex::new(HashSet::new()),
            extraction_delays: Mutex::new(HashMap::new()),
            opened: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            open_pages: AtomicUsize::new(0),
            max_open_pages: AtomicUsize::new(0),
            shut_down: AtomicBool::new(false),
            shutdown_calls: AtomicUsize::new(0),
        }
    }

    pub fn add_page(&self, url: &str, text: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), text.to_string());
    }

    pub fn fail_extraction(&self, url: &str) {
        self.failing_extraction
            .lock()
            .unwrap()
            .insert(url.to_string());
    }

    /// Makes extraction on `url` take `millis` while the page is open.
    pub fn slow_extraction(&self, url: &str, millis: u64) {
        self.extraction_delays
            .lock()
            .unwrap()
            .insert(url.to_string(), Duration::from_millis(millis));
    }

    pub fn open_pages(&self) -> usize {
        self.open_pages.load(Ordering::SeqCst)
    }

    pub fn max_open_pages(&self) -> usize {
        self.max_open_pages.load(Ordering::SeqCst)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageDriver for MockPageDriver {
    async fn open_page(&self, url: &str) -> Result<PageHandle, String> {
        if self.is_shut_down() {
            return Err("session closed".to_string());
        }
        self.opened.lock().unwrap().push(url.to_string());
        let content = self
            .pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| format!("navigation timeout: {url}"))?;
        let now_open = self.open_pages.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_open_pages.fetch_max(now_open, Ordering::SeqCst);
        Ok(PageHandle {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            url: url.to_string(),
            content,
        })
    }

    async fn fetch_list_text(
        &self,
        page: &PageHandle,
        _selector: &str,
        _style: ListStyle,
    ) -> Result<String, String> {
        let delay = self.extraction_delays.lock().unwrap().get(&page.url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_extraction.lock().unwrap().contains(&page.url) {
            return Err("selector matched nothing".to_string());
        }
        Ok(page.content.clone())
    }

    async fn close_page(&self, _page: PageHandle) {
        self.open_pages.fetch_sub(1, Ordering::SeqCst);
    }

    async fn shutdown(&self) {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MockStore {
    pub chapters: Mutex<Vec<(RecordId, String)>>,
    pub acts: Mutex<Vec<(RecordId, RecordId, String)>>,
    pub subtopics: Mutex<HashMap<String, RecordId>>,
    pub links: Mutex<Vec<(RecordId, RecordId)>>,
}

impl MockStore {
    pub fn with_subtopics(names: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut subtopics = store.subtopics.lock().unwrap();
            for (i, name) in names.iter().enumerate() {
                subtopics.insert(name.to_string(), format!("subtopic-{i}"));
            }
        }
        store
    }
}

#[async_trait]
impl StatuteStore for MockStore {
    async fn save_chapter(&self, chapter: &Chapter) -> Result<RecordId, StoreError> {
        let id = format!("chapter-{}", chapter.number);
        self.chapters
            .lock()
            .unwrap()
            .push((id.clone(), chapter.title.clone()));
        Ok(id)
    }

    async fn save_act(&self, act: &Act, chapter_id: &RecordId) -> Result<RecordId, StoreError> {
        let id = format!("act-{}", act.prefix);
        self.acts
            .lock()
            .unwrap()
            .push((id.clone(), chapter_id.clone(), act.title.clone()));
        Ok(id)
    }

    async fn find_subtopic(&self, name: &str) -> Result<Option<RecordId>, StoreError> {
        Ok(self.subtopics.lock().unwrap().get(name).cloned())
    }

    async fn link_act_to_subtopic(
        &self,
        act_id: &RecordId,
        subtopic_id: &RecordId,
    ) -> Result<(), StoreError> {
        self.links
            .lock()
            .unwrap()
            .push((act_id.clone(), subtopic_id.clone()));
        Ok(())
    }
}
