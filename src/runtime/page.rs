use crate::runtime::fetcher::Fetcher;
use crate::sources::common::{SECTION_DELIMITER, TITLE_MARKER, TOPIC_MARKER, URL_MARKER};
use async_trait::async_trait;
use regex::Regex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};
use tl::{Parser, VDom};

static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\r\n]+").unwrap());
static CITATION_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\(\s*\d+\s+ILCS\s").unwrap());

/// An open page. Drivers decide what `content` holds; the HTTP driver keeps
/// the fetched HTML.
#[derive(Debug)]
pub struct PageHandle {
    pub id: u64,
    pub url: String,
    pub content: String,
}

/// How matched elements are rendered into marker text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    /// `title:`/`topic:`/`url:` records separated by blank lines.
    Index,
    /// Element text grouped per section, sections joined by the section token.
    Sections,
}

/// Page-automation seam: open a page, pull marker text out of it, close it.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn open_page(&self, url: &str) -> Result<PageHandle, String>;

    async fn fetch_list_text(
        &self,
        page: &PageHandle,
        selector: &str,
        style: ListStyle,
    ) -> Result<String, String>;

    async fn close_page(&self, page: PageHandle);

    /// Releases the session. Further `open_page` calls fail.
    async fn shutdown(&self);
}

/// Plain HTTP + `tl` backend. `selector` is a tag name such as `li`.
pub struct HttpPageDriver {
    fetcher: Arc<dyn Fetcher>,
    next_id: AtomicU64,
    open_pages: AtomicUsize,
    shut_down: AtomicBool,
}

impl HttpPageDriver {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            next_id: AtomicU64::new(1),
            open_pages: AtomicUsize::new(0),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn open_pages(&self) -> usize {
        self.open_pages.load(Ordering::SeqCst)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageDriver for HttpPageDriver {
    async fn open_page(&self, url: &str) -> Result<PageHandle, String> {
        if self.is_shut_down() {
            return Err(format!("Session closed, cannot open {url}"));
        }
        let content = self.fetcher.fetch(url).await?;
        self.open_pages.fetch_add(1, Ordering::SeqCst);
        Ok(PageHandle {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            url: url.to_string(),
            content,
        })
    }

    async fn fetch_list_text(
        &self,
        page: &PageHandle,
        selector: &str,
        style: ListStyle,
    ) -> Result<String, String> {
        match style {
            ListStyle::Index => render_index_list(&page.content, &page.url, selector),
            ListStyle::Sections => render_section_list(&page.content, selector),
        }
    }

    async fn close_page(&self, page: PageHandle) {
        drop(page);
        self.open_pages.fetch_sub(1, Ordering::SeqCst);
    }

    async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

fn parse_dom(html: &str) -> Result<VDom<'_>, String> {
    tl::parse(html, tl::ParserOptions::default()).map_err(|e| format!("Failed to parse HTML: {e}"))
}

/// Decodes the handful of entities the index pages use. Non-breaking spaces
/// are kept as U+00A0 for the whitespace normalizer.
fn element_text(raw: &str) -> String {
    let decoded = raw
        .replace("&nbsp;", "\u{00A0}")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    SPACE_RE.replace_all(decoded.trim(), " ").trim().to_string()
}

fn tags_named<'a, 'd>(
    dom: &'d VDom<'a>,
    name: &'d str,
) -> impl Iterator<Item = &'d tl::HTMLTag<'a>> + 'd {
    dom.nodes().iter().filter_map(move |node| {
        let tag = node.as_tag()?;
        tag.name()
            .as_utf8_str()
            .eq_ignore_ascii_case(name)
            .then_some(tag)
    })
}

fn first_href(tag: &tl::HTMLTag<'_>, parser: &Parser<'_>) -> Option<String> {
    tag.children()
        .all(parser)
        .iter()
        .filter_map(|node| node.as_tag())
        .filter(|child| child.name().as_utf8_str().eq_ignore_ascii_case("a"))
        .find_map(|anchor| anchor.attributes().get("href").flatten())
        .map(|href| href.as_utf8_str().trim().replace("&amp;", "&"))
        .filter(|href| !href.is_empty())
}

/// Linked elements become records; unlinked ones are topic headings carried
/// onto every following record.
pub fn render_index_list(html: &str, page_url: &str, selector: &str) -> Result<String, String> {
    let dom = parse_dom(html)?;
    let parser = dom.parser();
    let base = reqwest::Url::parse(page_url).map_err(|e| format!("Invalid page URL: {e}"))?;

    let mut topic: Option<String> = None;
    let mut records = Vec::new();
    for tag in tags_named(&dom, selector) {
        let text = element_text(&tag.inner_text(parser));
        if text.is_empty() {
            continue;
        }
        let Some(href) = first_href(tag, parser) else {
            topic = Some(text);
            continue;
        };
        let url = base
            .join(&href)
            .map_err(|e| format!("Failed to resolve {href}: {e}"))?;

        let mut record = format!("{TITLE_MARKER} {text}\n");
        if let Some(topic) = &topic {
            record.push_str(&format!("{TOPIC_MARKER} {topic}\n"));
        }
        record.push_str(&format!("{URL_MARKER} {url}"));
        records.push(record);
    }

    Ok(records.join("\n\n"))
}

/// A section starts at each element opening with an `(<n> ILCS ...)` citation;
/// text before the first citation is dropped.
pub fn render_section_list(html: &str, selector: &str) -> Result<String, String> {
    let dom = parse_dom(html)?;
    let parser = dom.parser();

    let mut sections: Vec<Vec<String>> = Vec::new();
    for tag in tags_named(&dom, selector) {
        let text = element_text(&tag.inner_text(parser));
        if text.is_empty() {
            continue;
        }
        if CITATION_START_RE.is_match(&text) {
            sections.push(vec![text]);
        } else if let Some(current) = sections.last_mut() {
            current.push(text);
        }
    }

    Ok(sections
        .iter()
        .map(|lines| lines.join("\n"))
        .collect::<Vec<_>>()
        .join(&format!("\n{SECTION_DELIMITER}\n")))
}
