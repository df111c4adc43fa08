use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://www.ilga.gov/legislation/ilcs/ilcs.asp";
pub const CONFIG_FILE_NAME: &str = "crawler.json";
pub const CONFIGS_PATH_ENV: &str = "CONFIGS_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub base_url: String,
    /// Tag whose elements make up the chapter index.
    pub index_selector: String,
    /// Tag whose elements make up a chapter's act index.
    pub act_selector: String,
    /// Tag whose elements make up an act's full text.
    pub section_selector: String,
    pub request_delay_ms: u64,
    /// Chapters whose acts may be loading at once. `0` behaves like `1`.
    pub max_concurrency: usize,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            index_selector: "li".to_string(),
            act_selector: "li".to_string(),
            section_selector: "p".to_string(),
            request_delay_ms: 300,
            max_concurrency: 1,
            user_agent: concat!("ilcs_ingest/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}

impl CrawlConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        let config: CrawlConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Reads `$CONFIGS_PATH/crawler.json` when the variable is set, defaults otherwise.
    pub fn load_default() -> Result<Self, String> {
        match std::env::var(CONFIGS_PATH_ENV) {
            Ok(dir) if !dir.trim().is_empty() => {
                Self::load_from_file(Path::new(&dir).join(CONFIG_FILE_NAME))
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}
