use clap::Parser;
use ilcs_ingest::runtime::fetcher::HttpFetcher;
use ilcs_ingest::runtime::logging;
use ilcs_ingest::runtime::orchestrator::{run_crawl, CrawlOptions};
use ilcs_ingest::runtime::page::HttpPageDriver;
use ilcs_ingest::sources::configs::CrawlConfig;
use ilcs_ingest::sources::ilcs::listing::format_chapter_listing;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Crawl the Illinois Compiled Statutes index into chapters, acts and sections.
#[derive(Debug, Parser)]
#[command(name = "ilcs-ingest", version)]
struct Cli {
    /// JSON config file. Defaults to $CONFIGS_PATH/crawler.json when set.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<String>,
    /// Delay before each chapter/act page request, in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,
    /// Chapters loaded at once.
    #[arg(long)]
    concurrency: Option<usize>,
    /// Load each chapter's acts.
    #[arg(long)]
    acts: bool,
    /// Load each act's sections (implies --acts).
    #[arg(long)]
    sections: bool,
    /// Only crawl the first N chapters.
    #[arg(long)]
    limit: Option<usize>,
    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Print the chapter listing grouped by topic.
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn load_config(&self) -> Result<CrawlConfig, String> {
        let mut config = match &self.config {
            Some(path) => CrawlConfig::load_from_file(path)?,
            None => CrawlConfig::load_default()?,
        };
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(delay_ms) = self.delay_ms {
            config.request_delay_ms = delay_ms;
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrency = concurrency;
        }
        Ok(config)
    }

    fn options(&self) -> CrawlOptions {
        CrawlOptions {
            load_acts: self.acts || self.sections,
            load_sections: self.sections,
            chapter_limit: self.limit,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = logging::init() {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("[Crawler] {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let config = cli.load_config()?;
    let fetcher = HttpFetcher::from_config(&config)?;
    let driver = Arc::new(HttpPageDriver::new(Arc::new(fetcher)));

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("[Crawler] Interrupt received, stopping after current chapter");
            cancel_on_signal.cancel();
        }
    });

    let report = run_crawl(driver, config, cli.options(), cancel)
        .await
        .map_err(|e| e.to_string())?;

    for failure in &report.failures {
        tracing::warn!(
            "[Crawler] Chapter {} failed: {}",
            failure.chapter_number,
            failure.error
        );
    }

    if cli.list {
        print!("{}", format_chapter_listing(&report.chapters));
    }

    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| format!("Failed to serialize report: {e}"))?;
    match &cli.output {
        Some(path) => std::fs::write(path, json)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?,
        None if !cli.list => println!("{json}"),
        None => {}
    }

    Ok(())
}
