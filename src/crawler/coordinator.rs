//! Crawl coordinator - main crawl orchestration logic
//!
//! This module ties the pipeline together:
//! - discovering how many listing pages exist
//! - running listing pages through the page pool
//! - fanning each page's items out to a per-page detail batch
//! - numbering the collected items and writing the snapshot

use crate::config::{validate, Config};
use crate::crawler::enricher::enrich_category;
use crate::crawler::extractor::extract_items;
use crate::crawler::pagination::{discover_total_pages, listing_page_url};
use crate::crawler::pool::WorkerPool;
use crate::crawler::transport::Transport;
use crate::output::write_snapshot;
use crate::record::{assign_identifiers, CrawlResult, RawItem};
use crate::state::PageOutcome;
use crate::{ConfigError, ShelfError};
use chrono::Utc;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// Everything a page task needs, shared read-only across tasks
struct PageContext {
    transport: Arc<Transport>,
    base_url: Url,
    detail_pool: WorkerPool,
}

/// What one listing page task hands back to the collector
#[derive(Debug)]
struct PageReport {
    outcome: PageOutcome,
    items: Vec<RawItem>,
}

impl PageReport {
    fn without_items(outcome: PageOutcome) -> Self {
        Self {
            outcome,
            items: Vec::new(),
        }
    }
}

/// Main crawler structure
pub struct Crawler {
    context: Arc<PageContext>,
    page_pool: WorkerPool,
    default_start_page: u32,
    max_pages: u32,
    snapshot_path: PathBuf,
}

impl Crawler {
    /// Creates a crawler from a configuration
    ///
    /// The configuration is validated here, before any network I/O, so a
    /// zero worker count or a malformed base URL fails immediately.
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(ShelfError)` - Invalid configuration or HTTP client setup failure
    pub fn new(config: Config) -> Result<Self, ShelfError> {
        validate(&config)?;

        let base_url = Url::parse(&config.site.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;
        let transport = Arc::new(Transport::new(&config.transport)?);

        let context = PageContext {
            transport,
            base_url,
            detail_pool: WorkerPool::new("detail", config.workers.details),
        };

        Ok(Self {
            context: Arc::new(context),
            page_pool: WorkerPool::new("page", config.workers.pages),
            default_start_page: config.site.start_page,
            max_pages: config.site.max_pages,
            snapshot_path: PathBuf::from(&config.output.snapshot_path),
        })
    }

    /// Listing pages scheduled for a run starting at `start`
    ///
    /// Bounded by the discovered `total` and by `max-pages`. The start page
    /// is always scheduled, even when discovery reported fewer pages.
    pub fn page_range(&self, start: u32, total: u32) -> RangeInclusive<u32> {
        let start = start.max(1);
        let ceiling = start.saturating_add(self.max_pages.saturating_sub(1));
        start..=total.max(start).min(ceiling)
    }

    /// Runs one full crawl
    ///
    /// 1. Resolve the start page (argument, else configured default)
    /// 2. Discover the total page count from listing page 1. The page 1 task
    ///    fetches that page again, so a run starting at 1 requests it twice
    /// 3. Run each scheduled page through the page pool; each page task
    ///    extracts items and enriches them through its own detail batch
    /// 4. Append page item lists in the order page tasks complete
    /// 5. Assign identifiers 1..=N and normalize fields
    /// 6. Write the snapshot (failure is logged, not returned)
    ///
    /// Page and detail failures only shrink the result; the run itself
    /// always returns.
    pub async fn run(&self, start_page: Option<u32>) -> CrawlResult {
        let started_at = Utc::now();
        let start = start_page.unwrap_or(self.default_start_page);

        let total = discover_total_pages(&self.context.transport, &self.context.base_url).await;
        let pages = self.page_range(start, total);
        tracing::info!(
            "Crawling listing pages {}..={} ({} page workers, {} detail workers per page)",
            pages.start(),
            pages.end(),
            self.page_pool.limit(),
            self.context.detail_pool.limit()
        );

        let tasks: Vec<_> = pages
            .map(|page| (page, process_page(Arc::clone(&self.context), page)))
            .collect();
        let reports = self.page_pool.run(tasks).await;

        let pages_visited = reports.len();
        let mut pages_failed = 0;
        let mut pages_empty = 0;
        let mut aggregated = Vec::with_capacity(reports.len());

        for (page, report) in reports {
            tracing::debug!(
                "Page {} {} with {} items",
                page,
                report.outcome,
                report.items.len()
            );
            if report.outcome.is_success() {
                aggregated.push(report.items);
            } else if report.outcome.is_failure() {
                pages_failed += 1;
            } else {
                pages_empty += 1;
            }
        }

        let records = assign_identifiers(aggregated);
        tracing::info!(
            "Crawl collected {} records from {} pages ({} failed, {} empty)",
            records.len(),
            pages_visited,
            pages_failed,
            pages_empty
        );

        let snapshot_written = match write_snapshot(&records, &self.snapshot_path) {
            Ok(rows) => rows > 0,
            Err(e) => {
                tracing::warn!(
                    "Failed to write snapshot to {}: {}",
                    self.snapshot_path.display(),
                    e
                );
                false
            }
        };

        CrawlResult {
            records,
            pages_visited,
            pages_failed,
            pages_empty,
            snapshot_written,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Fetches, extracts, and enriches a single listing page
async fn process_page(context: Arc<PageContext>, page: u32) -> PageReport {
    let url = listing_page_url(&context.base_url, page);

    let fetched = match context.transport.fetch(&url).await {
        Ok(fetched) => fetched,
        Err(e) => {
            tracing::warn!("Dropping listing page {}: {}", page, e);
            return PageReport::without_items(PageOutcome::from(&e));
        }
    };

    let items = extract_items(&fetched.body, &context.base_url);
    if items.is_empty() {
        tracing::debug!("Listing page {} has no items", page);
        return PageReport::without_items(PageOutcome::Empty);
    }

    PageReport {
        outcome: PageOutcome::Processed,
        items: enrich_items(&context, items).await,
    }
}

/// Runs one detail batch for a page's items
///
/// Each task owns its item and writes only that item's category. Items
/// come back in listing order regardless of which detail fetch finished first.
async fn enrich_items(context: &PageContext, items: Vec<RawItem>) -> Vec<RawItem> {
    let tasks: Vec<_> = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let transport = Arc::clone(&context.transport);
            (index, async move {
                let category = enrich_category(&transport, &item.detail_url).await;
                item.with_category(category)
            })
        })
        .collect();

    let mut enriched = context.detail_pool.run(tasks).await;
    enriched.sort_by_key(|(index, _)| *index);
    enriched.into_iter().map(|(_, item)| item).collect()
}

/// Runs a complete crawl with the given configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `start_page` - First listing page; the configured default when `None`
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl ran (possibly with dropped pages)
/// * `Err(ShelfError)` - Configuration was rejected before crawling began
///
/// # Example
///
/// ```no_run
/// use shelfscan::config::Config;
/// use shelfscan::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let result = run_crawl(Config::default(), None).await?;
/// println!("{} records", result.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, start_page: Option<u32>) -> Result<CrawlResult, ShelfError> {
    let crawler = Crawler::new(config)?;
    Ok(crawler.run(start_page).await)
}
