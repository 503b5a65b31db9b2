//! Crawler module for catalog fetching and extraction
//!
//! This module contains the crawl pipeline, including:
//! - HTTP transport with retry and backoff
//! - Pagination discovery
//! - Listing page item extraction
//! - Detail page category enrichment
//! - Bounded worker pools for pages and details
//! - Overall crawl coordination

mod coordinator;
mod enricher;
mod extractor;
mod pagination;
mod pool;
mod transport;

pub use coordinator::{run_crawl, Crawler};
pub use enricher::{enrich_category, parse_breadcrumb_category};
pub use extractor::{extract_items, resolve_link};
pub use pagination::{discover_total_pages, listing_page_url, parse_total_pages};
pub use pool::WorkerPool;
pub use transport::{build_http_client, FetchedPage, Transport};
