//! State module for tracking crawl progress
//!
//! Each listing page task finishes in exactly one `PageOutcome`; the
//! orchestrator tallies them into the run's `CrawlResult`.

mod page_outcome;

pub use page_outcome::PageOutcome;
