//! Record types flowing through the crawl pipeline
//!
//! - `RawItem`: one listing entry as scraped, before typing
//! - `NormalizedRecord`: the typed, identified record kept in a snapshot
//! - `CrawlResult`: everything one crawl invocation hands back to its caller

mod normalize;

pub use normalize::{assign_identifiers, normalize_item, parse_price, parse_rating};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One item as extracted from a listing page
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    pub title: String,

    /// Price text as shown, e.g. "£51.77"
    pub price: String,

    /// Star rating token, e.g. "Three", "4" or "5 stars"
    pub rating: String,

    pub availability: String,

    /// Absolute image URL
    pub image_url: String,

    /// Absolute URL of the item's detail page
    pub detail_url: String,

    category: String,
}

impl RawItem {
    /// Creates an item with an empty category
    pub fn new(
        title: String,
        price: String,
        rating: String,
        availability: String,
        image_url: String,
        detail_url: String,
    ) -> Self {
        Self {
            title,
            price,
            rating,
            availability,
            image_url,
            detail_url,
            category: String::new(),
        }
    }

    /// Category filled in by the detail enricher, empty until then
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Consumes the item and returns it with its category set
    pub fn with_category(mut self, category: String) -> Self {
        self.category = category;
        self
    }
}

/// A typed record with its snapshot identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Dense 1-based identifier within one snapshot
    pub id: u32,
    pub title: String,
    pub price: Option<f64>,
    /// Star rating in 1..=5
    pub rating: Option<u8>,
    pub availability: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// Output of one crawl invocation
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Records in identifier order
    pub records: Vec<NormalizedRecord>,

    /// Listing page tasks that ran to completion
    pub pages_visited: usize,

    /// Pages whose fetch failed and contributed nothing
    pub pages_failed: usize,

    /// Pages fetched successfully that held no items
    pub pages_empty: usize,

    /// Whether the snapshot file was written
    pub snapshot_written: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
