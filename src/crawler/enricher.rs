//! Detail page enrichment
//!
//! Fetches an item's detail page and reads its category from the last link
//! of the breadcrumb trail. Enrichment is best-effort: every failure collapses
//! to an empty category so the item itself is never lost.

use crate::crawler::extractor::selector;
use crate::crawler::transport::Transport;
use crate::ParseError;
use scraper::Html;

/// Extracts the category (last breadcrumb link text) from a detail page
pub fn parse_breadcrumb_category(html: &str) -> Result<String, ParseError> {
    let document = Html::parse_document(html);
    let links = selector("ul.breadcrumb a")?;

    document
        .select(&links)
        .last()
        .map(|link| link.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(ParseError::MissingBreadcrumb)
}

/// Returns the category for the item at `detail_url`, or "" on any failure
pub async fn enrich_category(transport: &Transport, detail_url: &str) -> String {
    let page = match transport.fetch(detail_url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::debug!("Detail fetch failed, leaving category empty: {}", e);
            return String::new();
        }
    };

    parse_breadcrumb_category(&page.body).unwrap_or_else(|e| {
        tracing::debug!("No category for {}: {}", detail_url, e);
        String::new()
    })
}
