//! Pagination discovery
//!
//! Reads the "Page <current> of <total>" marker from the first listing page.
//! Any failure degrades to a single page instead of failing the crawl.

use crate::crawler::extractor::selector;
use crate::crawler::transport::Transport;
use crate::ParseError;
use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;
use url::Url;

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s+of\s+(\d+)").expect("valid pagination pattern"))
}

/// Builds the URL of listing page `page` under the catalog base URL
pub fn listing_page_url(base_url: &Url, page: u32) -> String {
    match base_url.join(&format!("page-{}.html", page)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}page-{}.html", base_url, page),
    }
}

/// Parses the total page count from a listing page's pagination marker
///
/// The pager's current-page element is checked first; if the page has no
/// such element, the whole document text is searched.
///
/// # Example
///
/// ```
/// use shelfscan::crawler::parse_total_pages;
///
/// let html = r#"<ul class="pager"><li class="current">Page 1 of 7</li></ul>"#;
/// assert_eq!(parse_total_pages(html).unwrap(), 7);
/// ```
pub fn parse_total_pages(html: &str) -> Result<u32, ParseError> {
    let document = Html::parse_document(html);
    let current = selector("li.current")?;

    let marker_text = document
        .select(&current)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_else(|| document.root_element().text().collect::<String>());

    marker_regex()
        .captures(&marker_text)
        .and_then(|caps| caps.get(2))
        .and_then(|total| total.as_str().parse::<u32>().ok())
        .filter(|total| *total >= 1)
        .ok_or(ParseError::MissingPagination)
}

/// Discovers how many listing pages the catalog has
///
/// Fetches page 1 and parses its pagination marker. Returns 1 (with a
/// warning) when the fetch fails or no marker can be parsed.
pub async fn discover_total_pages(transport: &Transport, base_url: &Url) -> u32 {
    let url = listing_page_url(base_url, 1);

    let page = match transport.fetch(&url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("Pagination discovery failed, assuming 1 page: {}", e);
            return 1;
        }
    };

    match parse_total_pages(&page.body) {
        Ok(total) => {
            tracing::info!("Catalog reports {} listing pages", total);
            total
        }
        Err(e) => {
            tracing::warn!("Pagination discovery failed, assuming 1 page: {}", e);
            1
        }
    }
}
