//! Field normalization and identifier assignment

use crate::record::{NormalizedRecord, RawItem};
use regex::Regex;
use std::sync::OnceLock;

fn decimal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d*\.?\d+").expect("valid decimal pattern"))
}

fn digits_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid digits pattern"))
}

/// Parses a star rating token into 1..=5
///
/// The token is resolved, in order, as a plain integer, an English number
/// word ("one" to "five", any case), or the first run of digits anywhere in
/// the string. Anything else, including values outside 1..=5, is `None`.
///
/// ```
/// use shelfscan::record::parse_rating;
///
/// assert_eq!(parse_rating("Three"), Some(3));
/// assert_eq!(parse_rating("5 stars"), Some(5));
/// assert_eq!(parse_rating("N/A"), None);
/// ```
pub fn parse_rating(token: &str) -> Option<u8> {
    match rating_value(token.trim())? {
        value @ 1..=5 => Some(value as u8),
        _ => None,
    }
}

fn rating_value(token: &str) -> Option<u32> {
    if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
        return token.parse().ok();
    }

    if let Some(value) = rating_word(token) {
        return Some(value);
    }

    digits_regex()
        .find(token)
        .and_then(|m| m.as_str().parse().ok())
}

fn rating_word(token: &str) -> Option<u32> {
    match token.to_ascii_lowercase().as_str() {
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        _ => None,
    }
}

/// Extracts the first decimal number from price text, e.g. "£51.77" -> 51.77
pub fn parse_price(text: &str) -> Option<f64> {
    decimal_regex()
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Types one raw item and gives it the supplied identifier
///
/// Blank text fields become `None`, matching how the snapshot reader
/// treats empty cells.
pub fn normalize_item(item: RawItem, id: u32) -> NormalizedRecord {
    let price = parse_price(&item.price);
    let rating = parse_rating(&item.rating);
    let category = non_empty(item.category().to_string());

    NormalizedRecord {
        id,
        title: item.title.trim().to_string(),
        price,
        rating,
        availability: non_empty(item.availability),
        category,
        image_url: non_empty(item.image_url),
    }
}

/// Flattens per-page item lists and numbers them 1..=N
///
/// Identifiers follow the order of `pages` exactly: the caller decides
/// whether that is completion order or page-number order.
pub fn assign_identifiers<I>(pages: I) -> Vec<NormalizedRecord>
where
    I: IntoIterator<Item = Vec<RawItem>>,
{
    pages
        .into_iter()
        .flatten()
        .zip(1u32..)
        .map(|(item, id)| normalize_item(item, id))
        .collect()
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}
