//! Listing page extractor
//!
//! Turns one listing page into raw items. Each item container must yield:
//! - title (the `title` attribute of the heading link)
//! - price text (`p.price_color`)
//! - rating token (the class next to `star-rating`, e.g. `Three`)
//! - availability text (`p.availability`, trimmed)
//! - image URL and detail URL, resolved against the catalog base URL
//!
//! A container missing any of these is skipped; the rest of the page is kept.

use crate::record::RawItem;
use crate::ParseError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const ITEM_CONTAINER: &str = "article.product_pod";

/// Parses a CSS selector, mapping failures into `ParseError`
pub(crate) fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css.to_string()))
}

/// Selectors used inside one item container
struct ItemSelectors {
    title_link: Selector,
    price: Selector,
    rating: Selector,
    availability: Selector,
    image: Selector,
}

impl ItemSelectors {
    fn new() -> Result<Self, ParseError> {
        Ok(Self {
            title_link: selector("h3 a")?,
            price: selector("p.price_color")?,
            rating: selector("p.star-rating")?,
            availability: selector("p.availability")?,
            image: selector("img")?,
        })
    }
}

/// Extracts all well-formed items from a listing page
///
/// An empty or unparseable page yields an empty vector, never an error.
///
/// # Arguments
///
/// * `html` - The listing page markup
/// * `base_url` - The catalog base URL used to resolve relative links
///
/// # Example
///
/// ```
/// use shelfscan::crawler::extract_items;
/// use url::Url;
///
/// let html = r#"<article class="product_pod">
///   <p class="star-rating Three"></p>
///   <h3><a href="a-light_1000/index.html" title="A Light in the Attic">A Light...</a></h3>
///   <img src="../media/cache/a.jpg">
///   <p class="price_color">£51.77</p>
///   <p class="instock availability"> In stock </p>
/// </article>"#;
/// let base = Url::parse("https://books.toscrape.com/catalogue/").unwrap();
/// let items = extract_items(html, &base);
/// assert_eq!(items.len(), 1);
/// assert_eq!(items[0].rating, "Three");
/// ```
pub fn extract_items(html: &str, base_url: &Url) -> Vec<RawItem> {
    let (containers, selectors) = match (selector(ITEM_CONTAINER), ItemSelectors::new()) {
        (Ok(c), Ok(s)) => (c, s),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!("Cannot build item selectors: {}", e);
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let mut items = Vec::new();

    for (index, container) in document.select(&containers).enumerate() {
        match parse_item(container, &selectors, base_url) {
            Ok(item) => items.push(item),
            Err(e) => tracing::debug!("Skipping item {} on listing page: {}", index, e),
        }
    }

    items
}

fn parse_item(
    container: ElementRef<'_>,
    selectors: &ItemSelectors,
    base_url: &Url,
) -> Result<RawItem, ParseError> {
    let title_link = container
        .select(&selectors.title_link)
        .next()
        .ok_or(ParseError::MissingField("title link"))?;

    let title = title_link
        .value()
        .attr("title")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ParseError::MissingField("title"))?;

    let href = title_link
        .value()
        .attr("href")
        .ok_or(ParseError::MissingField("detail link"))?;

    let price = element_text(container, &selectors.price)
        .ok_or(ParseError::MissingField("price"))?;

    let rating = container
        .select(&selectors.rating)
        .next()
        .and_then(|p| p.value().classes().find(|class| *class != "star-rating"))
        .ok_or(ParseError::MissingField("rating"))?;

    let availability = element_text(container, &selectors.availability)
        .ok_or(ParseError::MissingField("availability"))?;

    let image_src = container
        .select(&selectors.image)
        .next()
        .and_then(|img| img.value().attr("src"))
        .ok_or(ParseError::MissingField("image"))?;

    Ok(RawItem::new(
        title.to_string(),
        price,
        rating.to_string(),
        availability,
        resolve_link(image_src, base_url)?,
        resolve_link(href, base_url)?,
    ))
}

/// Trimmed text of the first element matching `selector`
fn element_text(container: ElementRef<'_>, selector: &Selector) -> Option<String> {
    container
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

/// Resolves a relative link against the catalog base URL
///
/// `../media/x.jpg` against `https://host/catalogue/` becomes
/// `https://host/media/x.jpg`.
pub fn resolve_link(href: &str, base_url: &Url) -> Result<String, ParseError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(ParseError::MissingField("link target"));
    }

    base_url
        .join(href)
        .map(|url| url.to_string())
        .map_err(|source| ParseError::InvalidUrl {
            href: href.to_string(),
            source,
        })
}
