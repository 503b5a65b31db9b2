//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small catalog and run the full
//! crawl pipeline end-to-end: pagination, listing pages, detail pages,
//! normalization, and the CSV snapshot.

use shelfscan::config::{Config, OutputConfig, SiteConfig, TransportConfig, WorkerConfig};
use shelfscan::crawler::{run_crawl, Crawler};
use shelfscan::output::read_snapshot;
use shelfscan::record::NormalizedRecord;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RATINGS: [&str; 5] = ["One", "Two", "Three", "Four", "Five"];

/// Creates a test configuration pointed at the mock catalog
fn create_test_config(base_url: &str, snapshot_path: &Path) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            start_page: 1,
            max_pages: 50,
        },
        transport: TransportConfig {
            timeout_secs: 5,
            verify_tls: true,
            retries: 1,
            backoff_base_ms: 1,
            retry_statuses: vec![500, 502, 503, 504],
            user_agent: "TestBot/1.0".to_string(),
        },
        workers: WorkerConfig {
            pages: 2,
            details: 3,
            max_in_flight: 400,
        },
        output: OutputConfig {
            snapshot_path: snapshot_path.display().to_string(),
        },
    }
}

fn slug(page: u32, item: u32) -> String {
    format!("book-{}-{}_{}", page, item, page * 100 + item)
}

fn title(page: u32, item: u32) -> String {
    format!("Book {}.{}", page, item)
}

fn price(page: u32, item: u32) -> f64 {
    f64::from(page * 10 + item) + 0.99
}

fn rating(page: u32, item: u32) -> u8 {
    ((page + item) % 5 + 1) as u8
}

/// Builds a listing page with `items` products and a pagination marker
fn listing_page(page: u32, total: Option<u32>, items: u32) -> String {
    let products: String = (1..=items)
        .map(|item| {
            format!(
                r#"<li><article class="product_pod">
                    <div class="image_container">
                        <a href="{slug}/index.html"><img src="../media/cache/{slug}.jpg" alt="{title}"></a>
                    </div>
                    <p class="star-rating {rating}"></p>
                    <h3><a href="{slug}/index.html" title="{title}">{title}</a></h3>
                    <div class="product_price">
                        <p class="price_color">£{price:.2}</p>
                        <p class="instock availability"> In stock </p>
                    </div>
                </article></li>"#,
                slug = slug(page, item),
                title = title(page, item),
                rating = RATINGS[usize::from(rating(page, item)) - 1],
                price = price(page, item),
            )
        })
        .collect();

    let pager = total
        .map(|total| {
            format!(
                r#"<ul class="pager"><li class="current">Page {} of {}</li></ul>"#,
                page, total
            )
        })
        .unwrap_or_default();

    format!(
        "<html><body><ol class=\"row\">{}</ol>{}</body></html>",
        products, pager
    )
}

fn detail_page(category: &str) -> String {
    format!(
        r#"<html><body><ul class="breadcrumb">
            <li><a href="../../index.html">Home</a></li>
            <li><a href="../category/books_1/index.html">Books</a></li>
            <li><a href="../category/books/x_2/index.html">{}</a></li>
            <li class="active">Title</li>
        </ul></body></html>"#,
        category
    )
}

fn category(page: u32) -> String {
    format!("Category {}", page)
}

/// Mounts a listing page and the detail pages of its items
async fn mount_page(server: &MockServer, page: u32, total: Option<u32>, items: u32) {
    mount_slow_page(server, page, total, items, Duration::ZERO).await;
}

/// Like `mount_page`, but the listing page answers after `delay`
async fn mount_slow_page(
    server: &MockServer,
    page: u32,
    total: Option<u32>,
    items: u32,
    delay: Duration,
) {
    Mock::given(method("GET"))
        .and(path(format!("/catalogue/page-{}.html", page)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(page, total, items))
                .set_delay(delay),
        )
        .mount(server)
        .await;

    for item in 1..=items {
        Mock::given(method("GET"))
            .and(path(format!("/catalogue/{}/index.html", slug(page, item))))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(&category(page))))
            .mount(server)
            .await;
    }
}

fn expected_tuples(pages: &[u32], items: u32) -> HashSet<(String, String, u8)> {
    pages
        .iter()
        .flat_map(|&page| {
            (1..=items).map(move |item| {
                (
                    title(page, item),
                    format!("{:.2}", price(page, item)),
                    rating(page, item),
                )
            })
        })
        .collect()
}

fn actual_tuples(records: &[NormalizedRecord]) -> HashSet<(String, String, u8)> {
    records
        .iter()
        .map(|r| {
            (
                r.title.clone(),
                format!("{:.2}", r.price.expect("price parsed")),
                r.rating.expect("rating parsed"),
            )
        })
        .collect()
}

fn find(records: &[NormalizedRecord], page: u32, item: u32) -> &NormalizedRecord {
    let wanted = title(page, item);
    records
        .iter()
        .find(|r| r.title == wanted)
        .expect("record present")
}

fn assert_dense_ids(records: &[NormalizedRecord]) {
    let mut ids: Vec<u32> = records.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    let expected: Vec<u32> = (1..=records.len() as u32).collect();
    assert_eq!(ids, expected, "identifiers must be 1..=N without gaps");
}

#[tokio::test]
async fn test_full_crawl_multiple_pages() {
    let server = MockServer::start().await;
    for page in 1..=3 {
        mount_page(&server, page, Some(3), 4).await;
    }

    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("data/books.csv");
    let config = create_test_config(&format!("{}/catalogue/", server.uri()), &snapshot);

    let result = run_crawl(config, None).await.expect("crawl should run");

    assert_eq!(result.records.len(), 12);
    assert_eq!(result.pages_visited, 3);
    assert_eq!(result.pages_failed, 0);
    assert_dense_ids(&result.records);
    assert_eq!(actual_tuples(&result.records), expected_tuples(&[1, 2, 3], 4));

    for record in &result.records {
        let page: u32 = record.title["Book ".len()..]
            .split('.')
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(record.category.as_deref(), Some(category(page).as_str()));
        assert_eq!(record.availability.as_deref(), Some("In stock"));
        assert!(record
            .image_url
            .as_deref()
            .unwrap()
            .starts_with(&format!("{}/media/cache/", server.uri())));
    }

    assert!(result.snapshot_written);
    let read_back = read_snapshot(&snapshot).unwrap();
    assert_eq!(read_back, result.records);
}

#[tokio::test]
async fn test_items_within_page_keep_listing_order() {
    let server = MockServer::start().await;
    mount_page(&server, 1, Some(1), 5).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        &format!("{}/catalogue/", server.uri()),
        &dir.path().join("books.csv"),
    );

    let result = run_crawl(config, None).await.unwrap();
    let titles: Vec<_> = result.records.iter().map(|r| r.title.clone()).collect();
    let expected: Vec<_> = (1..=5).map(|item| title(1, item)).collect();

    assert_eq!(titles, expected);
    assert_eq!(
        result.records.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5]
    );
}

#[tokio::test]
async fn test_identifiers_follow_page_completion_order() {
    let server = MockServer::start().await;
    mount_slow_page(&server, 1, Some(3), 2, Duration::from_millis(400)).await;
    mount_page(&server, 2, Some(3), 2).await;
    mount_page(&server, 3, Some(3), 2).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(
        &format!("{}/catalogue/", server.uri()),
        &dir.path().join("books.csv"),
    );
    config.workers.pages = 3;

    let result = run_crawl(config, None).await.unwrap();
    let records = &result.records;

    assert_eq!(records.len(), 6);
    assert_dense_ids(records);

    // The slow page finishes last, so its items take the highest identifiers
    assert_eq!(find(records, 1, 1).id, 5);
    assert_eq!(find(records, 1, 2).id, 6);
    for page in [2, 3] {
        for item in [1, 2] {
            assert!(find(records, page, item).id <= 4);
        }
    }
}

#[tokio::test]
async fn test_first_page_is_fetched_for_discovery_and_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalogue/page-1.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(1, Some(1), 1)))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/catalogue/{}/index.html", slug(1, 1))))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(&category(1))))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        &format!("{}/catalogue/", server.uri()),
        &dir.path().join("books.csv"),
    );

    let result = run_crawl(config, None).await.unwrap();
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.pages_visited, 1);
}

#[tokio::test]
async fn test_failed_page_is_dropped() {
    let server = MockServer::start().await;
    mount_page(&server, 1, Some(3), 2).await;
    mount_page(&server, 3, Some(3), 2).await;

    // Page 2 keeps failing with a retryable status until retries run out
    Mock::given(method("GET"))
        .and(path("/catalogue/page-2.html"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        &format!("{}/catalogue/", server.uri()),
        &dir.path().join("books.csv"),
    );

    let result = run_crawl(config, None).await.expect("crawl should still succeed");

    assert_eq!(result.records.len(), 4);
    assert_eq!(result.pages_visited, 3);
    assert_eq!(result.pages_failed, 1);
    assert_dense_ids(&result.records);
    assert_eq!(actual_tuples(&result.records), expected_tuples(&[1, 3], 2));
}

#[tokio::test]
async fn test_detail_failure_leaves_category_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/catalogue/page-1.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(1, Some(1), 3)))
        .mount(&server)
        .await;
    for item in [1, 3] {
        Mock::given(method("GET"))
            .and(path(format!("/catalogue/{}/index.html", slug(1, item))))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("Travel")))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(format!("/catalogue/{}/index.html", slug(1, 2))))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        &format!("{}/catalogue/", server.uri()),
        &dir.path().join("books.csv"),
    );

    let result = run_crawl(config, None).await.unwrap();
    assert_eq!(result.records.len(), 3);

    let records = &result.records;
    assert_eq!(find(records, 1, 1).category.as_deref(), Some("Travel"));
    assert_eq!(find(records, 1, 2).category, None);
    assert_eq!(find(records, 1, 3).category.as_deref(), Some("Travel"));
}

#[tokio::test]
async fn test_missing_pagination_marker_crawls_one_page() {
    let server = MockServer::start().await;
    mount_page(&server, 1, None, 2).await;
    mount_page(&server, 2, None, 2).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        &format!("{}/catalogue/", server.uri()),
        &dir.path().join("books.csv"),
    );

    let result = run_crawl(config, None).await.unwrap();
    assert_eq!(result.pages_visited, 1);
    assert_eq!(actual_tuples(&result.records), expected_tuples(&[1], 2));
}

#[tokio::test]
async fn test_max_pages_and_start_page() {
    let server = MockServer::start().await;
    for page in 1..=6 {
        mount_page(&server, page, Some(6), 1).await;
    }

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(
        &format!("{}/catalogue/", server.uri()),
        &dir.path().join("books.csv"),
    );
    config.site.max_pages = 2;

    let crawler = Crawler::new(config).unwrap();
    let result = crawler.run(Some(4)).await;

    assert_eq!(result.pages_visited, 2);
    assert_eq!(actual_tuples(&result.records), expected_tuples(&[4, 5], 1));
    assert_dense_ids(&result.records);
}

#[tokio::test]
async fn test_nothing_crawled_writes_no_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("books.csv");
    let config = create_test_config(&format!("{}/catalogue/", server.uri()), &snapshot);

    let result = run_crawl(config, None).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.pages_failed, 1);
    assert!(!result.snapshot_written);
    assert!(!snapshot.exists());
}

#[tokio::test]
async fn test_snapshot_failure_still_returns_records() {
    let server = MockServer::start().await;
    mount_page(&server, 1, Some(1), 2).await;

    // A regular file where the snapshot's parent directory should be
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let config = create_test_config(
        &format!("{}/catalogue/", server.uri()),
        &blocker.join("books.csv"),
    );

    let result = run_crawl(config, None).await.unwrap();

    assert_eq!(result.records.len(), 2);
    assert!(!result.snapshot_written);
}

#[tokio::test]
async fn test_invalid_config_fails_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(
        &format!("{}/catalogue/", server.uri()),
        &dir.path().join("books.csv"),
    );
    config.workers.details = 0;

    assert!(run_crawl(config, None).await.is_err());
}
