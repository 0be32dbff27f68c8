//! Integration tests for trawl
//!
//! These tests compose the whole engine through `Spider::from_config` and
//! drive it against an in-memory site, so every seam (config wiring, queue,
//! discovery, filters, store, listeners) is exercised without network access.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use trawl::{
    Config, DiscoveredUri, FetchError, PersistenceHandler, RequestHandler, Resource, Spider,
    TraversalOrder,
};

/// In-memory request handler serving a fixed set of HTML pages and recording
/// the order in which they were fetched.
struct TestSite {
    pages: HashMap<String, String>,
    log: Rc<RefCell<Vec<String>>>,
}

impl TestSite {
    fn new(pages: &[(&str, &str)]) -> (Self, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let site = Self {
            pages: pages
                .iter()
                .map(|(path, body)| (path.to_string(), body.to_string()))
                .collect(),
            log: Rc::clone(&log),
        };
        (site, log)
    }
}

impl RequestHandler for TestSite {
    fn fetch(&mut self, uri: &DiscoveredUri) -> Result<Resource, FetchError> {
        let path = uri.url().path().to_string();
        let Some(body) = self.pages.get(&path) else {
            return Err(FetchError::StatusCode(404));
        };
        self.log.borrow_mut().push(path);
        Ok(Resource::new(
            uri.clone(),
            uri.url().clone(),
            200,
            vec![("Content-Type".into(), "text/html; charset=utf-8".into())],
            body.clone(),
        ))
    }
}

fn page(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{href}">{href}</a>"#))
        .collect();
    format!("<html><body>{anchors}</body></html>")
}

/// The reference site: / links b, c, e; b links d, f; c links g; e links f.
fn reference_site() -> Vec<(&'static str, String)> {
    vec![
        ("/", page(&["/b", "/c", "/e"])),
        ("/b", page(&["/d", "/f"])),
        ("/c", page(&["/g"])),
        ("/e", page(&["/f"])),
        ("/d", page(&[])),
        ("/f", page(&[])),
        ("/g", page(&[])),
    ]
}

fn quiet_config(seed: &str) -> Config {
    let mut config = Config::default();
    config.crawl.seed = seed.to_string();
    config.politeness.delay_ms = 0;
    config
}

fn spider_for(config: &Config, pages: &[(&str, &str)]) -> (Spider, Rc<RefCell<Vec<String>>>) {
    let (site, log) = TestSite::new(pages);
    let mut spider = Spider::from_config(config).unwrap();
    spider.set_request_handler(Box::new(site));
    (spider, log)
}

/// Test that a config-built spider crawls a whole site and reports it.
#[test]
fn test_crawl_visits_every_reachable_page() {
    let config = quiet_config("http://site.test/");
    let pages = reference_site();
    let borrowed: Vec<(&str, &str)> = pages.iter().map(|(p, b)| (*p, b.as_str())).collect();
    let (spider, log) = spider_for(&config, &borrowed);

    let report = spider.crawl();

    assert_eq!(report.persisted_count(), 7);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.filtered_count(), 0);
    assert_eq!(log.borrow().len(), 7);
}

/// Test that the traversal order parsed from TOML drives the fetch order.
#[test]
fn test_breadth_first_order_from_toml() {
    let toml_src = r#"
        [crawl]
        seed = "http://site.test/"
        traversal = "breadth-first"
        max_depth = 5

        [politeness]
        delay_ms = 0
    "#;
    let config: Config = toml::from_str(toml_src).unwrap();
    assert_eq!(config.crawl.traversal, TraversalOrder::BreadthFirst);

    let pages = reference_site();
    let borrowed: Vec<(&str, &str)> = pages.iter().map(|(p, b)| (*p, b.as_str())).collect();
    let (spider, log) = spider_for(&config, &borrowed);

    spider.crawl();

    assert_eq!(*log.borrow(), vec!["/", "/b", "/c", "/e", "/d", "/f", "/g"]);
}

/// Test that restrict_to_seed keeps the crawl on the seed's site.
#[test]
fn test_offsite_links_are_dropped_before_fetching() {
    let mut config = quiet_config("http://site.test/docs/");
    config.filter.restrict_to_seed = true;

    let home = page(&[
        "/docs/guide",
        "http://elsewhere.test/stolen",
        "http://site.test/outside",
    ]);
    let guide = page(&[]);
    let (spider, log) = spider_for(
        &config,
        &[("/docs/", home.as_str()), ("/docs/guide", guide.as_str())],
    );

    let report = spider.crawl();

    // Neither the foreign host nor the off-prefix path reaches the handler,
    // but both rejections are on the report
    assert_eq!(*log.borrow(), vec!["/docs/", "/docs/guide"]);
    assert_eq!(report.persisted_count(), 2);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.filtered_count(), 2);
    assert_eq!(report.filtered[0].0.host_str(), Some("elsewhere.test"));
    assert_eq!(report.filtered[1].0.path(), "/outside");
    assert!(report.filtered.iter().all(|(_, f)| f == "restrict_to_base"));
}

/// Test that fragment and query links are dropped when configured.
#[test]
fn test_fragment_and_query_links_are_dropped() {
    let mut config = quiet_config("http://site.test/");
    config.filter.skip_fragments = true;
    config.filter.skip_queries = true;

    let home = page(&[
        "/plain",
        "/plain#section",
        "/search?q=crawl",
        "mailto:root@site.test",
    ]);
    let plain = page(&[]);
    let (spider, log) = spider_for(
        &config,
        &[("/", home.as_str()), ("/plain", plain.as_str())],
    );

    let report = spider.crawl();

    assert_eq!(*log.borrow(), vec!["/", "/plain"]);
    assert_eq!(report.persisted_count(), 2);

    let filters: Vec<&str> = report.filtered.iter().map(|(_, f)| f.as_str()).collect();
    assert_eq!(
        filters,
        vec!["uri_with_hash", "uri_with_query", "allowed_schemes"]
    );
    assert_eq!(report.filtered[0].0.fragment(), Some("section"));
    assert_eq!(report.filtered[2].0.scheme(), "mailto");
}

/// Test that the download ceiling from config stops the crawl.
#[test]
fn test_download_ceiling_from_config() {
    let mut config = quiet_config("http://site.test/");
    config.crawl.max_downloads = 3;

    let pages = reference_site();
    let borrowed: Vec<(&str, &str)> = pages.iter().map(|(p, b)| (*p, b.as_str())).collect();
    let (spider, log) = spider_for(&config, &borrowed);

    let report = spider.crawl();

    assert_eq!(report.persisted_count(), 3);
    assert_eq!(log.borrow().len(), 3);
}

/// Test that a failed page lands in the report without stopping the crawl.
#[test]
fn test_broken_link_is_reported_and_skipped() {
    let config = quiet_config("http://site.test/");
    let home = page(&["/missing", "/present"]);
    let present = page(&[]);
    let (spider, log) = spider_for(
        &config,
        &[("/", home.as_str()), ("/present", present.as_str())],
    );

    let report = spider.crawl();

    assert_eq!(report.persisted_count(), 2);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.failed[0].0.path(), "/missing");
    assert!(log.borrow().contains(&"/present".to_string()));
}

/// Test the file store end to end: one JSON document per resource under the
/// run directory, numbered in persistence order.
#[test]
fn test_file_store_writes_one_document_per_resource() {
    let temp_dir = TempDir::new().unwrap();

    let mut config = quiet_config("http://site.test/");
    config.crawl.run_id = Some("testrun".to_string());
    config.store.backend = trawl::config::StoreBackend::File;
    config.store.root = temp_dir.path().to_path_buf();

    let home = page(&["/about"]);
    let about = page(&[]);
    let (spider, _log) = spider_for(
        &config,
        &[("/", home.as_str()), ("/about", about.as_str())],
    );
    assert_eq!(spider.run_id(), "testrun");

    let report = spider.crawl();
    assert_eq!(report.persisted_count(), 2);

    let run_dir = temp_dir.path().join("testrun");
    let mut names: Vec<String> = std::fs::read_dir(&run_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["00001-site-test.json", "00002-site-test.json"]);

    let first = std::fs::read_to_string(run_dir.join("00001-site-test.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(doc["url"], "http://site.test/");
    assert_eq!(doc["depth"], 0);
    assert_eq!(doc["status"], 200);

    // The report reads the same documents back through the handler
    let documents = report.store().stored().unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].url.as_str(), "http://site.test/");
    assert_eq!(documents[1].url.path(), "/about");
}

/// Test that the politeness delay spaces out consecutive requests.
#[test]
fn test_politeness_delay_paces_the_crawl() {
    let mut config = quiet_config("http://site.test/");
    config.politeness.delay_ms = 25;

    let home = page(&["/a", "/b"]);
    let leaf = page(&[]);
    let (spider, log) = spider_for(
        &config,
        &[
            ("/", home.as_str()),
            ("/a", leaf.as_str()),
            ("/b", leaf.as_str()),
        ],
    );

    let started = Instant::now();
    spider.crawl();
    let elapsed = started.elapsed();

    assert_eq!(log.borrow().len(), 3);
    // Two inter-request gaps at 25ms each
    assert!(elapsed >= Duration::from_millis(50), "elapsed {elapsed:?}");
}
