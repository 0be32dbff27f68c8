//! Fetched resources
//!
//! A `Resource` is the unit the crawl works on: the locator it was fetched
//! for, the response around it, and a lazily parsed HTML document shared by
//! every discoverer that inspects the page.

use std::cell::OnceCell;
use std::time::Duration;

use chrono::{DateTime, Utc};
use scraper::Html;
use url::Url;

use crate::uri::DiscoveredUri;

/// Result of a successful fetch
#[derive(Debug)]
pub struct Resource {
    /// The locator the crawl requested, with its discovery depth
    pub uri: DiscoveredUri,
    /// The URL the content actually came from (may differ due to redirects)
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: String,
    /// Content type, when the response carried one
    pub content_type: Option<String>,
    /// Time taken to fetch
    pub fetch_duration: Duration,
    /// When the fetch completed
    pub fetched_at: DateTime<Utc>,
    /// Parsed on first use; the engine runs on one thread
    document: OnceCell<Html>,
}

impl Resource {
    /// Build a resource from response parts. The content type is read from
    /// the header list.
    pub fn new(
        uri: DiscoveredUri,
        final_url: Url,
        status: u16,
        headers: Vec<(String, String)>,
        body: String,
    ) -> Self {
        let content_type = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.clone());

        Self {
            uri,
            final_url,
            status,
            headers,
            body,
            content_type,
            fetch_duration: Duration::ZERO,
            fetched_at: Utc::now(),
            document: OnceCell::new(),
        }
    }

    /// Check if this is HTML content. Resources without a content type are
    /// assumed HTML.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(ct) => ct.contains("text/html") || ct.contains("application/xhtml"),
            None => true,
        }
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The parsed document, built lazily from the body.
    pub fn html(&self) -> &Html {
        self.document.get_or_init(|| Html::parse_document(&self.body))
    }
}
