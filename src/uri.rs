//! Locator values shared across the crawl pipeline
//!
//! A `DiscoveredUri` pairs an absolute URL with the depth at which it was
//! found. Instances are immutable; the engine never rewrites a locator after
//! construction, it derives new values instead.

use std::fmt;

use url::Url;

/// An absolute locator together with the depth at which it was discovered.
///
/// Depth 0 is the seed. Links found on a page sit one level deeper than the
/// page they were found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredUri {
    url: Url,
    depth: u32,
}

impl DiscoveredUri {
    pub fn new(url: Url, depth: u32) -> Self {
        Self { url, depth }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// A locator found on this page, one level deeper.
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }

    /// The same locator with its URL in canonical form.
    pub(crate) fn normalized(&self) -> Self {
        Self {
            url: normalize(&self.url),
            depth: self.depth,
        }
    }

    /// Canonical string form, the key used by the seen map.
    pub(crate) fn seen_key(&self) -> String {
        normalize(&self.url).into()
    }
}

impl fmt::Display for DiscoveredUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Normalize a URL for deduplication
///
/// - Lowercases scheme and host and strips default ports (80 for http, 443
///   for https); the `Url` parser already enforces both
/// - Rewrites an empty path as `/`
/// - Drops an empty query (`?` with nothing after it)
/// - Drops an empty fragment (`#` with nothing after it)
///
/// Non-empty fragments are kept so fragment-based filtering still sees them.
/// The function is idempotent: normalizing an already normal URL returns it
/// unchanged.
pub fn normalize(url: &Url) -> Url {
    let mut normalized = url.clone();

    if normalized.fragment() == Some("") {
        normalized.set_fragment(None);
    }

    if normalized.query() == Some("") {
        normalized.set_query(None);
    }

    if normalized.path().is_empty() {
        normalized.set_path("/");
    }

    normalized
}
