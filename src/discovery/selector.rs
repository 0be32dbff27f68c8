//! CSS selector link discovery

use scraper::Selector;
use thiserror::Error;
use tracing::trace;

use super::Discoverer;
use crate::fetch::Resource;
use crate::uri::DiscoveredUri;

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("invalid CSS selector `{selector}`: {message}")]
    Invalid { selector: String, message: String },
}

/// Finds links by CSS selector.
///
/// The plain constructor matches elements and reads `href`; `with_attribute`
/// covers `src`-style extraction. The selector is validated when the
/// discoverer is built, not when it runs.
#[derive(Debug)]
pub struct SelectorDiscoverer {
    selector: Selector,
    attribute: String,
}

impl SelectorDiscoverer {
    /// Selector installed by the engine when nothing else is configured.
    pub const DEFAULT_SELECTOR: &'static str = "a[href]";

    pub fn new(selector: &str) -> Result<Self, SelectorError> {
        Self::with_attribute(selector, "href")
    }

    pub fn with_attribute(selector: &str, attribute: &str) -> Result<Self, SelectorError> {
        let parsed = Selector::parse(selector).map_err(|e| SelectorError::Invalid {
            selector: selector.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            selector: parsed,
            attribute: attribute.to_string(),
        })
    }
}

impl Discoverer for SelectorDiscoverer {
    fn discover(&self, resource: &Resource) -> Vec<DiscoveredUri> {
        if !resource.is_html() {
            return Vec::new();
        }

        let base = &resource.final_url;
        let mut found = Vec::new();

        for element in resource.html().select(&self.selector) {
            let Some(raw) = element.value().attr(&self.attribute) else {
                continue;
            };
            match base.join(raw) {
                Ok(url) => found.push(resource.uri.child(url)),
                // Values that do not resolve against the page are skipped
                // without failing discovery
                Err(_) => trace!("ignoring unresolvable link {:?} on {}", raw, base),
            }
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn page(body: &str) -> Resource {
        let url = Url::parse("https://example.com/docs/page").unwrap();
        Resource::new(
            DiscoveredUri::new(url.clone(), 1),
            url,
            200,
            vec![("Content-Type".into(), "text/html".into())],
            body.to_string(),
        )
    }

    #[test]
    fn resolves_relative_and_absolute_links() {
        let discoverer = SelectorDiscoverer::new(SelectorDiscoverer::DEFAULT_SELECTOR).unwrap();
        let resource = page(
            r#"
            <a href="/about">About</a>
            <a href="intro">Intro</a>
            <a href="https://other.com/page">Other</a>
            "#,
        );

        let found = discoverer.discover(&resource);
        let urls: Vec<&str> = found.iter().map(|u| u.url().as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/about",
                "https://example.com/docs/intro",
                "https://other.com/page",
            ]
        );
        assert!(found.iter().all(|u| u.depth() == 2));
    }

    #[test]
    fn unresolvable_links_are_skipped_silently() {
        let discoverer = SelectorDiscoverer::new("a[href]").unwrap();
        let resource = page(r#"<a href="http://[">broken</a><a href="/ok">ok</a>"#);

        let found = discoverer.discover(&resource);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url().path(), "/ok");
    }

    #[test]
    fn custom_attribute_extraction() {
        let discoverer = SelectorDiscoverer::with_attribute("img[src]", "src").unwrap();
        let resource = page(r#"<img src="/logo.png"><a href="/ignored">x</a>"#);

        let found = discoverer.discover(&resource);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url().path(), "/logo.png");
    }

    #[test]
    fn invalid_selector_fails_at_construction() {
        let err = SelectorDiscoverer::new("a[").unwrap_err();
        assert!(err.to_string().contains("a["));
    }

    #[test]
    fn non_html_resources_yield_nothing() {
        let discoverer = SelectorDiscoverer::new("a[href]").unwrap();
        let url = Url::parse("https://example.com/data.json").unwrap();
        let resource = Resource::new(
            DiscoveredUri::new(url.clone(), 0),
            url,
            200,
            vec![("Content-Type".into(), "application/json".into())],
            r#"{"a": "<a href=\"/x\">fake</a>"}"#.to_string(),
        );
        assert!(discoverer.discover(&resource).is_empty());
    }
}
