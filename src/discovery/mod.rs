//! Link discovery
//!
//! Discoverers pull candidate locators out of a fetched resource. The
//! `DiscovererSet` runs them and owns everything that decides whether a
//! candidate goes on to be queued: normalization, in-batch deduplication,
//! the seen map, the depth ceiling, and the pre-fetch filters.

mod selector;

pub use selector::{SelectorDiscoverer, SelectorError};

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::fetch::Resource;
use crate::filter::PrefetchFilter;
use crate::uri::DiscoveredUri;

/// Extracts candidate locators from a fetched resource.
pub trait Discoverer {
    fn discover(&self, resource: &Resource) -> Vec<DiscoveredUri>;
}

/// What one discovery pass produced.
#[derive(Debug, Default)]
pub struct DiscoveryOutcome {
    /// Locators to queue, in discovery order.
    pub admitted: Vec<DiscoveredUri>,
    /// Locators a pre-fetch filter turned away, with the filter's name.
    pub rejected: Vec<(DiscoveredUri, String)>,
}

/// Runs discoverers over fetched resources and admits new locators.
///
/// The seen map lives here and is scoped to one crawl. A locator's first
/// recorded sighting wins: once its canonical form is in the map, later
/// sightings at any depth are dropped and the first-seen depth stays
/// authoritative.
pub struct DiscovererSet {
    discoverers: Vec<Box<dyn Discoverer>>,
    prefetch_filters: Vec<Box<dyn PrefetchFilter>>,
    /// Normalized locator string to the depth of its first sighting. An
    /// entry, once written, is never overwritten.
    seen: HashMap<String, u32>,
    /// Depth at which discovery stops. A unit at this depth is still
    /// fetched; it just yields no children.
    max_depth: u32,
}

impl DiscovererSet {
    pub fn new(max_depth: u32) -> Self {
        Self {
            discoverers: Vec::new(),
            prefetch_filters: Vec::new(),
            seen: HashMap::new(),
            max_depth,
        }
    }

    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.max_depth = max_depth;
    }

    pub fn add_discoverer(&mut self, discoverer: Box<dyn Discoverer>) {
        self.discoverers.push(discoverer);
    }

    pub fn add_prefetch_filter(&mut self, filter: Box<dyn PrefetchFilter>) {
        self.prefetch_filters.push(filter);
    }

    /// Locators recorded as seen so far, the fetched units included.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Run the full discovery pipeline for one fetched resource.
    ///
    /// Admitted locators come back in discovery order; locators a pre-fetch
    /// filter dropped come back alongside them so the caller can report the
    /// rejection. The resource's own locator is recorded as seen whether or
    /// not anything is returned.
    pub fn discover(&mut self, resource: &Resource) -> DiscoveryOutcome {
        self.mark_seen(&resource.uri);

        if resource.uri.depth() >= self.max_depth {
            debug!(
                "not discovering from {} at max depth {}",
                resource.uri, self.max_depth
            );
            return DiscoveryOutcome::default();
        }

        let mut raw = Vec::new();
        for discoverer in &self.discoverers {
            raw.extend(discoverer.discover(resource));
        }

        // Canonical form, then in-batch dedup (first occurrence wins), then
        // drop locators recorded in earlier batches
        let mut batch_keys = HashSet::new();
        let candidates: Vec<DiscoveredUri> = raw
            .into_iter()
            .map(|uri| uri.normalized())
            .filter(|uri| batch_keys.insert(uri.seen_key()))
            .filter(|uri| !self.seen.contains_key(&uri.seen_key()))
            .collect();

        let mut outcome = DiscoveryOutcome::default();
        for uri in candidates {
            match self.prefetch_filters.iter().find(|f| f.matches(&uri)) {
                Some(filter) => {
                    debug!("{} dropped by {}", uri, filter.name());
                    outcome.rejected.push((uri, filter.name().to_string()));
                }
                None => outcome.admitted.push(uri),
            }
        }

        // Only survivors are marked; a rejected locator rediscovered later
        // is filtered and reported again
        for uri in &outcome.admitted {
            self.mark_seen(uri);
        }

        outcome
    }

    fn mark_seen(&mut self, uri: &DiscoveredUri) {
        self.seen.entry(uri.seen_key()).or_insert(uri.depth());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    struct FixedLinks(Vec<&'static str>);

    impl Discoverer for FixedLinks {
        fn discover(&self, resource: &Resource) -> Vec<DiscoveredUri> {
            self.0
                .iter()
                .filter_map(|raw| resource.final_url.join(raw).ok())
                .map(|url| resource.uri.child(url))
                .collect()
        }
    }

    struct DropPath(&'static str);

    impl PrefetchFilter for DropPath {
        fn matches(&self, uri: &DiscoveredUri) -> bool {
            uri.url().path() == self.0
        }

        fn name(&self) -> &'static str {
            "drop_path"
        }
    }

    fn page(path: &str, depth: u32) -> Resource {
        let url = Url::parse(&format!("http://example.com{path}")).unwrap();
        Resource::new(
            DiscoveredUri::new(url.clone(), depth),
            url,
            200,
            vec![],
            String::new(),
        )
    }

    fn paths(uris: &[DiscoveredUri]) -> Vec<&str> {
        uris.iter().map(|u| u.url().path()).collect()
    }

    #[test]
    fn children_are_stamped_one_level_deeper() {
        let mut set = DiscovererSet::new(3);
        set.add_discoverer(Box::new(FixedLinks(vec!["/a", "/b"])));

        let found = set.discover(&page("/", 1));
        assert_eq!(paths(&found.admitted), vec!["/a", "/b"]);
        assert!(found.admitted.iter().all(|u| u.depth() == 2));
    }

    #[test]
    fn max_depth_stops_discovery_not_fetching() {
        let mut set = DiscovererSet::new(2);
        set.add_discoverer(Box::new(FixedLinks(vec!["/a"])));

        assert!(!set.discover(&page("/shallow", 1)).admitted.is_empty());
        assert!(set.discover(&page("/deep", 2)).admitted.is_empty());
        // The unit at max depth was still recorded as seen
        assert_eq!(set.seen_count(), 3);
    }

    #[test]
    fn batch_duplicates_collapse_to_first_occurrence() {
        let mut set = DiscovererSet::new(3);
        set.add_discoverer(Box::new(FixedLinks(vec!["/a", "/b", "/a?"])));

        let found = set.discover(&page("/", 0));
        assert_eq!(paths(&found.admitted), vec!["/a", "/b"]);
    }

    #[test]
    fn earlier_sightings_win_across_batches() {
        let mut set = DiscovererSet::new(10);
        set.add_discoverer(Box::new(FixedLinks(vec!["/a", "/b"])));

        let first = set.discover(&page("/", 0));
        assert_eq!(paths(&first.admitted), vec!["/a", "/b"]);

        // The same links rediscovered deeper in the crawl stay dropped
        let second = set.discover(&page("/a", 1));
        assert!(second.admitted.is_empty());
    }

    #[test]
    fn first_sighting_fixes_the_recorded_depth() {
        let mut set = DiscovererSet::new(10);
        set.add_discoverer(Box::new(FixedLinks(vec!["/target"])));

        set.discover(&page("/", 0));
        // Rediscovery from a much deeper page changes nothing
        set.discover(&page("/elsewhere", 4));

        let key = DiscoveredUri::new(
            Url::parse("http://example.com/target").unwrap(),
            0,
        )
        .seen_key();
        assert_eq!(set.seen.get(&key), Some(&1));
    }

    #[test]
    fn rediscovered_fetched_unit_is_not_returned() {
        let mut set = DiscovererSet::new(10);
        set.add_discoverer(Box::new(FixedLinks(vec!["/", "/next"])));

        let found = set.discover(&page("/", 0));
        // The page linking back to itself does not requeue it
        assert_eq!(paths(&found.admitted), vec!["/next"]);
    }

    #[test]
    fn prefetch_filters_drop_before_marking() {
        let mut set = DiscovererSet::new(3);
        set.add_discoverer(Box::new(FixedLinks(vec!["/keep", "/drop"])));
        set.add_prefetch_filter(Box::new(DropPath("/drop")));

        let found = set.discover(&page("/", 0));
        assert_eq!(paths(&found.admitted), vec!["/keep"]);
        assert_eq!(found.rejected.len(), 1);
        assert_eq!(found.rejected[0].0.url().path(), "/drop");
        assert_eq!(found.rejected[0].1, "drop_path");
        // Only the fetched unit and the survivor were recorded
        assert_eq!(set.seen_count(), 2);
    }

    #[test]
    fn discoverers_run_in_registration_order() {
        let mut set = DiscovererSet::new(3);
        set.add_discoverer(Box::new(FixedLinks(vec!["/first"])));
        set.add_discoverer(Box::new(FixedLinks(vec!["/second"])));

        let found = set.discover(&page("/", 0));
        assert_eq!(paths(&found.admitted), vec!["/first", "/second"]);
    }
}
