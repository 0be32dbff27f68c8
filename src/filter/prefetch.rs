//! Pre-fetch locator filters
//!
//! These run after deduplication in the discovery pipeline. Anything they
//! drop never reaches the queue.

use std::collections::HashSet;

use url::Url;

use super::PrefetchFilter;
use crate::uri::{normalize, DiscoveredUri};

/// Drops locators whose host is not on the allow-list.
///
/// With `allow_subdomains`, `docs.example.com` passes an allow-list entry
/// of `example.com`.
#[derive(Debug, Clone)]
pub struct AllowedHosts {
    hosts: HashSet<String>,
    allow_subdomains: bool,
}

impl AllowedHosts {
    pub fn new(hosts: Vec<String>, allow_subdomains: bool) -> Self {
        Self {
            hosts: hosts.into_iter().map(|h| h.to_lowercase()).collect(),
            allow_subdomains,
        }
    }
}

impl PrefetchFilter for AllowedHosts {
    fn matches(&self, uri: &DiscoveredUri) -> bool {
        let Some(host) = uri.url().host_str() else {
            return true;
        };
        let host = host.to_lowercase();
        if self.hosts.contains(&host) {
            return false;
        }
        if self.allow_subdomains {
            let is_subdomain = self
                .hosts
                .iter()
                .any(|allowed| host.ends_with(&format!(".{allowed}")));
            return !is_subdomain;
        }
        true
    }

    fn name(&self) -> &'static str {
        "allowed_hosts"
    }
}

/// Drops locators whose scheme is not on the allow-list.
#[derive(Debug, Clone)]
pub struct AllowedSchemes {
    schemes: Vec<String>,
}

impl AllowedSchemes {
    pub fn new(schemes: Vec<String>) -> Self {
        Self {
            schemes: schemes.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }
}

impl PrefetchFilter for AllowedSchemes {
    fn matches(&self, uri: &DiscoveredUri) -> bool {
        !self.schemes.iter().any(|s| s == uri.url().scheme())
    }

    fn name(&self) -> &'static str {
        "allowed_schemes"
    }
}

/// Drops locators whose effective port (explicit, or the scheme default) is
/// not on the allow-list. Locators with no determinable port are dropped.
#[derive(Debug, Clone)]
pub struct AllowedPorts {
    ports: Vec<u16>,
}

impl AllowedPorts {
    pub fn new(ports: Vec<u16>) -> Self {
        Self { ports }
    }
}

impl PrefetchFilter for AllowedPorts {
    fn matches(&self, uri: &DiscoveredUri) -> bool {
        match uri.url().port_or_known_default() {
            Some(port) => !self.ports.contains(&port),
            None => true,
        }
    }

    fn name(&self) -> &'static str {
        "allowed_ports"
    }
}

/// Drops locators that do not live under the seed's URL prefix.
#[derive(Debug, Clone)]
pub struct RestrictToBase {
    base: Url,
}

impl RestrictToBase {
    pub fn new(base: &Url) -> Self {
        Self {
            base: normalize(base),
        }
    }
}

impl PrefetchFilter for RestrictToBase {
    fn matches(&self, uri: &DiscoveredUri) -> bool {
        !uri.url().as_str().starts_with(self.base.as_str())
    }

    fn name(&self) -> &'static str {
        "restrict_to_base"
    }
}

/// Drops locators carrying a fragment.
#[derive(Debug, Clone, Default)]
pub struct UriWithHash;

impl PrefetchFilter for UriWithHash {
    fn matches(&self, uri: &DiscoveredUri) -> bool {
        uri.url().fragment().is_some()
    }

    fn name(&self) -> &'static str {
        "uri_with_hash"
    }
}

/// Drops locators carrying a query string.
#[derive(Debug, Clone, Default)]
pub struct UriWithQuery;

impl PrefetchFilter for UriWithQuery {
    fn matches(&self, uri: &DiscoveredUri) -> bool {
        uri.url().query().is_some()
    }

    fn name(&self) -> &'static str {
        "uri_with_query"
    }
}
