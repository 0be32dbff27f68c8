//! Locator and resource filters
//!
//! Pre-fetch filters drop locators inside the discovery pipeline, before
//! they reach the queue; a drop there is silent apart from debug logging.
//! Post-fetch filters reject resources that were already fetched, before
//! they are persisted; a rejection there is announced and lands in the
//! filtered bucket of the crawl report under the filter's name.
//!
//! Filters are pure predicates over their input and hold no engine state.
//! The first matching filter wins, in registration order.

mod postfetch;
mod prefetch;

pub use postfetch::MustBeFresh;
pub use prefetch::{
    AllowedHosts, AllowedPorts, AllowedSchemes, RestrictToBase, UriWithHash, UriWithQuery,
};

use crate::fetch::Resource;
use crate::uri::DiscoveredUri;

/// Decides whether a locator is dropped before it is ever fetched.
pub trait PrefetchFilter {
    /// True drops the locator.
    fn matches(&self, uri: &DiscoveredUri) -> bool;

    /// Short label used in logs. Bundled filters override this.
    fn name(&self) -> &'static str {
        "prefetch"
    }
}

/// Decides whether a fetched resource is rejected before persistence.
pub trait PostfetchFilter {
    /// True rejects the resource.
    fn matches(&self, resource: &Resource) -> bool;

    /// Short label used in logs and the filtered bucket. Bundled filters
    /// override this.
    fn name(&self) -> &'static str {
        "postfetch"
    }
}
