//! Post-fetch resource filters
//!
//! These run in the download pipeline, after a successful fetch and before
//! persistence.

use chrono::{DateTime, Duration, Utc};

use super::PostfetchFilter;
use crate::fetch::Resource;

/// Rejects resources whose `Last-Modified` header shows them older than the
/// allowed age.
///
/// Resources without the header, or with a value that does not parse as an
/// RFC 2822 date, pass.
#[derive(Debug, Clone)]
pub struct MustBeFresh {
    max_age: Duration,
}

impl MustBeFresh {
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    pub fn from_secs(max_age_secs: i64) -> Self {
        Self::new(Duration::seconds(max_age_secs))
    }

    fn is_stale(&self, last_modified: &str, now: DateTime<Utc>) -> bool {
        match DateTime::parse_from_rfc2822(last_modified) {
            Ok(modified) => now.signed_duration_since(modified) > self.max_age,
            Err(_) => false,
        }
    }
}

impl PostfetchFilter for MustBeFresh {
    fn matches(&self, resource: &Resource) -> bool {
        resource
            .header("last-modified")
            .map(|value| self.is_stale(value, Utc::now()))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "must_be_fresh"
    }
}
