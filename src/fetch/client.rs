//! HTTP request handling
//!
//! The engine fetches through the `RequestHandler` trait, one synchronous
//! call on the crawling thread. `HttpFetcher` is the production handler, a
//! thin layer over a blocking reqwest client; tests substitute scripted
//! handlers.

use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::redirect;
use thiserror::Error;
use tracing::debug;

use crate::config::FetchConfig;
use crate::fetch::resource::Resource;
use crate::uri::DiscoveredUri;

/// Errors that can occur during fetching
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status code {0}")]
    StatusCode(u16),
    #[error("content too large: {size} bytes (limit {max})")]
    TooLarge { size: usize, max: usize },
}

/// Fetches one locator and produces the resource for it.
pub trait RequestHandler {
    fn fetch(&mut self, uri: &DiscoveredUri) -> Result<Resource, FetchError>;
}

/// Production handler over a blocking HTTP client.
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    max_content_size: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(redirect::Policy::limited(config.max_redirects))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            max_content_size: config.max_content_size,
        })
    }
}

impl RequestHandler for HttpFetcher {
    fn fetch(&mut self, uri: &DiscoveredUri) -> Result<Resource, FetchError> {
        let start = Instant::now();

        let response = self.client.get(uri.url().as_str()).send()?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(FetchError::StatusCode(status.as_u16()));
        }

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();

        if let Some(len) = response.content_length() {
            if len as usize > self.max_content_size {
                return Err(FetchError::TooLarge {
                    size: len as usize,
                    max: self.max_content_size,
                });
            }
        }

        let body = response.text()?;
        if body.len() > self.max_content_size {
            return Err(FetchError::TooLarge {
                size: body.len(),
                max: self.max_content_size,
            });
        }

        debug!(
            "fetched {} ({} bytes, {:?})",
            final_url,
            body.len(),
            start.elapsed()
        );

        let mut resource = Resource::new(uri.clone(), final_url, status.as_u16(), headers, body);
        resource.fetch_duration = start.elapsed();
        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_default_config() {
        let fetcher = HttpFetcher::new(&FetchConfig::default());
        assert!(fetcher.is_ok());
    }

    #[test]
    fn error_messages_name_the_limit() {
        let err = FetchError::TooLarge {
            size: 2048,
            max: 1024,
        };
        assert_eq!(err.to_string(), "content too large: 2048 bytes (limit 1024)");
        assert_eq!(
            FetchError::StatusCode(404).to_string(),
            "unexpected status code 404"
        );
    }
}
