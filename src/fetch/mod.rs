//! Fetching of crawl units
//!
//! The pieces that turn a queued locator into a persisted resource:
//! - `RequestHandler` / `HttpFetcher`: one synchronous fetch
//! - `Resource`: the fetched unit, with a lazily parsed document
//! - `Downloader`: the announce/fetch/filter/persist pipeline

pub mod client;
pub mod downloader;
pub mod resource;

pub use client::{FetchError, HttpFetcher, RequestHandler};
pub use downloader::{DownloadOutcome, Downloader};
pub use resource::Resource;
