//! Page content retrieval

pub mod html;
pub mod http;

pub use http::{HttpFetcher, HttpFetcherConfig};

use crate::error::Result;
use crate::summarize::SourceUnit;
use async_trait::async_trait;

/// Retrieves the readable text behind a URL
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<SourceUnit>;
}
