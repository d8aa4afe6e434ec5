//! HTTP page fetcher

use super::html::html_to_text;
use super::ContentFetcher;
use crate::config::FetchConfig;
use crate::error::{Result, SummarizeError};
use crate::metrics::METRICS;
use crate::summarize::SourceUnit;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Configuration for the HTTP fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl From<&FetchConfig> for HttpFetcherConfig {
    fn from(config: &FetchConfig) -> Self {
        Self {
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

/// Fetches pages over HTTP(S) and reduces HTML to its visible text
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: HttpFetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| SummarizeError::Internal(e.to_string()))?;

        Ok(Self { client })
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).map_err(|e| SummarizeError::fetch(url, format!("invalid URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SummarizeError::fetch(
                url,
                format!("unsupported scheme: {}", parsed.scheme()),
            ));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| SummarizeError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SummarizeError::fetch(url, format!("HTTP {}", status)));
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("html"))
            .unwrap_or(true);

        let body = response.text().await.map_err(|e| SummarizeError::fetch(url, e))?;

        Ok(if is_html { html_to_text(&body) } else { body })
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<SourceUnit> {
        debug!(url = %url, "Fetching page");

        match self.fetch_text(url).await {
            Ok(text) => {
                METRICS.record_fetch(true);
                debug!(url = %url, chars = text.len(), "Fetched page");
                Ok(SourceUnit::new(url, text))
            }
            Err(e) => {
                METRICS.record_fetch(false);
                warn!(url = %url, error = %e, "Page fetch failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(HttpFetcherConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/article")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html><body><h1>News</h1><p>Something happened.</p></body></html>")
            .create_async()
            .await;

        let url = format!("{}/article", server.url());
        let unit = fetcher().fetch(&url).await.unwrap();

        assert_eq!(unit.url, url);
        assert_eq!(unit.text, "News\nSomething happened.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_plain_text_untouched() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/notes.txt")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("a <b> c")
            .create_async()
            .await;

        let unit = fetcher().fetch(&format!("{}/notes.txt", server.url())).await.unwrap();
        assert_eq!(unit.text, "a <b> c");
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let err = fetcher()
            .fetch(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, SummarizeError::Fetch { ref reason, .. } if reason.contains("404")));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let err = fetcher().fetch("not a url").await.unwrap_err();
        assert!(matches!(err, SummarizeError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let err = fetcher().fetch("ftp://example.com/file").await.unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }
}
