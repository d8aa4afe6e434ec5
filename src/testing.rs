//! Testing utilities including mock implementations.
//!
//! These let the pipeline run end to end without network access or a real
//! language model.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{Result, SummarizeError};
use crate::fetch::ContentFetcher;
use crate::llm::LanguageModel;
use crate::summarize::SourceUnit;

type Handler = dyn Fn(&str) -> Result<String> + Send + Sync;

/// Record of a call made to the mock model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCall {
    pub prompt: String,
}

/// A mock language model with a configurable response function.
///
/// Tracks every prompt it receives and the peak number of overlapping calls.
pub struct MockModel {
    handler: Arc<Handler>,
    delay: Option<Duration>,
    prompt_delays: Vec<(String, Duration)>,
    calls: Arc<RwLock<Vec<ModelCall>>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockModel {
    /// A model that always answers `"summary"`
    pub fn new() -> Self {
        Self {
            handler: Arc::new(|_| Ok("summary".to_string())),
            delay: None,
            prompt_delays: Vec::new(),
            calls: Arc::new(RwLock::new(Vec::new())),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Answer every prompt with `response`
    pub fn with_response(self, response: impl Into<String>) -> Self {
        let response = response.into();
        self.with_handler(move |_| Ok(response.clone()))
    }

    /// Fail every call with a model error carrying `message`
    pub fn failing(self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.with_handler(move |_| Err(SummarizeError::Model(message.clone())))
    }

    /// Answer with the first `ceil(words * factor)` words of the prompt.
    ///
    /// With templates that are just the placeholder, every call shrinks its
    /// input by `factor`.
    pub fn shrinking(self, factor: f64) -> Self {
        self.with_handler(move |prompt| {
            let words: Vec<&str> = prompt.split_whitespace().collect();
            let keep = ((words.len() as f64) * factor).ceil() as usize;
            Ok(words[..keep.min(words.len())].join(" "))
        })
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        self.handler = Arc::new(handler);
        self
    }

    /// Sleep before answering so concurrent calls overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep for `delay` on prompts containing `needle`, overriding
    /// `with_delay`
    pub fn with_delay_on(mut self, needle: impl Into<String>, delay: Duration) -> Self {
        self.prompt_delays.push((needle.into(), delay));
        self
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        self.calls.write().unwrap().push(ModelCall {
            prompt: prompt.to_string(),
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .prompt_delays
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, delay)| *delay)
            .or(self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let result = (self.handler)(prompt);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// A mock fetcher serving predefined page text by URL.
///
/// Unknown URLs fail with a fetch error.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    fetched: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.pages.insert(url.into(), text.into());
        self
    }

    /// Delay the response for one URL
    pub fn with_delay(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(url.into(), delay);
        self
    }

    /// URLs in the order their fetches completed
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.read().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<SourceUnit> {
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }

        let text = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| SummarizeError::fetch(url, "HTTP 404 Not Found"))?;

        self.fetched.write().unwrap().push(url.to_string());
        Ok(SourceUnit::new(url, text))
    }
}

/// `n` space separated words, `w0 w1 ...`, with a distinguishing prefix
pub fn words(prefix: &str, n: usize) -> String {
    (0..n)
        .map(|i| format!("{}{}", prefix, i))
        .collect::<Vec<_>>()
        .join(" ")
}
