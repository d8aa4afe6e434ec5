//! Token counting using tiktoken

use crate::config::CounterKind;
use crate::error::{Result, SummarizeError};
use std::sync::Arc;
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Token counter trait for different tokenization strategies
pub trait TokenCounter: Send + Sync {
    /// Count the tokens in the given text
    fn count_tokens(&self, text: &str) -> usize;
}

/// Tiktoken-based counter using cl100k_base
pub struct TiktokenCounter {
    bpe: Arc<CoreBPE>,
}

impl TiktokenCounter {
    pub fn new() -> Result<Self> {
        let bpe = cl100k_base().map_err(|e| SummarizeError::Internal(format!("Failed to initialize tiktoken: {}", e)))?;
        Ok(Self { bpe: Arc::new(bpe) })
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// Word-based counter (~1.3 tokens per word)
pub struct WordCounter {
    tokens_per_word: f64,
}

impl WordCounter {
    pub fn new(tokens_per_word: f64) -> Self {
        Self { tokens_per_word }
    }
}

impl Default for WordCounter {
    fn default() -> Self {
        Self::new(1.3)
    }
}

impl TokenCounter for WordCounter {
    fn count_tokens(&self, text: &str) -> usize {
        let word_count = text.split_whitespace().count();
        (word_count as f64 * self.tokens_per_word).ceil() as usize
    }
}

/// Build the counter selected in configuration
pub fn counter_for(kind: CounterKind) -> Result<Arc<dyn TokenCounter>> {
    Ok(match kind {
        CounterKind::Tiktoken => Arc::new(TiktokenCounter::new()?),
        CounterKind::Words => Arc::new(WordCounter::default()),
    })
}
