//! Token budget enforcement for the collapse loop
//!
//! The budget caps the aggregate token count of any batch handed to a single
//! reduce call. Batches are formed by greedy left-to-right packing over the
//! frontier, so every batch is a contiguous, ordered run of documents.

use super::models::SummaryDocument;
use crate::error::{Result, SummarizeError};
use std::ops::Range;

/// Maximum aggregate tokens a batch may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    max_tokens: usize,
}

impl TokenBudget {
    pub fn new(max_tokens: usize) -> Result<Self> {
        if max_tokens == 0 {
            return Err(SummarizeError::Config("Token budget must be positive".to_string()));
        }
        Ok(Self { max_tokens })
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Check if a token total fits within the budget
    pub fn fits(&self, tokens: usize) -> bool {
        tokens <= self.max_tokens
    }

    /// Split `docs` into consecutive batches that each fit the budget.
    ///
    /// A document that is over budget on its own always gets a batch to
    /// itself. The returned ranges cover `0..docs.len()` exactly once, in
    /// order.
    pub fn partition(&self, docs: &[SummaryDocument]) -> Vec<Range<usize>> {
        let mut batches = Vec::new();
        let mut start = 0;
        let mut running = 0;

        for (i, doc) in docs.iter().enumerate() {
            let tokens = doc.token_count();

            if !self.fits(tokens) {
                if start < i {
                    batches.push(start..i);
                }
                batches.push(i..i + 1);
                start = i + 1;
                running = 0;
                continue;
            }

            if start < i && !self.fits(running + tokens) {
                batches.push(start..i);
                start = i;
                running = 0;
            }
            running += tokens;
        }

        if start < docs.len() {
            batches.push(start..docs.len());
        }

        batches
    }
}
