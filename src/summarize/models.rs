//! Data models for the map-reduce pipeline

use super::token_counter::TokenCounter;

/// Raw page text for one input URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub url: String,
    pub text: String,
}

impl SourceUnit {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }
}

/// A per-page or merged summary
///
/// `token_count` is measured once when the document is built and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryDocument {
    content: String,
    token_count: usize,
}

impl SummaryDocument {
    /// Build a document, measuring its tokens with `counter`
    pub fn measured(content: impl Into<String>, counter: &dyn TokenCounter) -> Self {
        let content = content.into();
        let token_count = counter.count_tokens(&content);
        Self { content, token_count }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

/// Sum of the individually measured token counts.
///
/// The joined text is never re-tokenised.
pub fn aggregate_tokens(docs: &[SummaryDocument]) -> usize {
    docs.iter().map(SummaryDocument::token_count).sum()
}

/// Outcome of one map-reduce run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapReduceOutcome {
    pub summary: String,
    pub source_count: usize,
    /// Number of collapse iterations before the final reduce
    pub iterations: usize,
    /// Frontier size after the map phase and after every collapse iteration
    pub frontier_sizes: Vec<usize>,
    /// Reduce calls issued, including the final one
    pub reduce_calls: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarize::token_counter::WordCounter;

    #[test]
    fn test_measured_document() {
        let doc = SummaryDocument::measured("one two three", &WordCounter::new(1.0));
        assert_eq!(doc.token_count(), 3);
        assert_eq!(doc.content(), "one two three");
    }

    #[test]
    fn test_aggregate_is_sum_of_parts() {
        let counter = WordCounter::new(1.0);
        let docs = vec![
            SummaryDocument::measured("a b", &counter),
            SummaryDocument::measured("c d e", &counter),
        ];
        assert_eq!(aggregate_tokens(&docs), 5);
        assert_eq!(aggregate_tokens(&[]), 0);
    }
}
