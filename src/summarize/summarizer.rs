//! Map step: one page of text in, one summary out

use super::models::{SourceUnit, SummaryDocument};
use super::prompts::PromptTemplate;
use super::token_counter::TokenCounter;
use crate::error::Result;
use crate::llm::LanguageModel;
use crate::metrics::METRICS;
use std::sync::Arc;
use tracing::debug;

/// Summarizes a single source with the map template
pub struct DocumentSummarizer {
    model: Arc<dyn LanguageModel>,
    counter: Arc<dyn TokenCounter>,
    template: PromptTemplate,
}

impl DocumentSummarizer {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        counter: Arc<dyn TokenCounter>,
        template: PromptTemplate,
    ) -> Self {
        Self {
            model,
            counter,
            template,
        }
    }

    /// Summarize `source` with exactly one model call.
    ///
    /// The text is not truncated; keeping costs bounded is the collapse
    /// loop's job.
    pub async fn summarize(&self, source: &SourceUnit) -> Result<SummaryDocument> {
        let prompt = self.template.render(&source.text);
        METRICS.record_model_call("map");
        let response = self.model.invoke(&prompt).await?;
        let doc = SummaryDocument::measured(response, self.counter.as_ref());

        debug!(url = %source.url, tokens = doc.token_count(), "Summarized source");
        Ok(doc)
    }
}
