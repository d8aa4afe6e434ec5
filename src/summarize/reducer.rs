//! Reduce step: many summaries in, one merged summary out

use super::models::SummaryDocument;
use super::prompts::PromptTemplate;
use super::token_counter::TokenCounter;
use crate::error::{Result, SummarizeError};
use crate::llm::LanguageModel;
use crate::metrics::METRICS;
use std::sync::Arc;
use tracing::debug;

/// Separator placed between summaries before merging
pub const PARAGRAPH_BREAK: &str = "\n\n";

/// Merges an ordered batch of summaries with the reduce template
pub struct SummaryReducer {
    model: Arc<dyn LanguageModel>,
    counter: Arc<dyn TokenCounter>,
    template: PromptTemplate,
}

impl SummaryReducer {
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

    /// Merge `docs` in order with exactly one model call.
    ///
    /// A single document is still sent to the model.
    pub async fn reduce(&self, docs: &[SummaryDocument]) -> Result<SummaryDocument> {
        if docs.is_empty() {
            return Err(SummarizeError::EmptyReduce);
        }

        let joined = docs
            .iter()
            .map(SummaryDocument::content)
            .collect::<Vec<_>>()
            .join(PARAGRAPH_BREAK);
        let prompt = self.template.render(&joined);

        METRICS.record_model_call("reduce");
        let response = self.model.invoke(&prompt).await?;
        let merged = SummaryDocument::measured(response, self.counter.as_ref());

        debug!(
            inputs = docs.len(),
            input_tokens = super::models::aggregate_tokens(docs),
            output_tokens = merged.token_count(),
            "Reduced batch"
        );
        Ok(merged)
    }
}
