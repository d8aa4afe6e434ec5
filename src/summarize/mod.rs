//! Map-reduce summarization under a token budget
//!
//! Pages are summarized one by one, then summaries are merged in
//! budget-sized batches until the whole set fits the budget, and finally
//! merged once more into a single summary.

pub mod controller;
pub mod models;
pub mod prompts;
pub mod reducer;
pub mod summarizer;
pub mod token_budget;
pub mod token_counter;

pub use controller::{ControllerLimits, MapReduceController};
pub use models::{aggregate_tokens, MapReduceOutcome, SourceUnit, SummaryDocument};
pub use prompts::PromptTemplate;
pub use reducer::SummaryReducer;
pub use summarizer::DocumentSummarizer;
pub use token_budget::TokenBudget;
pub use token_counter::{TiktokenCounter, TokenCounter, WordCounter};

use crate::config::Config;
use crate::error::Result;
use crate::fetch::ContentFetcher;
use crate::llm::LanguageModel;
use std::sync::Arc;

/// Wire a controller from configuration and injected collaborators
pub fn build_controller(
    config: &Config,
    model: Arc<dyn LanguageModel>,
    fetcher: Arc<dyn ContentFetcher>,
    counter: Arc<dyn TokenCounter>,
) -> Result<MapReduceController> {
    let map_template = PromptTemplate::new(config.prompts.map.clone(), prompts::MAP_PLACEHOLDER)?;
    let reduce_template = PromptTemplate::new(config.prompts.reduce.clone(), prompts::REDUCE_PLACEHOLDER)?;

    let limits = ControllerLimits {
        budget: TokenBudget::new(config.budget.max_tokens)?,
        max_collapse_iterations: config.budget.max_collapse_iterations,
        max_in_flight: config.concurrency.max_in_flight,
    };

    Ok(MapReduceController::new(
        fetcher,
        DocumentSummarizer::new(model.clone(), counter.clone(), map_template),
        SummaryReducer::new(model, counter, reduce_template),
        limits,
    ))
}
