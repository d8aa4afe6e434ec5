//! Map-reduce controller
//!
//! Runs one summarization request in three phases:
//!
//! 1. **Map**: fetch and summarize every URL concurrently, keeping input order.
//! 2. **Collapse**: while the frontier's aggregate token count is over budget,
//!    pack it into consecutive batches that fit the budget and reduce each
//!    batch concurrently into one document.
//! 3. **Final reduce**: merge whatever frontier remains with one last call.
//!
//! Every fan-out shares one semaphore so the number of in-flight collaborator
//! calls is bounded across all requests. Any failure aborts the request.

use super::models::{aggregate_tokens, MapReduceOutcome, SummaryDocument};
use super::reducer::SummaryReducer;
use super::summarizer::DocumentSummarizer;
use super::token_budget::TokenBudget;
use crate::error::{Result, SummarizeError};
use crate::fetch::ContentFetcher;
use crate::metrics::METRICS;
use futures::future::try_join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Limits applied to every run
#[derive(Debug, Clone, Copy)]
pub struct ControllerLimits {
    pub budget: TokenBudget,
    pub max_collapse_iterations: usize,
    pub max_in_flight: usize,
}

/// Orchestrates fetch, map, collapse and final reduce
pub struct MapReduceController {
    fetcher: Arc<dyn ContentFetcher>,
    summarizer: DocumentSummarizer,
    reducer: SummaryReducer,
    budget: TokenBudget,
    max_collapse_iterations: usize,
    permits: Arc<Semaphore>,
}

impl MapReduceController {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        summarizer: DocumentSummarizer,
        reducer: SummaryReducer,
        limits: ControllerLimits,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            reducer,
            budget: limits.budget,
            max_collapse_iterations: limits.max_collapse_iterations,
            permits: Arc::new(Semaphore::new(limits.max_in_flight.max(1))),
        }
    }

    /// Summarize the pages behind `urls` into a single summary
    pub async fn run(&self, urls: &[String]) -> Result<MapReduceOutcome> {
        if urls.is_empty() {
            info!("No URLs given, returning an empty summary");
            return Ok(MapReduceOutcome {
                summary: String::new(),
                source_count: 0,
                iterations: 0,
                frontier_sizes: vec![0],
                reduce_calls: 0,
            });
        }

        let mut frontier = self.map(urls).await?;
        let mut frontier_sizes = vec![frontier.len()];
        let mut reduce_calls = 0;
        let mut iterations = 0;
        let mut total = aggregate_tokens(&frontier);

        info!(
            documents = frontier.len(),
            tokens = total,
            budget = self.budget.max_tokens(),
            "Map phase complete"
        );

        while !self.budget.fits(total) {
            if iterations == self.max_collapse_iterations {
                METRICS.budget_not_convergent.inc();
                warn!(iterations, tokens = total, "Collapse loop did not converge");
                return Err(SummarizeError::BudgetNotConvergent {
                    iterations,
                    tokens: total,
                    budget: self.budget.max_tokens(),
                });
            }

            let (next, calls) = self.collapse(&frontier).await?;
            iterations += 1;
            reduce_calls += calls;
            frontier = next;
            total = aggregate_tokens(&frontier);
            frontier_sizes.push(frontier.len());

            info!(
                iteration = iterations,
                documents = frontier.len(),
                tokens = total,
                "Collapse iteration complete"
            );
        }

        METRICS.collapse_iterations.observe(iterations as f64);

        let summary = self.reduce_with_permit(&frontier).await?;
        reduce_calls += 1;

        info!(
            sources = urls.len(),
            iterations,
            reduce_calls,
            tokens = summary.token_count(),
            "Final summary produced"
        );

        Ok(MapReduceOutcome {
            summary: summary.into_content(),
            source_count: urls.len(),
            iterations,
            frontier_sizes,
            reduce_calls,
        })
    }

    /// Fetch and summarize every URL; results keep the order of `urls`
    async fn map(&self, urls: &[String]) -> Result<Vec<SummaryDocument>> {
        debug!(count = urls.len(), "Starting map phase");

        try_join_all(urls.iter().map(|url| async move {
            let _permit = self.acquire().await?;
            let source = self.fetcher.fetch(url).await?;
            self.summarizer.summarize(&source).await
        }))
        .await
    }

    /// One collapse step: returns the new frontier and the reduce calls made
    async fn collapse(&self, frontier: &[SummaryDocument]) -> Result<(Vec<SummaryDocument>, usize)> {
        let batches = self.budget.partition(frontier);
        debug!(
            documents = frontier.len(),
            batches = batches.len(),
            "Partitioned frontier"
        );

        let calls = batches.len();
        let next = try_join_all(
            batches
                .into_iter()
                .map(|range| self.reduce_with_permit(&frontier[range])),
        )
        .await?;

        Ok((next, calls))
    }

    async fn reduce_with_permit(&self, batch: &[SummaryDocument]) -> Result<SummaryDocument> {
        let _permit = self.acquire().await?;
        self.reducer.reduce(batch).await
    }

    async fn acquire(&self) -> Result<tokio::sync::SemaphorePermit<'_>> {
        self.permits
            .acquire()
            .await
            .map_err(|e| SummarizeError::Internal(e.to_string()))
    }
}
