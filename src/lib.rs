//! Map-reduce summarization of web pages
//!
//! Given a list of URLs, every page is summarized on its own and the
//! summaries are then merged in token-budgeted batches until a single
//! summary remains. The pipeline is exposed over HTTP as `POST /summarizer`.

pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod llm;
pub mod metrics;
pub mod summarize;
pub mod telemetry;
pub mod testing;

pub use config::Config;
pub use error::{Result, SummarizeError};
pub use summarize::{MapReduceController, MapReduceOutcome};
