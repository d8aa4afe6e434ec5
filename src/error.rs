//! Error types for the summarization pipeline

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SummarizeError>;

/// Failures that can abort a summarization request
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Malformed request input, reported to the client as-is
    #[error("{0}")]
    Validation(String),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Model invocation failed: {0}")]
    Model(String),

    #[error("Cannot reduce an empty list of summaries")]
    EmptyReduce,

    /// The collapse loop hit its iteration limit with the frontier still over budget
    #[error("Summaries did not converge under the token budget: {tokens} tokens > {budget} after {iterations} iterations")]
    BudgetNotConvergent {
        iterations: usize,
        tokens: usize,
        budget: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SummarizeError {
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the failure was caused by the caller rather than a collaborator
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Fetch { .. } => "fetch",
            Self::Model(_) => "model",
            Self::EmptyReduce => "empty_reduce",
            Self::BudgetNotConvergent { .. } => "not_convergent",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<config::ConfigError> for SummarizeError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
