//! Language model access
//!
//! The pipeline only needs single-turn, stateless completions, so the seam is
//! one method: prompt text in, response text out.

pub mod chat;

pub use chat::{ChatCompletionModel, ChatModelConfig};

use crate::error::Result;
use async_trait::async_trait;

/// A language model that answers one prompt at a time
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send `prompt` as a single user turn and return the model's text
    async fn invoke(&self, prompt: &str) -> Result<String>;
}
