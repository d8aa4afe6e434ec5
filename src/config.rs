//! Service configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file
//! (`SUMMARIZER_CONFIG`, default `config.toml`), then `SUMMARIZER__SECTION__KEY`
//! environment variables, and finally the plain variables the service has
//! always honoured (`PORT`, `CORS_ORIGIN`, `GEMINI_API_KEY`).

use crate::error::{Result, SummarizeError};
use crate::summarize::prompts::{MAP_PLACEHOLDER, MAP_TEMPLATE, REDUCE_PLACEHOLDER, REDUCE_TEMPLATE};
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
    #[serde(default)]
    pub prompts: PromptConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// `*` for any origin, otherwise a comma separated allow-list
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Language model provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible chat completions endpoint
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub api_key: Option<SecretString>,
}

/// Page fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Which tokenizer measures summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterKind {
    #[default]
    Tiktoken,
    Words,
}

/// Token budget configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_max_iterations")]
    pub max_collapse_iterations: usize,

    #[serde(default)]
    pub counter: CounterKind,
}

/// Fan-out limits shared by the map and collapse phases
#[derive(Debug, Clone, Deserialize)]
pub struct ConcurrencyConfig {
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

/// Instruction templates for the map and reduce calls
#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_map_prompt")]
    pub map: String,

    #[serde(default = "default_reduce_prompt")]
    pub reduce: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }
fn default_cors_origins() -> String { "*".to_string() }
fn default_max_body_bytes() -> usize { 1024 * 1024 }
fn default_llm_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions".to_string()
}
fn default_llm_model() -> String { "gemini-1.5-flash".to_string() }
fn default_llm_timeout() -> u64 { 60 }
fn default_fetch_timeout() -> u64 { 30 }
fn default_user_agent() -> String { concat!("mapreduce-summarizer/", env!("CARGO_PKG_VERSION")).to_string() }
fn default_max_tokens() -> usize { 1000 }
fn default_max_iterations() -> usize { 16 }
fn default_max_in_flight() -> usize { 8 }
fn default_map_prompt() -> String { MAP_TEMPLATE.to_string() }
fn default_reduce_prompt() -> String { REDUCE_TEMPLATE.to_string() }
fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            temperature: 0.0,
            timeout_secs: default_llm_timeout(),
            api_key: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            max_collapse_iterations: default_max_iterations(),
            counter: CounterKind::default(),
        }
    }
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            map: default_map_prompt(),
            reduce: default_reduce_prompt(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from defaults, file and environment
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let path = std::env::var("SUMMARIZER_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        let config = Self::from_file(&path)?.from_env();
        config.validate()?;
        Ok(config)
    }

    /// Read an optional TOML file layered under `SUMMARIZER__*` variables
    pub fn from_file(path: &str) -> Result<Self> {
        debug!(path = %path, "Loading configuration");
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("SUMMARIZER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Apply the unprefixed process environment variables
    pub fn from_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }

        if let Some(val) = lookup("CORS_ORIGIN") {
            self.server.cors_origins = val;
        }

        if let Some(val) = lookup("GEMINI_API_KEY").or_else(|| lookup("LLM_API_KEY")) {
            self.llm.api_key = Some(SecretString::new(val));
        }

        self
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.budget.max_tokens == 0 {
            return Err(SummarizeError::Config("budget.max_tokens must be positive".to_string()));
        }
        if self.budget.max_collapse_iterations == 0 {
            return Err(SummarizeError::Config(
                "budget.max_collapse_iterations must be positive".to_string(),
            ));
        }
        if self.concurrency.max_in_flight == 0 {
            return Err(SummarizeError::Config(
                "concurrency.max_in_flight must be positive".to_string(),
            ));
        }
        if !self.prompts.map.contains(MAP_PLACEHOLDER) {
            return Err(SummarizeError::Config(format!(
                "prompts.map must contain {}",
                MAP_PLACEHOLDER
            )));
        }
        if !self.prompts.reduce.contains(REDUCE_PLACEHOLDER) {
            return Err(SummarizeError::Config(format!(
                "prompts.reduce must contain {}",
                REDUCE_PLACEHOLDER
            )));
        }
        Ok(())
    }
}
