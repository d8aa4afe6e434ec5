use anyhow::Context;
use mapreduce_summarizer::{
    api::{build_router, AppState},
    fetch::{HttpFetcher, HttpFetcherConfig},
    llm::{ChatCompletionModel, ChatModelConfig},
    summarize::{build_controller, token_counter::counter_for},
    telemetry, Config,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    telemetry::init(&config.logging);

    let model = Arc::new(ChatCompletionModel::new(ChatModelConfig::from(&config.llm))?);
    let fetcher = Arc::new(HttpFetcher::new(HttpFetcherConfig::from(&config.fetch))?);
    let counter = counter_for(config.budget.counter)?;

    info!(
        model = %model.model(),
        budget = config.budget.max_tokens,
        max_in_flight = config.concurrency.max_in_flight,
        "Starting summarizer"
    );

    let controller = build_controller(&config, model, fetcher, counter)?;
    let state = AppState {
        controller: Arc::new(controller),
    };
    let router = build_router(state, &config.server)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on {}", addr);
    axum::serve(listener, router).await?;

    Ok(())
}
