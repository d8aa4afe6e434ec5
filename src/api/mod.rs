//! HTTP API for the summarization service

pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::AppState;
pub use models::{ApiError, SummaryResponse};
pub use routes::build_router;
