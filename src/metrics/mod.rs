//! Metrics collection for observability

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_with_registry, Counter, CounterVec, Histogram, Opts, Registry,
};
use std::sync::Arc;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Request metrics
    pub requests: CounterVec,
    pub request_duration: Histogram,

    // Collaborator metrics
    pub fetches: CounterVec,
    pub model_calls: CounterVec,
    pub model_call_duration: Histogram,

    // Collapse loop metrics
    pub collapse_iterations: Histogram,
    pub budget_not_convergent: Counter,
}

impl Metrics {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = register_counter_vec_with_registry!(
            Opts::new("summarizer_requests_total", "Total summarization requests"),
            &["status"],
            registry
        )?;

        let request_duration = register_histogram_with_registry!(
            "summarizer_request_duration_seconds",
            "Summarization request duration in seconds",
            vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0],
            registry
        )?;

        let fetches = register_counter_vec_with_registry!(
            Opts::new("summarizer_fetches_total", "Total page fetches"),
            &["status"],
            registry
        )?;

        let model_calls = register_counter_vec_with_registry!(
            Opts::new("summarizer_model_calls_total", "Total model invocations"),
            &["kind"],
            registry
        )?;

        let model_call_duration = register_histogram_with_registry!(
            "summarizer_model_call_duration_seconds",
            "Model invocation duration in seconds",
            registry
        )?;

        let collapse_iterations = register_histogram_with_registry!(
            "summarizer_collapse_iterations",
            "Collapse iterations per request",
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 6.0, 8.0, 12.0, 16.0],
            registry
        )?;

        let budget_not_convergent = register_counter_with_registry!(
            Opts::new(
                "summarizer_budget_not_convergent_total",
                "Requests aborted because summaries never fit the token budget"
            ),
            registry
        )?;

        Ok(Self {
            registry,
            requests,
            request_duration,
            fetches,
            model_calls,
            model_call_duration,
            collapse_iterations,
            budget_not_convergent,
        })
    }

    /// Record a finished request
    pub fn record_request(&self, success: bool, seconds: f64) {
        let status = if success { "success" } else { "error" };
        self.requests.with_label_values(&[status]).inc();
        self.request_duration.observe(seconds);
    }

    /// Record a page fetch
    pub fn record_fetch(&self, success: bool) {
        let status = if success { "success" } else { "error" };
        self.fetches.with_label_values(&[status]).inc();
    }

    /// Record a model call by phase (`map` or `reduce`)
    pub fn record_model_call(&self, kind: &str) {
        self.model_calls.with_label_values(&[kind]).inc();
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        let metrics = Metrics::new();
        assert!(metrics.is_ok());
    }

    #[test]
    fn test_record_and_export() {
        let metrics = Metrics::new().unwrap();
        metrics.record_request(true, 1.2);
        metrics.record_fetch(false);
        metrics.record_model_call("map");
        metrics.record_model_call("reduce");

        let text = metrics.export_prometheus();
        assert!(text.contains("summarizer_requests_total"));
        assert!(text.contains("summarizer_model_calls_total{kind=\"map\"} 1"));
        assert!(text.contains("summarizer_fetches_total{status=\"error\"} 1"));
    }
}
