use prometheus::{Encoder, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// Metrics
pub static HTTP_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static HTTP_REQUEST_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static PORTAL_LOGIN_OUTCOMES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static PORTAL_RESULT_FETCHES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

pub fn init_metrics() {
    let registry = Registry::new();

    let requests_total = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "path", "status"],
    )
    .expect("metric can be created");

    let request_duration = HistogramVec::new(
        prometheus::HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
        ),
        &["method", "path", "status"],
    )
    .expect("metric can be created");

    let login_outcomes = IntCounterVec::new(
        Opts::new(
            "portal_login_outcomes_total",
            "Portal login submissions by classified outcome",
        ),
        &["outcome"],
    )
    .expect("metric can be created");

    let result_fetches = IntCounterVec::new(
        Opts::new(
            "portal_result_fetches_total",
            "Portal result fetches by classified outcome",
        ),
        &["outcome"],
    )
    .expect("metric can be created");

    registry
        .register(Box::new(requests_total.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(request_duration.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(login_outcomes.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(result_fetches.clone()))
        .expect("collector can be registered");

    // Initialize globals; repeated init (tests) leaves the first instance.
    let _ = REGISTRY.set(registry);
    let _ = HTTP_REQUESTS_TOTAL.set(requests_total);
    let _ = HTTP_REQUEST_DURATION_SECONDS.set(request_duration);
    let _ = PORTAL_LOGIN_OUTCOMES_TOTAL.set(login_outcomes);
    let _ = PORTAL_RESULT_FETCHES_TOTAL.set(result_fetches);
}

pub fn get_metrics() -> String {
    let registry = match REGISTRY.get() {
        Some(registry) => registry,
        None => {
            tracing::error!("metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!("failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}

pub fn record_login_outcome(outcome: &str) {
    if let Some(counter) = PORTAL_LOGIN_OUTCOMES_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn record_result_fetch(outcome: &str) {
    if let Some(counter) = PORTAL_RESULT_FETCHES_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}
