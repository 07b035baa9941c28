use prometheus::{Encoder, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// Metrics
pub static HTTP_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static HTTP_REQUEST_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static LLM_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static EMAILS_SENT_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

pub fn init_metrics() {
    let registry = Registry::new();

    let requests_total = match IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "path", "status"],
    ) {
        Ok(metric) => metric,
        Err(e) => {
            tracing::error!("Failed to create http_requests_total metric: {}", e);
            panic!("Failed to initialize metrics: {}", e);
        }
    };

    let request_duration = match HistogramVec::new(
        prometheus::HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
        ),
        &["method", "path", "status"],
    ) {
        Ok(metric) => metric,
        Err(e) => {
            tracing::error!(
                "Failed to create http_request_duration_seconds metric: {}",
                e
            );
            panic!("Failed to initialize metrics: {}", e);
        }
    };

    let llm_requests = match IntCounterVec::new(
        Opts::new("llm_requests_total", "Total LLM round trips"),
        &["operation", "outcome"],
    ) {
        Ok(metric) => metric,
        Err(e) => {
            tracing::error!("Failed to create llm_requests_total metric: {}", e);
            panic!("Failed to initialize metrics: {}", e);
        }
    };

    let emails_sent = match IntCounterVec::new(
        Opts::new("emails_sent_total", "Total emails dispatched"),
        &["kind"],
    ) {
        Ok(metric) => metric,
        Err(e) => {
            tracing::error!("Failed to create emails_sent_total metric: {}", e);
            panic!("Failed to initialize metrics: {}", e);
        }
    };

    for collector in [
        Box::new(requests_total.clone()) as Box<dyn prometheus::core::Collector>,
        Box::new(request_duration.clone()),
        Box::new(llm_requests.clone()),
        Box::new(emails_sent.clone()),
    ] {
        if let Err(e) = registry.register(collector) {
            tracing::error!("Failed to register metrics collector: {}", e);
            panic!("Failed to initialize metrics: {}", e);
        }
    }

    // Initialize globals
    let _ = REGISTRY.set(registry);
    let _ = HTTP_REQUESTS_TOTAL.set(requests_total);
    let _ = HTTP_REQUEST_DURATION_SECONDS.set(request_duration);
    let _ = LLM_REQUESTS_TOTAL.set(llm_requests);
    let _ = EMAILS_SENT_TOTAL.set(emails_sent);
}

/// Record one HTTP request. No-op before init_metrics().
pub fn record_http_request(method: &str, path: &str, status: &str, duration_seconds: f64) {
    if let Some(counter) = HTTP_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[method, path, status]).inc();
    }
    if let Some(histogram) = HTTP_REQUEST_DURATION_SECONDS.get() {
        histogram
            .with_label_values(&[method, path, status])
            .observe(duration_seconds);
    }
}

/// Record one LLM round trip. No-op before init_metrics().
pub fn record_llm_request(operation: &str, outcome: &str) {
    if let Some(counter) = LLM_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[operation, outcome]).inc();
    }
}

/// Record one dispatched email. No-op before init_metrics().
pub fn record_email_sent(kind: &str) {
    if let Some(counter) = EMAILS_SENT_TOTAL.get() {
        counter.with_label_values(&[kind]).inc();
    }
}

pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to convert metrics to UTF-8: {}", e);
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}
