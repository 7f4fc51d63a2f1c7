//! Prometheus metrics for invoicing-client.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, CounterVec, HistogramVec,
    IntCounter, TextEncoder,
};

/// Collaborator request counter by operation and outcome.
pub static CLIENT_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoicing_client_requests_total",
        "Total number of invoice API requests",
        &["operation", "status"] // ok, error
    )
    .expect("Failed to register client_requests_total")
});

/// Collaborator request duration histogram by operation.
pub static CLIENT_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "invoicing_client_request_duration_seconds",
        "Invoice API request duration in seconds",
        &["operation"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register client_request_duration")
});

/// Submits rejected locally, by validation reason.
pub static VALIDATION_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoicing_client_validation_failures_total",
        "Total number of submits rejected by client-side validation",
        &["reason"]
    )
    .expect("Failed to register validation_failures_total")
});

/// Responses that arrived for an abandoned or superseded request.
pub static STALE_RESPONSES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "invoicing_client_stale_responses_total",
        "Total number of discarded stale responses"
    )
    .expect("Failed to register stale_responses_total")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&CLIENT_REQUESTS_TOTAL);
    Lazy::force(&CLIENT_REQUEST_DURATION);
    Lazy::force(&VALIDATION_FAILURES_TOTAL);
    Lazy::force(&STALE_RESPONSES_TOTAL);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}

/// Record the outcome of one collaborator call.
pub(crate) fn record_request<T, E>(operation: &str, result: &Result<T, E>) {
    let status = if result.is_ok() { "ok" } else { "error" };
    CLIENT_REQUESTS_TOTAL
        .with_label_values(&[operation, status])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_requests_show_up_in_text_output() {
        init_metrics();
        record_request::<(), ()>("get", &Ok(()));
        record_request::<(), ()>("get", &Err(()));
        STALE_RESPONSES_TOTAL.inc();

        let text = get_metrics();
        assert!(text.contains("invoicing_client_requests_total"));
        assert!(text.contains("operation=\"get\""));
        assert!(text.contains("invoicing_client_stale_responses_total"));
    }
}
