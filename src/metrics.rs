use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and describe all metrics
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "price_lookups_total",
        "Total number of price lookups by endpoint and outcome"
    );
    describe_histogram!(
        "sheet_fetch_duration_seconds",
        "Time spent fetching the spreadsheet export"
    );
    describe_counter!(
        "sheet_fetches_total",
        "Total number of spreadsheet export fetches by outcome"
    );
    describe_counter!(
        "login_attempts_total",
        "Total number of admin login attempts by outcome"
    );
    describe_gauge!(
        "sheet_price_info",
        "Service version and build information"
    );

    gauge!("sheet_price_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a price lookup
pub fn record_lookup(endpoint: &'static str, outcome: &'static str) {
    counter!(
        "price_lookups_total",
        "endpoint" => endpoint,
        "outcome" => outcome,
    )
    .increment(1);
}

/// Record one spreadsheet export fetch
pub fn record_sheet_fetch(outcome: &'static str, duration: Duration) {
    counter!("sheet_fetches_total", "outcome" => outcome).increment(1);
    histogram!("sheet_fetch_duration_seconds", "outcome" => outcome).record(duration.as_secs_f64());
}

/// Record an admin login attempt
pub fn record_login(outcome: &'static str) {
    counter!("login_attempts_total", "outcome" => outcome).increment(1);
}
