use std::sync::OnceLock;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
///
/// Only one recorder can exist per process; later calls return the same handle.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                tracing::warn!("Metrics recorder already installed");
            }

            // Pre-register so series appear before the first request.
            counter!("wallet_requests_total").absolute(0);
            counter!("price_lookup_failures_total").absolute(0);
            counter!("roasts_generated_total").absolute(0);
            gauge!("admission_active").set(0.0);
            histogram!("wallet_fetch_seconds").record(0.0);

            handle
        })
        .clone()
}
