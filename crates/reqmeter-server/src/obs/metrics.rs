//! HTTP request metrics.
//!
//! Metric: `http_request_duration_seconds` (histogram), `http_requests_total` (counter)
//! Labels: `method`, `route`, `status`
//!
//! `route` is the matched route template when one exists, otherwise the raw
//! path, so unmatched requests carry raw-path cardinality.

use std::sync::Arc;
use std::time::Duration;

use reqmeter_core::{CounterVec, HistogramVec, Opts, Registry, Result};

pub const DURATION_METRIC: &str = "http_request_duration_seconds";
pub const REQUESTS_METRIC: &str = "http_requests_total";

const LABELS: [&str; 3] = ["method", "route", "status"];

#[derive(Clone)]
pub struct HttpMetrics {
    duration: Arc<HistogramVec>,
    requests: Arc<CounterVec>,
}

impl HttpMetrics {
    /// Create both metrics and register them. Fails on a duplicate name.
    pub fn register(registry: &Registry, buckets: Vec<f64>) -> Result<Self> {
        let duration = Arc::new(HistogramVec::new(
            Opts::new(DURATION_METRIC, "Duration of HTTP requests in seconds").labels(&LABELS),
            buckets,
        )?);
        let requests = Arc::new(CounterVec::new(
            Opts::new(REQUESTS_METRIC, "Total number of HTTP requests").labels(&LABELS),
        )?);

        registry.register(duration.clone())?;
        registry.register(requests.clone())?;

        Ok(Self { duration, requests })
    }

    /// Record one completed request: one observation and one increment.
    pub fn record(&self, method: &str, route: &str, status: &str, elapsed: Duration) -> Result<()> {
        let labels = [method, route, status];
        self.duration.observe(&labels, elapsed.as_secs_f64())?;
        self.requests.inc(&labels)
    }

    pub fn requests(&self) -> &CounterVec {
        &self.requests
    }

    pub fn duration(&self) -> &HistogramVec {
        &self.duration
    }
}
