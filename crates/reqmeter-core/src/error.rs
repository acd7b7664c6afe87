//! Shared error type across reqmeter crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum Error {
    /// A metric name was registered twice.
    #[error("duplicate metric name: {0}")]
    DuplicateMetricName(String),
    /// Metric definition rejected at construction (bad name, labels or buckets).
    #[error("invalid metric: {0}")]
    InvalidMetric(String),
    /// Observation carried the wrong number of label values.
    #[error("label mismatch for {metric}: expected {expected} values, got {got}")]
    LabelMismatch {
        metric: String,
        expected: usize,
        got: usize,
    },
    /// A collector failed while producing the exposition.
    #[error("export failed: {0}")]
    Export(String),
    /// Configuration could not be loaded or validated.
    #[error("config: {0}")]
    Config(String),
    /// Registry state unusable while registering or configuring it.
    #[error("registry: {0}")]
    Registry(String),
}

impl Error {
    /// Stable short code for logs and error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::DuplicateMetricName(_) => "DUPLICATE_METRIC_NAME",
            Error::InvalidMetric(_) => "INVALID_METRIC",
            Error::LabelMismatch { .. } => "LABEL_MISMATCH",
            Error::Export(_) => "EXPORT",
            Error::Config(_) => "CONFIG",
            Error::Registry(_) => "REGISTRY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(Error::DuplicateMetricName("x".into()).code(), "DUPLICATE_METRIC_NAME");
        assert_eq!(Error::Export("boom".into()).code(), "EXPORT");
        assert_eq!(Error::Registry("poisoned".into()).code(), "REGISTRY");
    }

    #[test]
    fn label_mismatch_message() {
        let e = Error::LabelMismatch {
            metric: "http_requests_total".into(),
            expected: 3,
            got: 1,
        };
        assert_eq!(
            e.to_string(),
            "label mismatch for http_requests_total: expected 3 values, got 1"
        );
    }
}
