use crate::error::Result;
use crate::family::MetricFamily;

/// Source of metric families for the registry.
///
/// `describe` must list every name `collect` can emit; the registry uses it to
/// enforce uniqueness at registration time.
pub trait Collector: Send + Sync {
    fn describe(&self) -> Vec<&str>;
    fn collect(&self) -> Result<Vec<MetricFamily>>;
}
