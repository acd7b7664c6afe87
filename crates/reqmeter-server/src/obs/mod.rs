//! Request instrumentation and default process/runtime metrics.
//!
//! Everything here records into the registry owned by `AppState`; the
//! `/metrics` handler renders it.

pub mod metrics;
pub mod middleware;
pub mod process;
pub mod runtime;

pub use metrics::HttpMetrics;
pub use process::ProcessCollector;
pub use runtime::RuntimeCollector;
