//! Shared application state.
//!
//! The registry is built once here and lives as long as the process. Any
//! registration failure is returned to `main` so the server never starts with
//! a half-built registry.

use std::sync::Arc;

use reqmeter_core::{Registry, Result};

use crate::config::Config;
use crate::obs::{HttpMetrics, ProcessCollector, RuntimeCollector};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: Config,
    registry: Arc<Registry>,
    http: HttpMetrics,
    runtime: Option<Arc<RuntimeCollector>>,
}

impl AppState {
    /// Build the registry and register every metric.
    pub fn new(cfg: Config) -> Result<Self> {
        let registry = Arc::new(Registry::new());
        registry.set_default_labels(cfg.metrics.default_label_pairs())?;

        // 1) Application metrics
        let http = HttpMetrics::register(&registry, cfg.metrics.duration_buckets.clone())?;

        // 2) Default process/runtime metrics
        let runtime = if cfg.metrics.process_metrics {
            registry.register(Arc::new(ProcessCollector::new()?))?;
            let runtime = Arc::new(RuntimeCollector::new()?);
            registry.register(runtime.clone())?;
            Some(runtime)
        } else {
            None
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                http,
                runtime,
            }),
        })
    }

    pub fn cfg(&self) -> &Config {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn http_metrics(&self) -> &HttpMetrics {
        &self.inner.http
    }

    /// Collector fed by the lag probe, when default metrics are enabled.
    pub fn runtime_collector(&self) -> Option<Arc<RuntimeCollector>> {
        self.inner.runtime.clone()
    }
}
