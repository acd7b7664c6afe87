//! Async runtime health: scheduler lag and worker count.
//!
//! Lag is measured by a background probe that sleeps a fixed interval and
//! stores how late it woke up. A busy or blocked runtime shows up as growing
//! lag long before requests start timing out.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqmeter_core::{Collector, GaugeVec, MetricFamily, Opts, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;

const LAG: &str = "runtime_scheduler_lag_seconds";
const WORKERS: &str = "runtime_worker_threads";

pub const PROBE_INTERVAL: Duration = Duration::from_millis(500);

pub struct RuntimeCollector {
    lag: GaugeVec,
}

impl RuntimeCollector {
    pub fn new() -> Result<Self> {
        let lag = GaugeVec::new(Opts::new(
            LAG,
            "Delay between scheduled and actual wakeup of the lag probe in seconds.",
        ))?;
        lag.set(&[], 0.0)?;
        Ok(Self { lag })
    }

    pub fn record_lag(&self, lag: Duration) {
        if let Err(e) = self.lag.set(&[], lag.as_secs_f64()) {
            tracing::warn!(error = %e, "scheduler lag not recorded");
        }
    }

    pub fn lag_seconds(&self) -> f64 {
        self.lag.get(&[])
    }
}

impl Collector for RuntimeCollector {
    fn describe(&self) -> Vec<&str> {
        vec![LAG, WORKERS]
    }

    fn collect(&self) -> Result<Vec<MetricFamily>> {
        let mut families = self.lag.collect()?;
        let workers = tokio::runtime::Handle::try_current()
            .map(|h| h.metrics().num_workers())
            .unwrap_or(0);
        families.push(MetricFamily::gauge(
            WORKERS,
            "Number of worker threads used by the runtime.",
            workers as f64,
        ));
        Ok(families)
    }
}

/// Spawn the lag probe. It exits once `shutdown` changes or its sender is dropped.
pub fn spawn_lag_probe(
    collector: Arc<RuntimeCollector>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let start = Instant::now();
            tokio::select! {
                _ = tokio::time::sleep(PROBE_INTERVAL) => {
                    collector.record_lag(start.elapsed().saturating_sub(PROBE_INTERVAL));
                }
                _ = shutdown.changed() => break,
            }
        }
        tracing::debug!("lag probe stopped");
    })
}
