//! Process metrics gathered from the OS on every scrape.
//!
//! CPU usage is computed by `sysinfo` from the delta between two refreshes, so
//! the first scrape after startup reports 0.

use std::sync::Mutex;

use reqmeter_core::{Collector, Error, MetricFamily, Result};
use sysinfo::{Pid, System};

const RESIDENT: &str = "process_resident_memory_bytes";
const VIRTUAL: &str = "process_virtual_memory_bytes";
const CPU: &str = "process_cpu_usage_percent";
const START: &str = "process_start_time_seconds";
const UPTIME: &str = "process_uptime_seconds";

pub struct ProcessCollector {
    pid: Pid,
    system: Mutex<System>,
}

impl ProcessCollector {
    /// Collector for the current process.
    pub fn new() -> Result<Self> {
        let pid = sysinfo::get_current_pid()
            .map_err(|e| Error::Export(format!("current pid unavailable: {e}")))?;
        Ok(Self::for_pid(pid))
    }

    pub fn for_pid(pid: Pid) -> Self {
        Self {
            pid,
            system: Mutex::new(System::new()),
        }
    }
}

impl Collector for ProcessCollector {
    fn describe(&self) -> Vec<&str> {
        vec![RESIDENT, VIRTUAL, CPU, START, UPTIME]
    }

    fn collect(&self) -> Result<Vec<MetricFamily>> {
        let mut sys = self
            .system
            .lock()
            .map_err(|_| Error::Export("process stats lock poisoned".into()))?;

        if !sys.refresh_process(self.pid) {
            return Err(Error::Export(format!("process {} not found", self.pid)));
        }
        let p = sys
            .process(self.pid)
            .ok_or_else(|| Error::Export(format!("process {} not found", self.pid)))?;

        Ok(vec![
            MetricFamily::gauge(RESIDENT, "Resident memory size in bytes.", p.memory() as f64),
            MetricFamily::gauge(VIRTUAL, "Virtual memory size in bytes.", p.virtual_memory() as f64),
            MetricFamily::gauge(CPU, "Process CPU usage in percent of one core.", f64::from(p.cpu_usage())),
            MetricFamily::gauge(
                START,
                "Start time of the process since unix epoch in seconds.",
                p.start_time() as f64,
            ),
            MetricFamily::gauge(UPTIME, "Process uptime in seconds.", p.run_time() as f64),
        ])
    }
}
