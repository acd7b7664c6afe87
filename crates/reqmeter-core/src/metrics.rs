//! Labelled metric vectors backed by `DashMap`.
//!
//! Each vector maps an ordered list of label values to atomic accumulators.
//! Updates are lock-free per series once the series exists; creating a new
//! series takes a shard write lock. Snapshots are sorted by label values so the
//! exposition is deterministic.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::collector::Collector;
use crate::error::{Error, Result};
use crate::family::{MetricFamily, MetricKind, Series, SeriesValue};
use crate::opts::{validate_buckets, Opts};

/// Check arity and build the series key.
fn series_key(opts: &Opts, values: &[&str]) -> Result<Vec<String>> {
    if values.len() != opts.label_names.len() {
        return Err(Error::LabelMismatch {
            metric: opts.name.clone(),
            expected: opts.label_names.len(),
            got: values.len(),
        });
    }
    Ok(values.iter().map(|v| v.to_string()).collect())
}

fn labelled(opts: &Opts, values: &[String]) -> Vec<(String, String)> {
    opts.label_names
        .iter()
        .cloned()
        .zip(values.iter().cloned())
        .collect()
}

/// Add `v` to an `f64` stored as bits.
fn add_f64(cell: &AtomicU64, v: f64) {
    let _ = cell.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
        Some((f64::from_bits(bits) + v).to_bits())
    });
}

pub struct CounterVec {
    opts: Opts,
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    pub fn new(opts: Opts) -> Result<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            map: DashMap::new(),
        })
    }

    /// Increment by 1.
    pub fn inc(&self, values: &[&str]) -> Result<()> {
        self.add(values, 1)
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, values: &[&str], v: u64) -> Result<()> {
        let key = series_key(&self.opts, values)?;
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
        Ok(())
    }

    /// Current value, zero for a series never touched.
    pub fn get(&self, values: &[&str]) -> u64 {
        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.map
            .get(&key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn snapshot(&self) -> MetricFamily {
        let mut rows: Vec<(Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        MetricFamily {
            name: self.opts.name.clone(),
            help: self.opts.help.clone(),
            kind: MetricKind::Counter,
            series: rows
                .into_iter()
                .map(|(key, v)| Series {
                    labels: labelled(&self.opts, &key),
                    value: SeriesValue::Counter(v),
                })
                .collect(),
        }
    }
}

impl Collector for CounterVec {
    fn describe(&self) -> Vec<&str> {
        vec![self.opts.name.as_str()]
    }

    fn collect(&self) -> Result<Vec<MetricFamily>> {
        Ok(vec![self.snapshot()])
    }
}

pub struct GaugeVec {
    opts: Opts,
    map: DashMap<Vec<String>, AtomicU64>,
}

impl GaugeVec {
    pub fn new(opts: Opts) -> Result<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            map: DashMap::new(),
        })
    }

    /// Overwrite the value.
    pub fn set(&self, values: &[&str], v: f64) -> Result<()> {
        let key = series_key(&self.opts, values)?;
        let gauge = self.map.entry(key).or_insert_with(|| AtomicU64::new(0f64.to_bits()));
        gauge.store(v.to_bits(), Ordering::Relaxed);
        Ok(())
    }

    /// Add a signed delta.
    pub fn add(&self, values: &[&str], v: f64) -> Result<()> {
        let key = series_key(&self.opts, values)?;
        let gauge = self.map.entry(key).or_insert_with(|| AtomicU64::new(0f64.to_bits()));
        add_f64(&gauge, v);
        Ok(())
    }

    pub fn get(&self, values: &[&str]) -> f64 {
        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.map
            .get(&key)
            .map(|g| f64::from_bits(g.load(Ordering::Relaxed)))
            .unwrap_or(0.0)
    }

    fn snapshot(&self) -> MetricFamily {
        let mut rows: Vec<(Vec<String>, f64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), f64::from_bits(r.value().load(Ordering::Relaxed))))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        MetricFamily {
            name: self.opts.name.clone(),
            help: self.opts.help.clone(),
            kind: MetricKind::Gauge,
            series: rows
                .into_iter()
                .map(|(key, v)| Series {
                    labels: labelled(&self.opts, &key),
                    value: SeriesValue::Gauge(v),
                })
                .collect(),
        }
    }
}

impl Collector for GaugeVec {
    fn describe(&self) -> Vec<&str> {
        vec![self.opts.name.as_str()]
    }

    fn collect(&self) -> Result<Vec<MetricFamily>> {
        Ok(vec![self.snapshot()])
    }
}

/// Per-series histogram state. Bucket slots are not cumulative: each
/// observation lands in exactly one slot, the last slot being `+Inf`.
struct AtomicHistogram {
    slots: Box<[AtomicU64]>,
    sum: AtomicU64,
}

impl AtomicHistogram {
    fn new(bounds: usize) -> Self {
        Self {
            slots: (0..=bounds).map(|_| AtomicU64::new(0)).collect(),
            sum: AtomicU64::new(0f64.to_bits()),
        }
    }
}

pub struct HistogramVec {
    opts: Opts,
    buckets: Vec<f64>,
    map: DashMap<Vec<String>, AtomicHistogram>,
}

impl HistogramVec {
    pub fn new(opts: Opts, buckets: Vec<f64>) -> Result<Self> {
        opts.validate()?;
        validate_buckets(&opts.name, &buckets)?;
        if opts.label_names.iter().any(|l| l == "le") {
            return Err(Error::InvalidMetric(format!(
                "{}: label name \"le\" is reserved for histograms",
                opts.name
            )));
        }
        Ok(Self {
            opts,
            buckets,
            map: DashMap::new(),
        })
    }

    /// Record one observation.
    pub fn observe(&self, values: &[&str], v: f64) -> Result<()> {
        let key = series_key(&self.opts, values)?;
        let slot = self
            .buckets
            .iter()
            .position(|b| v <= *b)
            .unwrap_or(self.buckets.len());

        let hist = self
            .map
            .entry(key)
            .or_insert_with(|| AtomicHistogram::new(self.buckets.len()));
        if let Some(c) = hist.slots.get(slot) {
            c.fetch_add(1, Ordering::Relaxed);
        }
        add_f64(&hist.sum, v);
        Ok(())
    }

    /// Total observations for one series.
    pub fn sample_count(&self, values: &[&str]) -> u64 {
        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.map
            .get(&key)
            .map(|h| h.slots.iter().map(|c| c.load(Ordering::Relaxed)).sum())
            .unwrap_or(0)
    }

    fn snapshot(&self) -> MetricFamily {
        let mut rows: Vec<(Vec<String>, SeriesValue)> = self
            .map
            .iter()
            .map(|r| {
                let hist = r.value();
                let mut running = 0u64;
                let buckets = self
                    .buckets
                    .iter()
                    .zip(hist.slots.iter())
                    .map(|(le, c)| {
                        running += c.load(Ordering::Relaxed);
                        (*le, running)
                    })
                    .collect();
                let overflow = hist
                    .slots
                    .last()
                    .map(|c| c.load(Ordering::Relaxed))
                    .unwrap_or(0);
                let value = SeriesValue::Histogram {
                    buckets,
                    sum: f64::from_bits(hist.sum.load(Ordering::Relaxed)),
                    count: running + overflow,
                };
                (r.key().clone(), value)
            })
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        MetricFamily {
            name: self.opts.name.clone(),
            help: self.opts.help.clone(),
            kind: MetricKind::Histogram,
            series: rows
                .into_iter()
                .map(|(key, value)| Series {
                    labels: labelled(&self.opts, &key),
                    value,
                })
                .collect(),
        }
    }
}

impl Collector for HistogramVec {
    fn describe(&self) -> Vec<&str> {
        vec![self.opts.name.as_str()]
    }

    fn collect(&self) -> Result<Vec<MetricFamily>> {
        Ok(vec![self.snapshot()])
    }
}
