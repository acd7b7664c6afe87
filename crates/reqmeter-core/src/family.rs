//! Point-in-time snapshots produced by collectors and consumed by the encoder.

/// Exposition type of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    /// Name used on the `# TYPE` line.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

/// Value of one series.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValue {
    Counter(u64),
    Gauge(f64),
    /// `buckets` holds `(upper_bound, cumulative_count)` for every finite bound.
    Histogram {
        buckets: Vec<(f64, u64)>,
        sum: f64,
        count: u64,
    },
}

/// One labelled series inside a family. Labels keep declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub labels: Vec<(String, String)>,
    pub value: SeriesValue,
}

/// All series sharing one metric name.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub series: Vec<Series>,
}

impl MetricFamily {
    /// Family holding a single unlabelled gauge.
    pub fn gauge(name: &str, help: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            kind: MetricKind::Gauge,
            series: vec![Series {
                labels: Vec::new(),
                value: SeriesValue::Gauge(value),
            }],
        }
    }

    /// Look up the series whose labels match `values` in order.
    pub fn find(&self, values: &[&str]) -> Option<&Series> {
        self.series.iter().find(|s| {
            s.labels.len() == values.len()
                && s.labels.iter().zip(values).all(|((_, v), want)| v.as_str() == *want)
        })
    }
}
