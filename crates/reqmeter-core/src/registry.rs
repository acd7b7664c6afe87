//! Metrics registry.
//!
//! Owns every registered collector for the lifetime of the process. Names are
//! unique across all collectors; default labels are merged into every exported
//! series. Registration happens at startup, export on every scrape.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::collector::Collector;
use crate::error::{Error, Result};
use crate::exposition;
use crate::family::MetricFamily;
use crate::opts::is_valid_label_name;

#[derive(Default)]
struct Inner {
    collectors: Vec<Arc<dyn Collector>>,
    names: Vec<String>,
    default_labels: Vec<(String, String)>,
}

#[derive(Default)]
pub struct Registry {
    inner: RwLock<Inner>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collector. All-or-nothing: a duplicate name registers nothing.
    pub fn register(&self, collector: Arc<dyn Collector>) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| Error::Registry("lock poisoned during register".into()))?;

        let declared = collector.describe();
        let mut seen: HashSet<&str> = inner.names.iter().map(String::as_str).collect();
        for name in &declared {
            if !seen.insert(name) {
                return Err(Error::DuplicateMetricName(name.to_string()));
            }
        }

        let declared: Vec<String> = declared.into_iter().map(str::to_string).collect();
        tracing::debug!(metrics = ?declared, "collector registered");
        inner.names.extend(declared);
        inner.collectors.push(collector);
        Ok(())
    }

    /// Attach labels merged into every exported series. Replaces any previous set.
    pub fn set_default_labels(&self, labels: Vec<(String, String)>) -> Result<()> {
        for (i, (name, _)) in labels.iter().enumerate() {
            if !is_valid_label_name(name) || name == "le" {
                return Err(Error::InvalidMetric(format!(
                    "default label name {name:?} is not valid"
                )));
            }
            if labels[..i].iter().any(|(n, _)| n == name) {
                return Err(Error::InvalidMetric(format!(
                    "default label name {name:?} set twice"
                )));
            }
        }
        let mut inner = self
            .inner
            .write()
            .map_err(|_| Error::Registry("lock poisoned during set_default_labels".into()))?;
        inner.default_labels = labels;
        Ok(())
    }

    /// Registered metric names in registration order.
    pub fn metric_names(&self) -> Result<Vec<String>> {
        self.inner
            .read()
            .map(|inner| inner.names.clone())
            .map_err(|_| Error::Registry("lock poisoned while listing names".into()))
    }

    /// Snapshot every collector in registration order.
    pub fn gather(&self) -> Result<Vec<MetricFamily>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| Error::Export("registry lock poisoned".into()))?;
        let mut families = Vec::new();
        for c in &inner.collectors {
            families.extend(c.collect()?);
        }
        Ok(families)
    }

    /// Text exposition of all registered metrics with default labels applied.
    pub fn export(&self) -> Result<String> {
        let families = self.gather()?;
        let defaults = self
            .inner
            .read()
            .map(|inner| inner.default_labels.clone())
            .map_err(|_| Error::Export("registry lock poisoned".into()))?;
        Ok(exposition::encode(&families, &defaults))
    }

    pub fn content_type(&self) -> &'static str {
        exposition::CONTENT_TYPE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::metrics::{CounterVec, HistogramVec};
    use crate::opts::Opts;

    struct Failing;

    impl Collector for Failing {
        fn describe(&self) -> Vec<&str> {
            vec!["failing_metric"]
        }
        fn collect(&self) -> Result<Vec<MetricFamily>> {
            Err(Error::Export("collector offline".into()))
        }
    }

    struct Pair;

    impl Collector for Pair {
        fn describe(&self) -> Vec<&str> {
            vec!["pair_a", "pair_a"]
        }
        fn collect(&self) -> Result<Vec<MetricFamily>> {
            Ok(Vec::new())
        }
    }

    fn counter(name: &str) -> Arc<CounterVec> {
        Arc::new(CounterVec::new(Opts::new(name, "help")).unwrap())
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let reg = Registry::new();
        reg.register(counter("http_requests_total")).unwrap();
        let err = reg.register(counter("http_requests_total")).unwrap_err();
        assert!(matches!(err, Error::DuplicateMetricName(ref n) if n == "http_requests_total"));
        assert_eq!(reg.metric_names().unwrap(), vec!["http_requests_total"]);
    }

    #[test]
    fn self_duplicate_registers_nothing() {
        let reg = Registry::new();
        assert!(reg.register(Arc::new(Pair)).is_err());
        assert!(reg.metric_names().unwrap().is_empty());
    }

    #[test]
    fn export_follows_registration_order() {
        let reg = Registry::new();
        reg.register(counter("zeta_total")).unwrap();
        reg.register(counter("alpha_total")).unwrap();

        let text = reg.export().unwrap();
        let zeta = text.find("# TYPE zeta_total").unwrap();
        let alpha = text.find("# TYPE alpha_total").unwrap();
        assert!(zeta < alpha);
        assert_eq!(text, reg.export().unwrap());
    }

    #[test]
    fn default_labels_reach_every_series() {
        let reg = Registry::new();
        let c = Arc::new(
            CounterVec::new(Opts::new("http_requests_total", "t").labels(&["route"])).unwrap(),
        );
        let h = Arc::new(
            HistogramVec::new(Opts::new("d_seconds", "d").labels(&["route"]), vec![1.0]).unwrap(),
        );
        reg.register(c.clone()).unwrap();
        reg.register(h.clone()).unwrap();
        reg.set_default_labels(vec![("app".into(), "my-express-app".into())])
            .unwrap();

        c.inc(&["/"]).unwrap();
        h.observe(&["/"], 0.2).unwrap();

        let text = reg.export().unwrap();
        for line in text.lines().filter(|l| !l.starts_with('#')) {
            assert!(line.contains("app=\"my-express-app\""), "missing default label: {line}");
        }
    }

    #[test]
    fn invalid_default_labels() {
        let reg = Registry::new();
        assert!(reg.set_default_labels(vec![("__x".into(), "v".into())]).is_err());
        assert!(reg
            .set_default_labels(vec![("a".into(), "1".into()), ("a".into(), "2".into())])
            .is_err());
    }

    #[test]
    fn collector_failure_surfaces_as_export_error() {
        let reg = Registry::new();
        reg.register(Arc::new(Failing)).unwrap();
        let err = reg.export().unwrap_err();
        assert_eq!(err.code(), "EXPORT");
        assert_eq!(err.to_string(), "export failed: collector offline");
    }

    #[test]
    fn poisoned_lock_is_a_registry_error() {
        let reg = Registry::new();
        reg.register(counter("before_total")).unwrap();

        let poisoned = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = reg.inner.write().unwrap();
                panic!("writer died holding the lock");
            })
            .join()
        });
        assert!(poisoned.is_err());

        let err = reg.register(counter("after_total")).unwrap_err();
        assert_eq!(err.code(), "REGISTRY");
        let err = reg
            .set_default_labels(vec![("app".into(), "x".into())])
            .unwrap_err();
        assert_eq!(err.code(), "REGISTRY");
        assert_eq!(reg.metric_names().unwrap_err().code(), "REGISTRY");
        assert_eq!(reg.export().unwrap_err().code(), "EXPORT");
    }
}
