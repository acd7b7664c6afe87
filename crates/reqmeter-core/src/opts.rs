//! Metric definitions and name validation.

use crate::error::{Error, Result};

/// Name, help text and ordered label names shared by every metric kind.
#[derive(Debug, Clone)]
pub struct Opts {
    pub name: String,
    pub help: String,
    pub label_names: Vec<String>,
}

impl Opts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            label_names: Vec::new(),
        }
    }

    /// Set the label names, in the order observations supply their values.
    pub fn labels(mut self, names: &[&str]) -> Self {
        self.label_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !is_valid_metric_name(&self.name) {
            return Err(Error::InvalidMetric(format!(
                "metric name {:?} must match [a-zA-Z_:][a-zA-Z0-9_:]*",
                self.name
            )));
        }
        for (i, label) in self.label_names.iter().enumerate() {
            if !is_valid_label_name(label) {
                return Err(Error::InvalidMetric(format!(
                    "{}: label name {:?} is not valid",
                    self.name, label
                )));
            }
            if self.label_names[..i].contains(label) {
                return Err(Error::InvalidMetric(format!(
                    "{}: label name {:?} declared twice",
                    self.name, label
                )));
            }
        }
        Ok(())
    }
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, excluding the reserved `__` prefix.
pub fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Bucket bounds must be non-empty, finite and strictly ascending.
pub fn validate_buckets(name: &str, buckets: &[f64]) -> Result<()> {
    if buckets.is_empty() {
        return Err(Error::InvalidMetric(format!("{name}: buckets must not be empty")));
    }
    if buckets.iter().any(|b| !b.is_finite()) {
        return Err(Error::InvalidMetric(format!("{name}: buckets must be finite")));
    }
    if buckets.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::InvalidMetric(format!(
            "{name}: buckets must be strictly ascending"
        )));
    }
    Ok(())
}
