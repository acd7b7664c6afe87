//! reqmeter core: metric primitives, registry and text exposition.
//!
//! This crate carries no transport or runtime dependencies; the HTTP server
//! builds on it, and it can be reused by anything that needs a small
//! Prometheus-compatible registry.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible
//! path surfaces as [`Error`] so a scrape can never take the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod collector;
pub mod error;
pub mod exposition;
pub mod family;
pub mod metrics;
pub mod opts;
pub mod registry;

pub use collector::Collector;
pub use error::{Error, Result};
pub use family::{MetricFamily, MetricKind, Series, SeriesValue};
pub use metrics::{CounterVec, GaugeVec, HistogramVec};
pub use opts::Opts;
pub use registry::Registry;
