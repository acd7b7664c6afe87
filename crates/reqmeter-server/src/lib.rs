//! reqmeter HTTP server library.
//!
//! Wires config, the metrics registry, request instrumentation and the three
//! endpoints into an axum router. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;
