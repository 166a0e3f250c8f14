//! Lightweight in-process metrics.
//!
//! Counters are stored as atomics and rendered by the `/metrics` handler in
//! Prometheus text format.

pub mod metrics;
