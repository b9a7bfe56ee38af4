// Path: crates/telemetry/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Waypoint Telemetry
//!
//! This crate provides the observability infrastructure for Waypoint:
//! structured logging initialization, Prometheus metric collectors, and
//! abstract sinks that decouple instrumentation from the backend.

/// The initialization routine for global structured logging.
pub mod init;
/// The concrete implementation of metrics sinks using the `prometheus` crate.
pub mod prometheus;
/// Abstract traits (`*MetricsSink`) that define the contract for metrics reporting.
pub mod sinks;
/// Broadcast-to-inclusion latency timer.
pub mod time;

// Re-export the public helper functions for easy access to the global sinks.
pub use sinks::{bus_metrics, error_metrics, submission_metrics};
