// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling core logic from the backend.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// A lazily-initialized static reference to the global `MetricsSink` implementation.
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns a static reference to the configured error metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured submission metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn submission_metrics() -> &'static dyn SubmissionMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured event bus metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn bus_metrics() -> &'static dyn BusMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

// --- Trait Definitions ---

/// A sink for metrics related to transaction submissions.
pub trait SubmissionMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for submissions started, labeled by mode.
    fn inc_submissions_started(&self, mode: &'static str);
    /// Increments a counter for terminal states reached, labeled by outcome.
    fn inc_submissions_finished(&self, outcome: &'static str);
    /// Increments a counter for submissions stopped by the balance preflight.
    fn inc_preflight_rejections(&self);
    /// Observes the time between broadcast and inclusion.
    fn observe_inclusion_latency(&self, duration_secs: f64);
}
impl SubmissionMetricsSink for NopSink {
    fn inc_submissions_started(&self, _mode: &'static str) {}
    fn inc_submissions_finished(&self, _outcome: &'static str) {}
    fn inc_preflight_rejections(&self) {}
    fn observe_inclusion_latency(&self, _duration_secs: f64) {}
}

/// A sink for metrics related to the per-endpoint event streams.
pub trait BusMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for block event sets emitted, labeled by endpoint.
    fn inc_block_events_emitted(&self, endpoint: &str);
    /// Increments a counter for completion publications, labeled by endpoint.
    fn inc_completions_published(&self, endpoint: &str);
    /// Increments a counter for items a lagging subscriber skipped.
    fn inc_lagged_items(&self, count: u64);
    /// Increments a counter for head subscriptions reopened after ending, labeled by endpoint.
    fn inc_head_resubscriptions(&self, endpoint: &str);
}
impl BusMetricsSink for NopSink {
    fn inc_block_events_emitted(&self, _endpoint: &str) {}
    fn inc_completions_published(&self, _endpoint: &str) {}
    fn inc_lagged_items(&self, _count: u64) {}
    fn inc_head_resubscriptions(&self, _endpoint: &str) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by its kind and variant.
    fn inc_error(&self, kind: &'static str, variant: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _variant: &'static str) {}
}

/// A unified sink that implements all domain-specific traits, providing a single
/// point of implementation for metrics backends like Prometheus.
pub trait MetricsSink: SubmissionMetricsSink + BusMetricsSink + ErrorMetricsSink {}

// Blanket implementation to allow any type that implements all sub-traits
// to be used as a `MetricsSink`.
impl<T> MetricsSink for T where T: SubmissionMetricsSink + BusMetricsSink + ErrorMetricsSink {}
