// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_histogram, register_int_counter, register_int_counter_vec,
    Histogram, IntCounter, IntCounterVec,
};

// --- Metric Statics ---
// We use OnceCell to hold the metric collectors. They will be initialized
// exactly once by the `install` function.

static SUBMISSIONS_STARTED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static SUBMISSIONS_FINISHED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static PREFLIGHT_REJECTIONS_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static INCLUSION_LATENCY_SECONDS: OnceCell<Histogram> = OnceCell::new();
static BLOCK_EVENTS_EMITTED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static COMPLETIONS_PUBLISHED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static LAGGED_ITEMS_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static HEAD_RESUBSCRIPTIONS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

/// Helper macro to reduce boilerplate for getting a metric from OnceCell.
/// Calls made before `install()` are dropped, so instrumented code never
/// panics in a process that did not opt into Prometheus.
macro_rules! with_metric {
    ($metric:ident, |$m:ident| $body:expr) => {
        if let Some($m) = $metric.get() {
            $body;
        }
    };
}

impl SubmissionMetricsSink for PrometheusSink {
    fn inc_submissions_started(&self, mode: &'static str) {
        with_metric!(SUBMISSIONS_STARTED_TOTAL, |m| m.with_label_values(&[mode]).inc());
    }
    fn inc_submissions_finished(&self, outcome: &'static str) {
        with_metric!(SUBMISSIONS_FINISHED_TOTAL, |m| m
            .with_label_values(&[outcome])
            .inc());
    }
    fn inc_preflight_rejections(&self) {
        with_metric!(PREFLIGHT_REJECTIONS_TOTAL, |m| m.inc());
    }
    fn observe_inclusion_latency(&self, duration_secs: f64) {
        with_metric!(INCLUSION_LATENCY_SECONDS, |m| m.observe(duration_secs));
    }
}

impl BusMetricsSink for PrometheusSink {
    fn inc_block_events_emitted(&self, endpoint: &str) {
        with_metric!(BLOCK_EVENTS_EMITTED_TOTAL, |m| m
            .with_label_values(&[endpoint])
            .inc());
    }
    fn inc_completions_published(&self, endpoint: &str) {
        with_metric!(COMPLETIONS_PUBLISHED_TOTAL, |m| m
            .with_label_values(&[endpoint])
            .inc());
    }
    fn inc_lagged_items(&self, count: u64) {
        with_metric!(LAGGED_ITEMS_TOTAL, |m| m.inc_by(count));
    }
    fn inc_head_resubscriptions(&self, endpoint: &str) {
        with_metric!(HEAD_RESUBSCRIPTIONS_TOTAL, |m| m
            .with_label_values(&[endpoint])
            .inc());
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, variant: &'static str) {
        with_metric!(ERRORS_TOTAL, |m| m.with_label_values(&[kind, variant]).inc());
    }
}

fn already_installed() -> prometheus::Error {
    prometheus::Error::Msg("prometheus sink already installed".into())
}

/// Initializes all Prometheus metrics collectors, registers them with the default
/// registry and publishes the sink as the global `SINK`.
/// This function must be called only once at application startup.
pub fn install() -> Result<&'static dyn MetricsSink, prometheus::Error> {
    SUBMISSIONS_STARTED_TOTAL
        .set(register_int_counter_vec!(
            "waypoint_submissions_started_total",
            "Total submissions started, by mode.",
            &["mode"]
        )?)
        .map_err(|_| already_installed())?;
    SUBMISSIONS_FINISHED_TOTAL
        .set(register_int_counter_vec!(
            "waypoint_submissions_finished_total",
            "Total submissions that reached a terminal state, by outcome.",
            &["outcome"]
        )?)
        .map_err(|_| already_installed())?;
    PREFLIGHT_REJECTIONS_TOTAL
        .set(register_int_counter!(
            "waypoint_preflight_rejections_total",
            "Total submissions stopped because the balance did not cover the fee."
        )?)
        .map_err(|_| already_installed())?;
    INCLUSION_LATENCY_SECONDS
        .set(register_histogram!(
            "waypoint_inclusion_latency_seconds",
            "Time between broadcast and inclusion in a block.",
            exponential_buckets(0.5, 2.0, 10)?
        )?)
        .map_err(|_| already_installed())?;
    BLOCK_EVENTS_EMITTED_TOTAL
        .set(register_int_counter_vec!(
            "waypoint_block_events_emitted_total",
            "Total non-empty block event sets emitted, by endpoint.",
            &["endpoint"]
        )?)
        .map_err(|_| already_installed())?;
    COMPLETIONS_PUBLISHED_TOTAL
        .set(register_int_counter_vec!(
            "waypoint_completions_published_total",
            "Total in-block completions published, by endpoint.",
            &["endpoint"]
        )?)
        .map_err(|_| already_installed())?;
    LAGGED_ITEMS_TOTAL
        .set(register_int_counter!(
            "waypoint_bus_lagged_items_total",
            "Total event bus items skipped by lagging subscribers."
        )?)
        .map_err(|_| already_installed())?;
    HEAD_RESUBSCRIPTIONS_TOTAL
        .set(register_int_counter_vec!(
            "waypoint_head_resubscriptions_total",
            "Total head subscriptions reopened after the node ended them, by endpoint.",
            &["endpoint"]
        )?)
        .map_err(|_| already_installed())?;
    ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "waypoint_errors_total",
            "Total number of errors, categorized by type and variant.",
            &["kind", "variant"]
        )?)
        .map_err(|_| already_installed())?;

    static PROMETHEUS_SINK: PrometheusSink = PrometheusSink;
    SINK.set(&PROMETHEUS_SINK).map_err(|_| already_installed())?;
    Ok(&PROMETHEUS_SINK)
}
