// Path: crates/telemetry/src/time.rs
use crate::sinks::SubmissionMetricsSink;
use std::time::Instant;

/// Measures the time from broadcast to inclusion of one submission.
///
/// The latency is only recorded when [`InclusionTimer::observe`] is called, so
/// a submission that fails or is abandoned does not skew the histogram.
pub struct InclusionTimer<'a> {
    sink: &'a dyn SubmissionMetricsSink,
    start: Instant,
}

impl<'a> InclusionTimer<'a> {
    pub fn new(sink: &'a dyn SubmissionMetricsSink) -> Self {
        Self {
            sink,
            start: Instant::now(),
        }
    }

    pub fn observe(self) {
        self.sink
            .observe_inclusion_latency(self.start.elapsed().as_secs_f64());
    }
}
