// Path: crates/api/src/events/mod.rs
//! Defines the sink through which submissions announce their in-block events.

use std::fmt::Debug;
use waypoint_types::app::EventRecord;

/// Receives the events of a submission at the moment it is included in a block.
///
/// Publishing is a synchronous fan-out: listeners observe the events before the
/// one-block-delayed block event stream would deliver them.
pub trait CompletionSink: Send + Sync + Debug {
    /// Publishes the events of an included submission on `endpoint`.
    fn publish(&self, endpoint: &str, events: Vec<EventRecord>);
}

/// A sink that drops every publication, for callers without an event bus.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl CompletionSink for NullSink {
    fn publish(&self, _endpoint: &str, _events: Vec<EventRecord>) {}
}
