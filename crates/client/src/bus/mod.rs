// Path: crates/client/src/bus/mod.rs

//! Per-endpoint event streams shared by every consumer of a client.
//!
//! Each endpoint gets one lazily started entry holding two multicast sources:
//! the delayed block event stream fed by a single head subscription, and the
//! completion channel submissions publish into the moment they are included.

use dashmap::DashMap;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};
use waypoint_api::events::CompletionSink;
use waypoint_api::node::{NodeApi, NodeProvider, NodeStream};
use waypoint_telemetry::bus_metrics;
use waypoint_types::app::{BlockEvents, BlockHeader, EventRecord};
use waypoint_types::error::NodeError;

/// Default buffer of each per-endpoint broadcast channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// First wait before reopening an ended head subscription.
const INITIAL_RESUBSCRIBE_BACKOFF: Duration = Duration::from_millis(50);
/// Upper bound of the doubling wait between reopen attempts.
const MAX_RESUBSCRIBE_BACKOFF: Duration = Duration::from_secs(10);

/// A stream handed out by the bus.
pub type EventStream<T> = BoxStream<'static, T>;

/// Where a set of events was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    /// The delayed block event stream, for the given block.
    Block(u64),
    /// A local submission's in-block events.
    Completion,
}

/// A set of events paired with the live node handle they came from.
#[derive(Clone)]
pub struct ChainEvents {
    /// The events.
    pub events: Vec<EventRecord>,
    /// Which source produced them.
    pub source: EventSource,
    /// The node the events were observed on.
    pub api: Arc<dyn NodeApi>,
}

impl fmt::Debug for ChainEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainEvents")
            .field("source", &self.source)
            .field("events", &self.events.len())
            .field("endpoint", &self.api.endpoint())
            .finish()
    }
}

/// Holds each block's events back until the next block's events arrive.
///
/// A state read issued on a new head may still reflect the previous block, so
/// block N is only released once block N+1 has been observed. Empty sets are
/// swallowed, and a read whose block number is not past the held one (a
/// repeated header, or a stale read) is ignored, so each block is released at
/// most once.
#[derive(Debug, Default)]
pub struct OneBlockDelay {
    held: Option<BlockEvents>,
}

impl OneBlockDelay {
    /// Feeds the latest observation and returns the one it displaces, if any
    /// and non-empty.
    pub fn push(&mut self, latest: BlockEvents) -> Option<BlockEvents> {
        if let Some(held) = &self.held {
            if latest.block_number <= held.block_number {
                return None;
            }
        }
        self.held.replace(latest).filter(|prev| !prev.is_empty())
    }
}

struct EndpointEntry {
    api: OnceCell<Arc<dyn NodeApi>>,
    block_task: OnceCell<JoinHandle<()>>,
    blocks: broadcast::Sender<BlockEvents>,
    completions: broadcast::Sender<Vec<EventRecord>>,
}

impl EndpointEntry {
    fn new(capacity: usize) -> Self {
        let (blocks, _) = broadcast::channel(capacity);
        let (completions, _) = broadcast::channel(capacity);
        Self {
            api: OnceCell::new(),
            block_task: OnceCell::new(),
            blocks,
            completions,
        }
    }
}

impl Drop for EndpointEntry {
    fn drop(&mut self) {
        if let Some(task) = self.block_task.get() {
            task.abort();
        }
    }
}

/// The registry of per-endpoint event streams.
///
/// Share it through an `Arc`. Entries are created on first use and live as
/// long as the bus; the node sees at most one connection and one head
/// subscription per endpoint, whatever the number of subscribers.
pub struct EventBus {
    provider: Arc<dyn NodeProvider>,
    entries: DashMap<String, Arc<EndpointEntry>>,
    capacity: usize,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("endpoints", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    /// A bus connecting through `provider`.
    pub fn new(provider: Arc<dyn NodeProvider>) -> Self {
        Self::with_capacity(provider, DEFAULT_CHANNEL_CAPACITY)
    }

    /// A bus whose per-endpoint channels buffer `capacity` items.
    pub fn with_capacity(provider: Arc<dyn NodeProvider>, capacity: usize) -> Self {
        Self {
            provider,
            entries: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    fn entry(&self, endpoint: &str) -> Arc<EndpointEntry> {
        self.entries
            .entry(endpoint.to_string())
            .or_insert_with(|| Arc::new(EndpointEntry::new(self.capacity)))
            .clone()
    }

    /// The live node handle for `endpoint`, connecting on first use.
    pub async fn api(&self, endpoint: &str) -> Result<Arc<dyn NodeApi>, NodeError> {
        let entry = self.entry(endpoint);
        entry
            .api
            .get_or_try_init(|| self.provider.connect(endpoint))
            .await
            .cloned()
    }

    /// The delayed, non-empty block event sets of `endpoint`.
    ///
    /// The first call starts the head subscription; later calls share it. A
    /// subscription the node ends is reopened, so the stream never closes
    /// while the bus lives.
    pub async fn block_events(
        &self,
        endpoint: &str,
    ) -> Result<EventStream<BlockEvents>, NodeError> {
        let entry = self.entry(endpoint);
        let rx = entry.blocks.subscribe();
        entry
            .block_task
            .get_or_try_init(|| async {
                let api = self.api(endpoint).await?;
                let heads = api.subscribe_new_heads().await?;
                debug!(target: "bus", endpoint, "started block event stream");
                Ok::<_, NodeError>(tokio::spawn(run_block_stream(
                    endpoint.to_string(),
                    api,
                    heads,
                    entry.blocks.clone(),
                )))
            })
            .await?;
        Ok(receiver_stream(endpoint.to_string(), rx))
    }

    /// The in-block events of local submissions on `endpoint`, without delay.
    pub fn completions(&self, endpoint: &str) -> EventStream<Vec<EventRecord>> {
        let rx = self.entry(endpoint).completions.subscribe();
        receiver_stream(endpoint.to_string(), rx)
    }

    /// Block event sets and completions of `endpoint`, merged and paired with
    /// the node handle.
    pub async fn events(&self, endpoint: &str) -> Result<EventStream<ChainEvents>, NodeError> {
        let api = self.api(endpoint).await?;
        let completions = {
            let api = api.clone();
            self.completions(endpoint).map(move |events| ChainEvents {
                events,
                source: EventSource::Completion,
                api: api.clone(),
            })
        };
        let blocks = self
            .block_events(endpoint)
            .await?
            .map(move |block| ChainEvents {
                events: block.events,
                source: EventSource::Block(block.block_number),
                api: api.clone(),
            });
        Ok(stream::select(blocks, completions).boxed())
    }

    /// Endpoints with a live entry.
    pub fn endpoints(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}

impl CompletionSink for EventBus {
    fn publish(&self, endpoint: &str, events: Vec<EventRecord>) {
        let receivers = self
            .entry(endpoint)
            .completions
            .send(events)
            .unwrap_or(0);
        bus_metrics().inc_completions_published(endpoint);
        debug!(target: "bus", endpoint, receivers, "published completion");
    }
}

/// Feeds `tx` for the lifetime of the endpoint entry.
///
/// When the head subscription ends or fails, it is reopened after a doubling
/// delay. The one-block delay state carries over, so the block held before the
/// gap is released by the first block read after it.
async fn run_block_stream(
    endpoint: String,
    api: Arc<dyn NodeApi>,
    heads: NodeStream<BlockHeader>,
    tx: broadcast::Sender<BlockEvents>,
) {
    let mut delay = OneBlockDelay::default();
    let mut backoff = INITIAL_RESUBSCRIBE_BACKOFF;
    let mut heads = Some(heads);
    loop {
        let mut current = match heads.take() {
            Some(h) => h,
            None => match api.subscribe_new_heads().await {
                Ok(h) => {
                    bus_metrics().inc_head_resubscriptions(&endpoint);
                    debug!(target: "bus", endpoint = %endpoint, "head subscription reopened");
                    h
                }
                Err(e) => {
                    warn!(
                        target: "bus",
                        endpoint = %endpoint,
                        error = %e,
                        retry_in_ms = backoff.as_millis() as u64,
                        "failed to reopen head subscription"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2).min(MAX_RESUBSCRIBE_BACKOFF);
                    continue;
                }
            },
        };

        while let Some(head) = current.next().await {
            let header = match head {
                Ok(h) => h,
                Err(e) => {
                    warn!(target: "bus", endpoint = %endpoint, error = %e, "head subscription failed");
                    break;
                }
            };
            backoff = INITIAL_RESUBSCRIBE_BACKOFF;
            let observed = match api.block_events().await {
                Ok(events) => events,
                Err(e) => {
                    warn!(
                        target: "bus",
                        endpoint = %endpoint,
                        head = header.number,
                        error = %e,
                        "failed to read block events"
                    );
                    continue;
                }
            };
            trace!(
                target: "bus",
                head = header.number,
                observed = observed.block_number,
                events = observed.events.len(),
                "new head"
            );
            if let Some(ready) = delay.push(observed) {
                bus_metrics().inc_block_events_emitted(&endpoint);
                // No subscribers is not an error.
                let _ = tx.send(ready);
            }
        }

        warn!(
            target: "bus",
            endpoint = %endpoint,
            retry_in_ms = backoff.as_millis() as u64,
            "head subscription ended"
        );
        tokio::time::sleep(backoff).await;
        backoff = backoff.saturating_mul(2).min(MAX_RESUBSCRIBE_BACKOFF);
    }
}

/// Adapts a broadcast receiver, skipping over items a slow subscriber missed.
fn receiver_stream<T: Clone + Send + 'static>(
    endpoint: String,
    rx: broadcast::Receiver<T>,
) -> EventStream<T> {
    stream::unfold((endpoint, rx), |(endpoint, mut rx)| async move {
        loop {
            match rx.recv().await {
                Ok(item) => return Some((item, (endpoint, rx))),
                Err(RecvError::Lagged(count)) => {
                    warn!(target: "bus", endpoint = %endpoint, skipped = count, "subscriber lagged");
                    bus_metrics().inc_lagged_items(count);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_types::app::RuntimeEvent;

    fn block(number: u64, n_events: usize) -> BlockEvents {
        BlockEvents {
            block_number: number,
            events: (0..n_events)
                .map(|i| EventRecord::in_extrinsic(i as u32, RuntimeEvent::ExtrinsicSuccess))
                .collect(),
        }
    }

    #[test]
    fn delay_releases_previous_block_on_next() {
        let mut delay = OneBlockDelay::default();
        assert!(delay.push(block(1, 1)).is_none());
        let released = delay.push(block(2, 2)).unwrap();
        assert_eq!(released.block_number, 1);
        let released = delay.push(block(3, 1)).unwrap();
        assert_eq!(released.block_number, 2);
        assert_eq!(released.events.len(), 2);
    }

    #[test]
    fn delay_ignores_repeated_and_stale_reads() {
        let mut delay = OneBlockDelay::default();
        assert!(delay.push(block(5, 1)).is_none());
        assert!(delay.push(block(5, 1)).is_none());
        let released = delay.push(block(6, 1)).unwrap();
        assert_eq!(released.block_number, 5);
        assert!(delay.push(block(6, 1)).is_none());
        assert!(delay.push(block(4, 2)).is_none());
        assert_eq!(delay.push(block(7, 0)).unwrap().block_number, 6);
    }

    #[test]
    fn delay_swallows_empty_sets() {
        let mut delay = OneBlockDelay::default();
        delay.push(block(1, 0));
        assert!(delay.push(block(2, 3)).is_none());
        assert_eq!(delay.push(block(3, 0)).unwrap().block_number, 2);
        assert!(delay.push(block(4, 0)).is_none());
    }
}
