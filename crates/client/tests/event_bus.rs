// Path: crates/client/tests/event_bus.rs

use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use waypoint_api::events::CompletionSink;
use waypoint_client::{EventBus, EventSource};
use waypoint_test_utils::fixtures::other_event;
use waypoint_test_utils::mock_node::{MockNode, MockProvider};

const URL: &str = "ws://bus-test";
const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(50);

fn setup() -> (Arc<MockNode>, EventBus, Arc<MockProvider>) {
    let node = Arc::new(MockNode::new(URL));
    let provider = Arc::new(MockProvider::new());
    provider.register(node.clone());
    let bus = EventBus::new(provider.clone());
    (node, bus, provider)
}

#[tokio::test]
async fn block_events_are_delayed_by_one_block_and_skip_empty_sets() {
    let (node, bus, _) = setup();
    let mut stream = bus.block_events(URL).await.unwrap();

    node.push_block(vec![other_event(0, "pools", "Created")]);
    // Block 1 is held until block 2's header arrives.
    assert!(timeout(QUIET, stream.next()).await.is_err());

    node.push_block(vec![]);
    let first = timeout(WAIT, stream.next()).await.unwrap().unwrap();
    assert_eq!(first.block_number, 1);
    assert_eq!(first.events.len(), 1);

    node.push_block(vec![other_event(1, "loans", "Borrowed")]);
    node.push_block(vec![]);
    // Block 2 was empty and is never emitted.
    let next = timeout(WAIT, stream.next()).await.unwrap().unwrap();
    assert_eq!(next.block_number, 3);
}

#[tokio::test]
async fn subscribers_share_one_connection_and_head_subscription() {
    let (node, bus, provider) = setup();
    let mut a = bus.block_events(URL).await.unwrap();
    let mut b = bus.block_events(URL).await.unwrap();
    let _merged = bus.events(URL).await.unwrap();

    assert_eq!(node.head_subscriptions(), 1);
    assert_eq!(provider.connect_calls(), 1);

    node.push_block(vec![other_event(0, "pools", "Updated")]);
    node.push_block(vec![other_event(0, "pools", "Updated")]);
    let from_a = timeout(WAIT, a.next()).await.unwrap().unwrap();
    let from_b = timeout(WAIT, b.next()).await.unwrap().unwrap();
    assert_eq!(from_a, from_b);
}

#[tokio::test]
async fn ended_head_subscription_is_reopened_for_old_and_new_subscribers() {
    let (node, bus, _) = setup();
    let mut early = bus.block_events(URL).await.unwrap();

    node.push_block(vec![other_event(0, "pools", "Created")]);
    node.close_heads();
    timeout(WAIT, async {
        while node.head_subscriptions() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    let mut late = bus.block_events(URL).await.unwrap();
    assert_eq!(node.head_subscriptions(), 2);

    // Block 1 was held across the gap and is released by block 2.
    node.push_block(vec![other_event(0, "loans", "Borrowed")]);
    node.push_block(vec![]);
    for stream in [&mut early, &mut late] {
        let first = timeout(WAIT, stream.next()).await.unwrap().unwrap();
        let second = timeout(WAIT, stream.next()).await.unwrap().unwrap();
        assert_eq!((first.block_number, second.block_number), (1, 2));
    }
}

#[tokio::test]
async fn completions_reach_merged_stream_without_delay() {
    let (node, bus, _) = setup();
    let mut merged = bus.events(URL).await.unwrap();

    bus.publish(URL, vec![other_event(3, "loans", "Repaid")]);
    let got = timeout(WAIT, merged.next()).await.unwrap().unwrap();
    assert_eq!(got.source, EventSource::Completion);
    assert_eq!(got.events.len(), 1);
    assert_eq!(got.api.endpoint(), URL);
    assert_eq!(node.block_events_calls(), 0);
}

#[tokio::test]
async fn completions_are_scoped_per_endpoint() {
    let (_, bus, _) = setup();
    let mut here = bus.completions(URL);
    let mut there = bus.completions("ws://elsewhere");

    bus.publish(URL, vec![other_event(0, "pools", "Closed")]);
    assert!(timeout(WAIT, here.next()).await.unwrap().is_some());
    assert!(timeout(QUIET, there.next()).await.is_err());
}

#[tokio::test]
async fn unknown_endpoint_fails_to_connect() {
    let (_, bus, _) = setup();
    assert!(bus.block_events("ws://nowhere").await.is_err());
}
