// Path: crates/client/tests/submission.rs

use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use waypoint_client::ChainClient;
use waypoint_test_utils::fixtures::{addr, included, module_error, other_event};
use waypoint_test_utils::mock_node::{MockNode, MockProvider, MockSigner};
use waypoint_test_utils::{assert_err, assert_labels, assert_ok};
use waypoint_types::app::{Call, EventRecord, RuntimeEvent, SubmissionStatus};
use waypoint_types::config::{ClientConfig, ProxySpec, TransactionOptions, TxMode};
use waypoint_types::error::TransactionError;

const WAIT: Duration = Duration::from_secs(2);

fn setup() -> (Arc<MockNode>, ChainClient) {
    let config = ClientConfig::default();
    let node = Arc::new(MockNode::new(config.parachain_url()));
    node.set_fee(1_000);
    node.set_balance(addr(1), 1_000_000);
    let provider = Arc::new(MockProvider::new());
    provider.register(node.clone());
    let client = assert_ok!(ChainClient::new(config, provider));
    client.set_signer(Arc::new(MockSigner::new([addr(1)])), addr(1));
    (node, client)
}

fn call() -> Call {
    Call::runtime("investments", "update_invest_order", vec![1, 2, 3])
}

#[tokio::test]
async fn submission_without_signer_fails_immediately() {
    let (node, client) = setup();
    client.clear_signer();
    let err = assert_err!(
        client
            .submit(call(), TransactionOptions::default())
            .await
            .finished()
            .await
    );
    assert_eq!(err, TransactionError::NoSigner);
    assert_eq!(err.to_string(), "No signer set");
    assert!(node.submitted().is_empty());
}

#[tokio::test]
async fn included_submission_publishes_completion_before_block_stream() {
    let (node, client) = setup();
    let mut completions = client.completions();
    node.script_progress(vec![included(
        7,
        0,
        vec![
            other_event(0, "investments", "InvestOrderUpdated"),
            EventRecord::in_extrinsic(0, RuntimeEvent::ExtrinsicSuccess),
        ],
    )]);

    let statuses: Vec<_> = client
        .submit(call(), TransactionOptions::default())
        .await
        .collect()
        .await;
    assert_labels!(statuses, ["created", "broadcast", "in_block"]);

    let published = timeout(WAIT, completions.next()).await.unwrap().unwrap();
    assert_eq!(published.len(), 2);
    assert_eq!(node.block_events_calls(), 0);
}

#[tokio::test]
async fn inner_failure_never_publishes() {
    let (node, client) = setup();
    let mut completions = client.completions();
    node.script_progress(vec![included(
        7,
        0,
        vec![EventRecord::in_extrinsic(
            0,
            RuntimeEvent::BatchInterrupted {
                index: 1,
                error: module_error("investments", "OrderNotFound"),
            },
        )],
    )]);

    let err = assert_err!(
        client
            .submit(call(), TransactionOptions::default().transfer_to_acting_address(5))
            .await
            .finished()
            .await
    );
    assert!(matches!(err, TransactionError::DispatchFailed(_)));
    assert!(timeout(Duration::from_millis(50), completions.next())
        .await
        .is_err());
}

#[tokio::test]
async fn default_proxies_apply_unless_overridden() {
    let (node, client) = setup();
    client.set_proxies(vec![ProxySpec::from(addr(5))]);
    assert_eq!(
        client.acting_address(TransactionOptions::default()).unwrap(),
        addr(5)
    );

    node.script_progress(vec![included(1, 0, vec![])]);
    node.script_progress(vec![included(2, 0, vec![])]);

    assert_ok!(
        client
            .submit(call(), TransactionOptions::default())
            .await
            .finished()
            .await
    );
    let opted_out = TransactionOptions {
        proxies: Some(vec![]),
        ..Default::default()
    };
    assert_ok!(client.submit(call(), opted_out).await.finished().await);

    let submitted = node.submitted();
    assert_eq!(submitted[0].call.method(), "proxy");
    assert_eq!(submitted[1].call, call());

    client.clear_proxies();
    assert_eq!(
        client.acting_address(TransactionOptions::default()).unwrap(),
        addr(1)
    );
}

#[tokio::test]
async fn signed_extrinsic_is_sent_later_without_signer_or_preflight() {
    let (node, client) = setup();
    let mut completions = client.completions();
    let signed = match assert_ok!(
        client
            .submit(call(), TransactionOptions::with_mode(TxMode::SignOnly))
            .await
            .finished()
            .await
    ) {
        SubmissionStatus::Signed(x) => x,
        other => panic!("unexpected: {:?}", other),
    };
    let preflight_reads = (node.payment_info_calls(), node.balance_calls());

    client.clear_signer();
    node.set_balance(addr(1), 0);
    node.script_progress(vec![included(3, 0, vec![other_event(0, "pools", "Updated")])]);
    let status = assert_ok!(
        client
            .send_raw(signed.clone(), TransactionOptions::default())
            .await
            .finished()
            .await
    );
    assert_eq!(status.label(), "in_block");
    assert_eq!(node.submitted(), vec![signed]);
    assert_eq!((node.payment_info_calls(), node.balance_calls()), preflight_reads);
    assert!(timeout(WAIT, completions.next()).await.unwrap().is_some());
}

#[tokio::test]
async fn send_only_mode_needs_a_signed_extrinsic() {
    let (node, client) = setup();
    let err = assert_err!(
        client
            .submit(call(), TransactionOptions::with_mode(TxMode::SendOnly))
            .await
            .finished()
            .await
    );
    assert_eq!(err, TransactionError::SignedExtrinsicRequired);
    assert!(node.submitted().is_empty());
}

#[tokio::test]
async fn completions_follow_the_configured_url_not_the_node_report() {
    let config = ClientConfig::default();
    // The node reports its endpoint with a trailing slash.
    let node = Arc::new(MockNode::new(format!("{}/", config.parachain_url())));
    node.set_fee(1);
    node.set_balance(addr(1), 1_000);
    let provider = Arc::new(MockProvider::new());
    provider.register_as(config.parachain_url(), node.clone());
    let client = assert_ok!(ChainClient::new(config, provider));
    client.set_signer(Arc::new(MockSigner::new([addr(1)])), addr(1));

    let mut completions = client.completions();
    node.script_progress(vec![included(1, 0, vec![])]);
    assert_ok!(
        client
            .submit(call(), TransactionOptions::default())
            .await
            .finished()
            .await
    );
    assert!(timeout(WAIT, completions.next()).await.unwrap().is_some());
}

#[tokio::test]
async fn affordability_is_checked_on_the_composed_call() {
    let (node, client) = setup();
    node.set_balance(addr(1), 1_000);
    let err = assert_err!(
        client
            .check_affordability(call(), TransactionOptions::default())
            .await
    );
    assert!(err.to_string().starts_with("CFG balance too low"));

    let fee = assert_ok!(client.estimate_fee(call(), TransactionOptions::default()).await);
    assert_eq!(fee.partial_fee, 1_000);
}

#[tokio::test]
async fn dropping_a_submission_stops_tracking() {
    let (node, client) = setup();
    node.script_progress(vec![included(4, 0, vec![])]);
    let mut submission = client.submit(call(), TransactionOptions::default()).await;
    let first = timeout(WAIT, submission.next()).await.unwrap().unwrap();
    assert_eq!(first.label(), "created");
    submission.cancel();
}

#[tokio::test]
async fn chain_id_follows_network() {
    let (_, client) = setup();
    assert_eq!(client.chain_id(), 36);
}
