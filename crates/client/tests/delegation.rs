// Path: crates/client/tests/delegation.rs

use std::sync::Arc;
use waypoint_client::{select_combined_account, ChainClient};
use waypoint_test_utils::assert_ok;
use waypoint_test_utils::fixtures::{addr, edge, multisig, proxy_chain};
use waypoint_test_utils::mock_node::{MockNode, MockProvider, MockSigner, StaticDelegationSource};
use waypoint_types::config::{ClientConfig, TransactionOptions};

fn client(config: ClientConfig) -> ChainClient {
    let node = Arc::new(MockNode::new(config.parachain_url()));
    let provider = Arc::new(MockProvider::new());
    provider.register(node);
    let client = assert_ok!(ChainClient::new(config, provider));
    client.set_signer(Arc::new(MockSigner::new([addr(0xA)])), addr(0xA));
    client
}

#[tokio::test]
async fn two_hop_chain_resolves_both_sequences() {
    let client = client(ClientConfig::default());
    // A may act for B, B for C.
    let source = StaticDelegationSource::new(proxy_chain(&[addr(0xA), addr(0xB), addr(0xC)]));

    let accounts = assert_ok!(client.resolve_acting_addresses(&source, &[]).await);
    assert_eq!(accounts.len(), 3);
    assert_eq!(accounts[1].proxies.as_deref(), Some(&[edge(addr(0xB), addr(0xA))][..]));
    assert_eq!(accounts[2].acting_address(), addr(0xC));

    // The resolved chain composes into the acting address it advertises.
    let opts = TransactionOptions::default().proxies(accounts[2].proxy_delegators());
    assert_eq!(client.acting_address(opts).unwrap(), addr(0xC));
}

#[tokio::test]
async fn configured_depth_bounds_resolution() {
    let mut config = ClientConfig::default();
    config.max_proxy_depth = 2;
    let client = client(config);
    let source = StaticDelegationSource::new(proxy_chain(&[
        addr(0xA),
        addr(1),
        addr(2),
        addr(3),
        addr(4),
    ]));

    let accounts = assert_ok!(client.resolve_acting_addresses(&source, &[]).await);
    let longest = accounts
        .iter()
        .filter_map(|a| a.proxies.as_ref().map(Vec::len))
        .max();
    assert_eq!(longest, Some(2));
    assert_eq!(source.queries().len(), 2);
}

#[tokio::test]
async fn multisig_accounts_and_persisted_selection() {
    let client = client(ClientConfig::default());
    let m = multisig(&[addr(0xA), addr(0xD)], 2);
    let source = StaticDelegationSource::new([edge(addr(0xE), m.address())]);

    let accounts = assert_ok!(client.resolve_acting_addresses(&source, &[m.clone()]).await);
    let chosen = select_combined_account(
        &accounts,
        &addr(0xA),
        Some(&[addr(0xE)][..]),
        Some(&m.address()),
    )
    .unwrap();
    assert_eq!(chosen.acting_address(), addr(0xE));
    assert_eq!(chosen.multisig.as_ref(), Some(&m));
}

#[tokio::test]
async fn no_signer_resolves_nothing() {
    let client = client(ClientConfig::default());
    client.clear_signer();
    let source = StaticDelegationSource::new(Vec::new());
    assert!(assert_ok!(client.resolve_acting_addresses(&source, &[]).await).is_empty());
    assert!(source.queries().is_empty());
}
