// Path: crates/client/src/accounts/mod.rs

//! Resolves the addresses a set of signing accounts may act as.
//!
//! Proxy relationships form a directed graph from delegatee to delegator. The
//! graph can be cyclic, so every traversal is bounded by a maximum chain
//! length rather than by a visited set.

use std::collections::BTreeSet;
use tracing::{debug, trace};
use waypoint_api::delegation::{DelegationSource, ProxySnapshot};
use waypoint_types::app::{Address, CombinedAccount, MultisigAccount, ProxyEdge};
use waypoint_types::config::DEFAULT_MAX_PROXY_DEPTH;
use waypoint_types::error::NodeError;

/// The longest proxy chain explored unless configured otherwise.
pub const MAX_PROXY_DEPTH: usize = DEFAULT_MAX_PROXY_DEPTH;

fn outgoing<'a>(snapshot: &'a ProxySnapshot, from: &Address) -> &'a [ProxyEdge] {
    snapshot.get(from).map(Vec::as_slice).unwrap_or(&[])
}

/// Every proxy chain of at most `max_depth` hops starting at `root`.
///
/// A chain is the ordered list of edges from `root` outwards: the first edge
/// lets `root` act for its delegator, the next lets that delegator act for
/// another, and so on. Chains are returned in pre-order, each prefix before
/// its extensions, following the snapshot's edge order at every level.
pub fn find_proxy_sequences(
    snapshot: &ProxySnapshot,
    root: &Address,
    max_depth: usize,
) -> Vec<Vec<ProxyEdge>> {
    let mut sequences = Vec::new();
    if max_depth == 0 {
        return sequences;
    }

    // Reversed pushes keep the pops in edge order.
    let mut stack: Vec<Vec<ProxyEdge>> = outgoing(snapshot, root).iter().rev().map(|e| vec![*e]).collect();
    while let Some(sequence) = stack.pop() {
        if let Some(last) = sequence.last() {
            if sequence.len() < max_depth {
                for next in outgoing(snapshot, &last.delegator).iter().rev() {
                    let mut extended = sequence.clone();
                    extended.push(*next);
                    stack.push(extended);
                }
            }
        }
        sequences.push(sequence);
    }
    sequences
}

/// Builds the selectable accounts for `signing_accounts`.
///
/// Per signing account, in order: the account itself, each proxy chain from
/// it, then for each multisig it belongs to, the multisig and each proxy chain
/// rooted at the multisig address.
pub fn combined_accounts(
    signing_accounts: &[Address],
    multisigs: &[MultisigAccount],
    snapshot: &ProxySnapshot,
    max_depth: usize,
) -> Vec<CombinedAccount> {
    let mut out = Vec::new();
    for signing_account in signing_accounts {
        out.push(CombinedAccount::direct(*signing_account));
        out.extend(
            find_proxy_sequences(snapshot, signing_account, max_depth)
                .into_iter()
                .map(|chain| CombinedAccount {
                    signing_account: *signing_account,
                    proxies: Some(chain),
                    multisig: None,
                }),
        );

        for multi in multisigs.iter().filter(|m| m.has_signer(signing_account)) {
            out.push(CombinedAccount {
                signing_account: *signing_account,
                proxies: None,
                multisig: Some(multi.clone()),
            });
            out.extend(
                find_proxy_sequences(snapshot, &multi.address(), max_depth)
                    .into_iter()
                    .map(|chain| CombinedAccount {
                        signing_account: *signing_account,
                        proxies: Some(chain),
                        multisig: Some(multi.clone()),
                    }),
            );
        }
    }
    out
}

/// Finds the entry matching a persisted selection: same signing account, same
/// multisig, and the same delegator list (or none on both sides).
pub fn select_combined_account<'a>(
    accounts: &'a [CombinedAccount],
    signing_account: &Address,
    proxy_delegators: Option<&[Address]>,
    multisig: Option<&Address>,
) -> Option<&'a CombinedAccount> {
    accounts
        .iter()
        .find(|a| a.matches_selection(signing_account, proxy_delegators, multisig))
}

/// Fetches the delegation graph around `signing_accounts` and `multisigs` and
/// builds their combined accounts.
///
/// The first round queries the accounts and multisig addresses themselves;
/// each following round queries the delegators discovered in the previous
/// one, up to `max_depth` rounds. An address is queried at most once.
pub async fn resolve_acting_addresses(
    source: &dyn DelegationSource,
    signing_accounts: &[Address],
    multisigs: &[MultisigAccount],
    max_depth: usize,
) -> Result<Vec<CombinedAccount>, NodeError> {
    let mut snapshot = ProxySnapshot::new();
    let mut queried = BTreeSet::new();
    let mut frontier: BTreeSet<Address> = signing_accounts
        .iter()
        .copied()
        .chain(multisigs.iter().map(|m| m.address()))
        .collect();

    for round in 0..max_depth {
        let batch: Vec<Address> = frontier
            .into_iter()
            .filter(|a| queried.insert(*a))
            .collect();
        if batch.is_empty() {
            break;
        }
        let fetched = source.proxies(&batch).await?;
        trace!(target: "accounts", round, queried = batch.len(), found = fetched.len(), "fetched proxies");

        frontier = fetched
            .values()
            .flatten()
            .map(|edge| edge.delegator)
            .collect();
        for (delegatee, edges) in fetched {
            snapshot.entry(delegatee).or_default().extend(edges);
        }
    }

    let accounts = combined_accounts(signing_accounts, multisigs, &snapshot, max_depth);
    debug!(
        target: "accounts",
        signing = signing_accounts.len(),
        multisigs = multisigs.len(),
        resolved = accounts.len(),
        "resolved acting addresses"
    );
    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_test_utils::fixtures::{addr, edge, multisig, proxy_chain};
    use waypoint_test_utils::randomness::TestRng;
    use waypoint_test_utils::{assert_depth_bounded, assert_ok};
    use waypoint_test_utils::mock_node::StaticDelegationSource;

    fn snapshot(edges: impl IntoIterator<Item = ProxyEdge>) -> ProxySnapshot {
        let mut s = ProxySnapshot::new();
        for e in edges {
            s.entry(e.delegatee).or_default().push(e);
        }
        s
    }

    #[test]
    fn two_hop_chain_yields_prefix_then_extension() {
        // A may act for B, and B for C.
        let s = snapshot(proxy_chain(&[addr(0xA), addr(0xB), addr(0xC)]));
        let seqs = find_proxy_sequences(&s, &addr(0xA), MAX_PROXY_DEPTH);
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[0], vec![edge(addr(0xB), addr(0xA))]);
        assert_eq!(
            seqs[1],
            vec![edge(addr(0xB), addr(0xA)), edge(addr(0xC), addr(0xB))]
        );
        assert_eq!(seqs[1].last().unwrap().delegator, addr(0xC));
    }

    #[test]
    fn four_hop_chain_is_cut_at_depth() {
        let s = snapshot(proxy_chain(&[addr(1), addr(2), addr(3), addr(4), addr(5)]));
        let seqs = find_proxy_sequences(&s, &addr(1), MAX_PROXY_DEPTH);
        assert_eq!(seqs.len(), 3);
        assert_depth_bounded!(seqs, MAX_PROXY_DEPTH);
        assert!(seqs.iter().all(|q| q.last().unwrap().delegator != addr(5)));
    }

    #[test]
    fn cycles_terminate_and_keep_duplicates() {
        // 1 and 2 may act for each other.
        let s = snapshot([edge(addr(2), addr(1)), edge(addr(1), addr(2))]);
        let seqs = find_proxy_sequences(&s, &addr(1), MAX_PROXY_DEPTH);
        let acting: Vec<_> = seqs.iter().map(|q| q.last().unwrap().delegator).collect();
        assert_eq!(acting, vec![addr(2), addr(1), addr(2)]);
    }

    #[test]
    fn pre_order_follows_edge_order() {
        let s = snapshot([
            edge(addr(2), addr(1)),
            edge(addr(3), addr(1)),
            edge(addr(4), addr(2)),
        ]);
        let seqs = find_proxy_sequences(&s, &addr(1), MAX_PROXY_DEPTH);
        let acting: Vec<_> = seqs.iter().map(|q| q.last().unwrap().delegator).collect();
        assert_eq!(acting, vec![addr(2), addr(4), addr(3)]);
    }

    #[test]
    fn random_graphs_stay_bounded() {
        let mut rng = TestRng::with_default_seed();
        for _ in 0..20 {
            let (nodes, edges) = rng.proxy_graph(6, 14);
            let s = snapshot(edges);
            for root in &nodes {
                let seqs = find_proxy_sequences(&s, root, MAX_PROXY_DEPTH);
                assert_depth_bounded!(seqs, MAX_PROXY_DEPTH);
                for q in &seqs {
                    assert_eq!(&q[0].delegatee, root);
                    for pair in q.windows(2) {
                        assert_eq!(pair[1].delegatee, pair[0].delegator);
                    }
                }
            }
        }
    }

    #[test]
    fn combined_accounts_order() {
        let m = multisig(&[addr(1), addr(7)], 2);
        let s = snapshot([edge(addr(2), addr(1)), edge(addr(9), m.address())]);
        let out = combined_accounts(&[addr(1)], &[m.clone(), multisig(&[addr(8), addr(7)], 1)], &s, 3);

        let acting: Vec<_> = out.iter().map(|c| c.acting_address()).collect();
        assert_eq!(acting, vec![addr(1), addr(2), m.address(), addr(9)]);
        assert!(out.iter().all(|c| c.signing_account == addr(1)));
        assert_eq!(out[3].multisig.as_ref(), Some(&m));
    }

    #[test]
    fn selection_matches_delegators_and_multisig() {
        let s = snapshot(proxy_chain(&[addr(1), addr(2), addr(3)]));
        let out = combined_accounts(&[addr(1)], &[], &s, 3);
        let chosen = select_combined_account(&out, &addr(1), Some(&[addr(2), addr(3)][..]), None).unwrap();
        assert_eq!(chosen.acting_address(), addr(3));
        let direct = select_combined_account(&out, &addr(1), None, None).unwrap();
        assert!(direct.proxies.is_none());
        assert!(select_combined_account(&out, &addr(1), Some(&[addr(3)][..]), None).is_none());
    }

    #[tokio::test]
    async fn resolution_fetches_nested_delegators_once() {
        let source = StaticDelegationSource::new(proxy_chain(&[
            addr(1),
            addr(2),
            addr(3),
            addr(4),
            addr(5),
        ]));
        let out = assert_ok!(resolve_acting_addresses(&source, &[addr(1)], &[], 3).await);
        let acting: Vec<_> = out.iter().map(|c| c.acting_address()).collect();
        assert_eq!(acting, vec![addr(1), addr(2), addr(3), addr(4)]);
        assert_eq!(
            source.queries(),
            vec![vec![addr(1)], vec![addr(2)], vec![addr(3)]]
        );
    }

    #[tokio::test]
    async fn resolution_includes_multisig_addresses_in_first_round() {
        let m = multisig(&[addr(1), addr(2)], 2);
        let source = StaticDelegationSource::new([edge(addr(6), m.address())]);
        let out = assert_ok!(resolve_acting_addresses(&source, &[addr(1)], &[m.clone()], 3).await);
        let acting: Vec<_> = out.iter().map(|c| c.acting_address()).collect();
        assert_eq!(acting, vec![addr(1), m.address(), addr(6)]);
        assert!(source.queries()[0].contains(&m.address()));
    }
}
