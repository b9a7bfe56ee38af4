// Path: crates/api/src/delegation/mod.rs
//! Defines the read-only delegation snapshot fetcher.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::Debug;
use waypoint_types::app::{Address, ProxyEdge};
use waypoint_types::error::NodeError;

/// A snapshot of proxy relationships, keyed by delegatee.
pub type ProxySnapshot = BTreeMap<Address, Vec<ProxyEdge>>;

/// Fetches the proxy relationships of a set of accounts from chain or indexer state.
#[async_trait]
pub trait DelegationSource: Send + Sync + Debug {
    /// Returns, for each of `delegatees` that has any, the edges letting it act for others.
    ///
    /// Delegatees without proxies may be omitted from the result.
    async fn proxies(&self, delegatees: &[Address]) -> Result<ProxySnapshot, NodeError>;
}
