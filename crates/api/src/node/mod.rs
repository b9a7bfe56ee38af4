// Path: crates/api/src/node/mod.rs
//! Defines the node connection surface the orchestration core consumes.

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt::Debug;
use std::sync::Arc;
use waypoint_types::app::{
    Address, Balance, BlockEvents, BlockHeader, Call, ChainProperties, FeeEstimate,
    SignedExtrinsic, TxProgress,
};
use waypoint_types::error::NodeError;

/// A stream of items pushed by the node; an `Err` item reports a broken subscription.
pub type NodeStream<T> = BoxStream<'static, Result<T, NodeError>>;

/// A live handle to a chain node's RPC and state-query surface.
///
/// Implementations are expected to reconnect transparently; the core treats
/// every method as a single round-trip that may fail with a `NodeError`.
#[async_trait]
pub trait NodeApi: Send + Sync + Debug {
    /// The endpoint URL this handle is connected to.
    fn endpoint(&self) -> &str;

    /// Token metadata for rendering balances.
    async fn chain_properties(&self) -> Result<ChainProperties, NodeError>;

    /// The free balance of `who` at the current head.
    async fn free_balance(&self, who: &Address) -> Result<Balance, NodeError>;

    /// The next nonce of `who`, including pooled transactions.
    async fn account_nonce(&self, who: &Address) -> Result<u64, NodeError>;

    /// Estimates the inclusion fee of `call` if signed by `signer`.
    async fn payment_info(&self, call: &Call, signer: &Address) -> Result<FeeEstimate, NodeError>;

    /// Submits a signed extrinsic and watches its pool status.
    async fn submit_and_watch(
        &self,
        extrinsic: SignedExtrinsic,
    ) -> Result<NodeStream<TxProgress>, NodeError>;

    /// Subscribes to new chain heads.
    async fn subscribe_new_heads(&self) -> Result<NodeStream<BlockHeader>, NodeError>;

    /// Reads the events and the block number from current state.
    ///
    /// When called upon receipt of a new head, the storage read may still reflect
    /// the previous block; the event bus compensates for that.
    async fn block_events(&self) -> Result<BlockEvents, NodeError>;
}

/// Connects to node endpoints, producing live `NodeApi` handles.
#[async_trait]
pub trait NodeProvider: Send + Sync + Debug {
    /// Returns a live handle for `url`, connecting if necessary.
    async fn connect(&self, url: &str) -> Result<Arc<dyn NodeApi>, NodeError>;
}
