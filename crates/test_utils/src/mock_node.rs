// Path: crates/test_utils/src/mock_node.rs
//! In-memory stand-ins for the node, signer and delegation collaborators.
//!
//! Every mock uses interior mutability so a test can keep an `Arc` to it,
//! hand a clone to the code under test, and keep scripting or inspecting it.

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::StreamExt;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use waypoint_api::delegation::{DelegationSource, ProxySnapshot};
use waypoint_api::node::{NodeApi, NodeProvider, NodeStream};
use waypoint_api::signer::Signer;
use waypoint_types::app::{
    Address, Balance, BlockEvents, BlockHash, BlockHeader, Call, ChainProperties, EventRecord,
    FeeEstimate, ProxyEdge, SignedExtrinsic, SignerPayload, TxProgress,
};
use waypoint_types::error::{NodeError, SignerError};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn block_hash(number: u64) -> BlockHash {
    let mut hash = [0u8; 32];
    for (dst, src) in hash.iter_mut().zip(number.to_be_bytes()) {
        *dst = src;
    }
    hash
}

#[derive(Debug, Default)]
struct NodeState {
    properties: ChainProperties,
    balances: HashMap<Address, Balance>,
    nonces: HashMap<Address, u64>,
    fee: FeeEstimate,
    payment_info_error: Option<String>,
    submit_error: Option<String>,
    progress_scripts: VecDeque<Vec<TxProgress>>,
    submitted: Vec<SignedExtrinsic>,
    head: u64,
    pending_events: VecDeque<BlockEvents>,
    head_feeds: Vec<mpsc::UnboundedSender<Result<BlockHeader, NodeError>>>,
}

/// A scripted node.
///
/// Submissions consume progress scripts in the order they were queued. Each
/// [`MockNode::push_block`] pushes a header to every head subscriber and queues
/// the events the next `block_events` read will return.
#[derive(Debug)]
pub struct MockNode {
    endpoint: String,
    state: Mutex<NodeState>,
    payment_info_calls: AtomicUsize,
    balance_calls: AtomicUsize,
    head_subscriptions: AtomicUsize,
    block_events_calls: AtomicUsize,
}

impl MockNode {
    /// A node at `endpoint` with default chain properties and no accounts.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            state: Mutex::new(NodeState::default()),
            payment_info_calls: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
            head_subscriptions: AtomicUsize::new(0),
            block_events_calls: AtomicUsize::new(0),
        }
    }

    /// Sets the token metadata.
    pub fn set_properties(&self, properties: ChainProperties) {
        lock(&self.state).properties = properties;
    }

    /// Sets the free balance of `who`.
    pub fn set_balance(&self, who: Address, balance: Balance) {
        lock(&self.state).balances.insert(who, balance);
    }

    /// Sets the next nonce of `who`.
    pub fn set_nonce(&self, who: Address, nonce: u64) {
        lock(&self.state).nonces.insert(who, nonce);
    }

    /// Sets the partial fee returned for every call.
    pub fn set_fee(&self, partial_fee: Balance) {
        lock(&self.state).fee.partial_fee = partial_fee;
    }

    /// Makes fee estimation fail with an RPC error.
    pub fn fail_payment_info(&self, message: &str) {
        lock(&self.state).payment_info_error = Some(message.to_string());
    }

    /// Makes every submission fail with an RPC error.
    pub fn fail_submit(&self, message: &str) {
        lock(&self.state).submit_error = Some(message.to_string());
    }

    /// Queues the progress updates the next watched submission will see.
    pub fn script_progress(&self, updates: Vec<TxProgress>) {
        lock(&self.state).progress_scripts.push_back(updates);
    }

    /// Every extrinsic submitted so far, in order.
    pub fn submitted(&self) -> Vec<SignedExtrinsic> {
        lock(&self.state).submitted.clone()
    }

    /// Produces a new block: announces its header and queues `events` as the
    /// state read that follows. Returns the new block number.
    pub fn push_block(&self, events: Vec<EventRecord>) -> u64 {
        let mut state = lock(&self.state);
        state.head += 1;
        let number = state.head;
        state.pending_events.push_back(BlockEvents {
            block_number: number,
            events,
        });
        let header = BlockHeader {
            number,
            hash: block_hash(number),
            parent_hash: block_hash(number - 1),
        };
        state
            .head_feeds
            .retain(|feed| feed.unbounded_send(Ok(header.clone())).is_ok());
        number
    }

    /// Ends every open head subscription.
    pub fn close_heads(&self) {
        lock(&self.state).head_feeds.clear();
    }

    /// Number of fee estimations requested.
    pub fn payment_info_calls(&self) -> usize {
        self.payment_info_calls.load(Ordering::SeqCst)
    }

    /// Number of balance reads.
    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    /// Number of head subscriptions opened.
    pub fn head_subscriptions(&self) -> usize {
        self.head_subscriptions.load(Ordering::SeqCst)
    }

    /// Number of block event reads.
    pub fn block_events_calls(&self) -> usize {
        self.block_events_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeApi for MockNode {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn chain_properties(&self) -> Result<ChainProperties, NodeError> {
        Ok(lock(&self.state).properties.clone())
    }

    async fn free_balance(&self, who: &Address) -> Result<Balance, NodeError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.state).balances.get(who).copied().unwrap_or(0))
    }

    async fn account_nonce(&self, who: &Address) -> Result<u64, NodeError> {
        Ok(lock(&self.state).nonces.get(who).copied().unwrap_or(0))
    }

    async fn payment_info(&self, _call: &Call, _signer: &Address) -> Result<FeeEstimate, NodeError> {
        self.payment_info_calls.fetch_add(1, Ordering::SeqCst);
        let state = lock(&self.state);
        match &state.payment_info_error {
            Some(message) => Err(NodeError::Rpc(message.clone())),
            None => Ok(state.fee),
        }
    }

    async fn submit_and_watch(
        &self,
        extrinsic: SignedExtrinsic,
    ) -> Result<NodeStream<TxProgress>, NodeError> {
        let mut state = lock(&self.state);
        if let Some(message) = &state.submit_error {
            return Err(NodeError::Rpc(message.clone()));
        }
        state.submitted.push(extrinsic);
        let script = state.progress_scripts.pop_front().unwrap_or_default();
        Ok(futures::stream::iter(script.into_iter().map(Ok)).boxed())
    }

    async fn subscribe_new_heads(&self) -> Result<NodeStream<BlockHeader>, NodeError> {
        self.head_subscriptions.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded();
        lock(&self.state).head_feeds.push(tx);
        Ok(rx.boxed())
    }

    async fn block_events(&self) -> Result<BlockEvents, NodeError> {
        self.block_events_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = lock(&self.state);
        let head = state.head;
        Ok(state.pending_events.pop_front().unwrap_or(BlockEvents {
            block_number: head,
            events: Vec::new(),
        }))
    }
}

/// Hands out registered [`MockNode`]s by endpoint.
#[derive(Debug, Default)]
pub struct MockProvider {
    nodes: Mutex<HashMap<String, Arc<MockNode>>>,
    connect_calls: AtomicUsize,
}

impl MockProvider {
    /// An empty provider; unregistered endpoints fail to connect.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `node` under its own endpoint.
    pub fn register(&self, node: Arc<MockNode>) {
        lock(&self.nodes).insert(node.endpoint.clone(), node);
    }

    /// Registers `node` under `url`, which may differ from the endpoint the
    /// node reports, as with a provider that normalises URLs.
    pub fn register_as(&self, url: impl Into<String>, node: Arc<MockNode>) {
        lock(&self.nodes).insert(url.into(), node);
    }

    /// Number of `connect` calls.
    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeProvider for MockProvider {
    async fn connect(&self, url: &str) -> Result<Arc<dyn NodeApi>, NodeError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        match lock(&self.nodes).get(url) {
            Some(node) => Ok(node.clone()),
            None => Err(NodeError::Connection(format!("no node at {}", url))),
        }
    }
}

/// Signs for a fixed set of addresses with a deterministic fake signature.
#[derive(Debug, Default)]
pub struct MockSigner {
    keys: Vec<Address>,
    rejection: Mutex<Option<String>>,
    sign_calls: AtomicUsize,
}

impl MockSigner {
    /// A signer holding keys for `keys`.
    pub fn new(keys: impl IntoIterator<Item = Address>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Makes every signing request fail, as if the user cancelled.
    pub fn reject_with(&self, reason: &str) {
        *lock(&self.rejection) = Some(reason.to_string());
    }

    /// Number of signing requests.
    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Signer for MockSigner {
    fn can_sign(&self, address: &Address) -> bool {
        self.keys.contains(address)
    }

    async fn sign(
        &self,
        address: &Address,
        payload: &SignerPayload,
    ) -> Result<Vec<u8>, SignerError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = lock(&self.rejection).clone() {
            return Err(SignerError::Rejected(reason));
        }
        if !self.can_sign(address) {
            return Err(SignerError::UnknownAddress(*address));
        }
        let mut signature = address.as_bytes().to_vec();
        signature.extend_from_slice(&payload.call.hash());
        signature.extend_from_slice(&payload.nonce.to_le_bytes());
        Ok(signature)
    }
}

/// Serves proxy relationships from a fixed edge list and records every query.
#[derive(Debug, Default)]
pub struct StaticDelegationSource {
    edges: Vec<ProxyEdge>,
    queries: Mutex<Vec<Vec<Address>>>,
}

impl StaticDelegationSource {
    /// A source answering from `edges`.
    pub fn new(edges: impl IntoIterator<Item = ProxyEdge>) -> Self {
        Self {
            edges: edges.into_iter().collect(),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// The delegatee batches queried so far, in order.
    pub fn queries(&self) -> Vec<Vec<Address>> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl DelegationSource for StaticDelegationSource {
    async fn proxies(&self, delegatees: &[Address]) -> Result<ProxySnapshot, NodeError> {
        lock(&self.queries).push(delegatees.to_vec());
        let mut snapshot: ProxySnapshot = BTreeMap::new();
        for edge in &self.edges {
            if delegatees.contains(&edge.delegatee) {
                snapshot.entry(edge.delegatee).or_default().push(*edge);
            }
        }
        Ok(snapshot)
    }
}
