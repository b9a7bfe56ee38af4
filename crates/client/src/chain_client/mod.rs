// Path: crates/client/src/chain_client/mod.rs

//! The façade applications hold: configuration, signer, default proxies and
//! the shared event bus behind one handle.

use crate::accounts::resolve_acting_addresses;
use crate::bus::{ChainEvents, EventBus, EventStream};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};
use waypoint_api::delegation::DelegationSource;
use waypoint_api::events::CompletionSink;
use waypoint_api::node::{NodeApi, NodeProvider};
use waypoint_api::signer::Signer;
use waypoint_tx::{compose, Submission, Submitter};
use waypoint_types::app::{
    Address, BlockEvents, Call, CombinedAccount, EventRecord, FeeEstimate, MultisigAccount,
    SignedExtrinsic,
};
use waypoint_types::config::{ClientConfig, ProxySpec, TransactionOptions};
use waypoint_types::error::{ConfigError, NodeError, TransactionError};

#[derive(Clone)]
struct SignerSlot {
    signer: Arc<dyn Signer>,
    address: Address,
}

/// A client for one configured network.
pub struct ChainClient {
    config: ClientConfig,
    bus: Arc<EventBus>,
    signer: RwLock<Option<SignerSlot>>,
    proxies: RwLock<Option<Vec<ProxySpec>>>,
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("network", &self.config.network)
            .field("signer", &self.signer_address())
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl ChainClient {
    /// Creates a client with its own event bus.
    pub fn new(config: ClientConfig, provider: Arc<dyn NodeProvider>) -> Result<Self, ConfigError> {
        Self::with_bus(config, Arc::new(EventBus::new(provider)))
    }

    /// Creates a client sharing an existing event bus.
    pub fn with_bus(config: ClientConfig, bus: Arc<EventBus>) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            network = ?config.network,
            endpoint = config.parachain_url(),
            "chain client configured"
        );
        Ok(Self {
            proxies: RwLock::new(config.proxies.clone()),
            config,
            bus,
            signer: RwLock::new(None),
        })
    }

    /// The configuration in effect.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The shared event bus.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// The EVM-facing chain id of the configured network.
    pub fn chain_id(&self) -> u64 {
        self.config.chain_id()
    }

    /// The live handle of the configured parachain node.
    pub async fn api(&self) -> Result<Arc<dyn NodeApi>, NodeError> {
        self.bus.api(self.config.parachain_url()).await
    }

    /// The live handle of the configured relay chain node.
    pub async fn relay_api(&self) -> Result<Arc<dyn NodeApi>, NodeError> {
        self.bus.api(self.config.relay_chain_url()).await
    }

    /// Sets the signing capability and the address it signs for.
    pub fn set_signer(&self, signer: Arc<dyn Signer>, address: Address) {
        *self.signer.write().unwrap_or_else(PoisonError::into_inner) =
            Some(SignerSlot { signer, address });
    }

    /// Removes the signing capability.
    pub fn clear_signer(&self) {
        *self.signer.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The address submissions are signed by, if a signer is set.
    pub fn signer_address(&self) -> Option<Address> {
        self.signer_slot().map(|s| s.address)
    }

    fn signer_slot(&self) -> Option<SignerSlot> {
        self.signer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn require_signer(&self) -> Result<SignerSlot, TransactionError> {
        self.signer_slot().ok_or(TransactionError::NoSigner)
    }

    /// Sets the proxy hops used by transactions that do not name their own.
    pub fn set_proxies(&self, proxies: Vec<ProxySpec>) {
        debug!(hops = proxies.len(), "default proxies set");
        *self.proxies.write().unwrap_or_else(PoisonError::into_inner) = Some(proxies);
    }

    /// Drops the default proxy hops.
    pub fn clear_proxies(&self) {
        *self.proxies.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The default proxy hops.
    pub fn proxies(&self) -> Option<Vec<ProxySpec>> {
        self.proxies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fills in client-level defaults the options leave open.
    fn effective_options(&self, mut options: TransactionOptions) -> TransactionOptions {
        if options.proxies.is_none() {
            options.proxies = self.proxies();
        }
        options.wait_for_finalization |= self.config.wait_for_finalization;
        options
    }

    /// The address a transaction with `options` would act as.
    pub fn acting_address(&self, options: TransactionOptions) -> Result<Address, TransactionError> {
        let slot = self.require_signer()?;
        Ok(compose::acting_address(
            &self.effective_options(options),
            &slot.address,
        ))
    }

    /// Submits `call` with `options` and the client defaults.
    pub async fn submit(&self, call: Call, options: TransactionOptions) -> Submission {
        let slot = match self.require_signer() {
            Ok(slot) => slot,
            Err(e) => return Submission::failed(e),
        };
        let api = match self.api().await {
            Ok(api) => api,
            Err(e) => return Submission::failed(e.into()),
        };
        let sink: Arc<dyn CompletionSink> = self.bus.clone();
        Submitter::new(api, slot.signer, slot.address, sink)
            .completion_key(self.config.parachain_url())
            .print_extrinsics(self.config.print_extrinsics)
            .debug(self.config.debug)
            .submit(call, self.effective_options(options))
    }

    /// Broadcasts an extrinsic signed earlier, in send-only mode. No signer is
    /// needed; completions still reach the bus.
    pub async fn send_raw(&self, extrinsic: SignedExtrinsic, options: TransactionOptions) -> Submission {
        let api = match self.api().await {
            Ok(api) => api,
            Err(e) => return Submission::failed(e.into()),
        };
        let sink: Arc<dyn CompletionSink> = self.bus.clone();
        Submitter::relay(api, extrinsic.signer, sink)
            .completion_key(self.config.parachain_url())
            .print_extrinsics(self.config.print_extrinsics)
            .debug(self.config.debug)
            .send_raw(extrinsic, self.effective_options(options))
    }

    /// Estimates the fee of `call` once composed with `options`.
    pub async fn estimate_fee(
        &self,
        call: Call,
        options: TransactionOptions,
    ) -> Result<FeeEstimate, TransactionError> {
        let slot = self.require_signer()?;
        let composed = compose::compose(call, &self.effective_options(options), &slot.address);
        let api = self.api().await?;
        waypoint_tx::estimate_fee(api.as_ref(), &composed, &slot.address).await
    }

    /// Checks that the signer can pay for `call` once composed with `options`.
    pub async fn check_affordability(
        &self,
        call: Call,
        options: TransactionOptions,
    ) -> Result<FeeEstimate, TransactionError> {
        let slot = self.require_signer()?;
        let composed = compose::compose(call, &self.effective_options(options), &slot.address);
        let api = self.api().await?;
        waypoint_tx::check_affordability(api.as_ref(), &composed, &slot.address).await
    }

    /// Block events and completions of the parachain, merged.
    pub async fn events(&self) -> Result<EventStream<ChainEvents>, NodeError> {
        self.bus.events(self.config.parachain_url()).await
    }

    /// The delayed block event stream of the parachain.
    pub async fn block_events(&self) -> Result<EventStream<BlockEvents>, NodeError> {
        self.bus.block_events(self.config.parachain_url()).await
    }

    /// Completions of local submissions on the parachain.
    pub fn completions(&self) -> EventStream<Vec<EventRecord>> {
        self.bus.completions(self.config.parachain_url())
    }

    /// Resolves the accounts the current signer may act as. Without a signer
    /// there is nothing to resolve.
    pub async fn resolve_acting_addresses(
        &self,
        source: &dyn DelegationSource,
        multisigs: &[MultisigAccount],
    ) -> Result<Vec<CombinedAccount>, NodeError> {
        let Some(address) = self.signer_address() else {
            return Ok(Vec::new());
        };
        resolve_acting_addresses(source, &[address], multisigs, self.config.max_proxy_depth).await
    }
}
