// Path: crates/types/src/config/mod.rs

//! Shared configuration structures for the client and individual transactions.
use crate::app::{Address, Balance, Era, MultisigAccount, ProxyKind};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The deepest proxy chain explored by delegation resolution, by default.
pub const DEFAULT_MAX_PROXY_DEPTH: usize = 3;

/// Selects which network (and therefore which node endpoints) the client talks to.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// The main network, secured by the Polkadot relay chain.
    #[default]
    Centrifuge,
    /// The canary network, secured by the Kusama relay chain.
    Altair,
}

/// One proxy hop to wrap a call in: act as `delegator`, optionally forcing a proxy kind.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ProxySpec {
    /// The account to act on behalf of.
    pub delegator: Address,
    /// Restricts the proxy relationship used to this kind, if set.
    #[serde(default)]
    pub force_proxy_type: Option<ProxyKind>,
}

impl From<Address> for ProxySpec {
    fn from(delegator: Address) -> Self {
        Self {
            delegator,
            force_proxy_type: None,
        }
    }
}

impl From<(Address, Option<ProxyKind>)> for ProxySpec {
    fn from((delegator, force_proxy_type): (Address, Option<ProxyKind>)) -> Self {
        Self {
            delegator,
            force_proxy_type,
        }
    }
}

/// The multisig a call is approved through.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MultisigSpec {
    /// All signers, in any order; the local signer included.
    pub signers: Vec<Address>,
    /// The number of approvals required.
    pub threshold: u16,
}

impl MultisigSpec {
    /// Canonicalizes the signer set and derives the multisig account.
    pub fn compute(&self) -> MultisigAccount {
        MultisigAccount::new(self.signers.iter().copied(), self.threshold)
    }
}

impl From<&MultisigAccount> for MultisigSpec {
    fn from(m: &MultisigAccount) -> Self {
        Self {
            signers: m.signers().to_vec(),
            threshold: m.threshold(),
        }
    }
}

impl From<MultisigAccount> for MultisigSpec {
    fn from(m: MultisigAccount) -> Self {
        Self::from(&m)
    }
}

impl From<MultisigSpec> for MultisigAccount {
    fn from(spec: MultisigSpec) -> Self {
        spec.compute()
    }
}

/// How far a submission proceeds. The variants are mutually exclusive.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TxMode {
    /// Preflight, sign, broadcast and watch for inclusion.
    #[default]
    Submit,
    /// Broadcast an extrinsic signed beforehand, without the balance check,
    /// signing, or the in-block failure scan.
    SendOnly,
    /// Preflight and sign, but do not broadcast.
    SignOnly,
    /// Only estimate the fee of the composed call.
    PaymentInfo,
}

/// Per-transaction composition and submission options.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct TransactionOptions {
    /// Proxy hops starting at the signer; the last delegator is the acting address.
    /// `None` defers to the client's defaults.
    #[serde(default)]
    pub proxies: Option<Vec<ProxySpec>>,
    /// The multisig to approve through.
    #[serde(default)]
    pub multisig: Option<MultisigSpec>,
    /// Prefix the call with a transfer of this amount to the acting address.
    #[serde(default)]
    pub transfer_to_acting_address: Option<Balance>,
    /// How far the submission proceeds.
    #[serde(default)]
    pub mode: TxMode,
    /// The signature validity window.
    #[serde(default)]
    pub era: Era,
    /// Keep watching after inclusion until the block is finalized.
    #[serde(default)]
    pub wait_for_finalization: bool,
}

impl TransactionOptions {
    /// Options for the given mode with everything else defaulted.
    pub fn with_mode(mode: TxMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Sets the proxy hops.
    pub fn proxies<P: Into<ProxySpec>>(mut self, proxies: impl IntoIterator<Item = P>) -> Self {
        self.proxies = Some(proxies.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the multisig.
    pub fn multisig(mut self, signers: Vec<Address>, threshold: u16) -> Self {
        self.multisig = Some(MultisigSpec { signers, threshold });
        self
    }

    /// Sets the funding transfer to the acting address.
    pub fn transfer_to_acting_address(mut self, amount: Balance) -> Self {
        self.transfer_to_acting_address = Some(amount);
        self
    }
}

fn default_centrifuge_ws_url() -> String {
    "wss://fullnode.parachain.centrifuge.io".to_string()
}
fn default_altair_ws_url() -> String {
    "wss://fullnode.altair.centrifuge.io".to_string()
}
fn default_polkadot_ws_url() -> String {
    "wss://rpc.polkadot.io".to_string()
}
fn default_kusama_ws_url() -> String {
    "wss://kusama-rpc.polkadot.io".to_string()
}
fn default_max_proxy_depth() -> usize {
    DEFAULT_MAX_PROXY_DEPTH
}

/// Client-wide configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// The network to connect to.
    #[serde(default)]
    pub network: Network,
    /// Node endpoint of the main network parachain.
    #[serde(default = "default_centrifuge_ws_url")]
    pub centrifuge_ws_url: String,
    /// Node endpoint of the canary network parachain.
    #[serde(default = "default_altair_ws_url")]
    pub altair_ws_url: String,
    /// Node endpoint of the main network's relay chain.
    #[serde(default = "default_polkadot_ws_url")]
    pub polkadot_ws_url: String,
    /// Node endpoint of the canary network's relay chain.
    #[serde(default = "default_kusama_ws_url")]
    pub kusama_ws_url: String,
    /// Log every composed call in human-readable form.
    #[serde(default)]
    pub print_extrinsics: bool,
    /// Log detected dispatch failures in full.
    #[serde(default)]
    pub debug: bool,
    /// Proxy hops applied when a transaction does not specify its own.
    #[serde(default)]
    pub proxies: Option<Vec<ProxySpec>>,
    /// The deepest proxy chain explored by delegation resolution.
    #[serde(default = "default_max_proxy_depth")]
    pub max_proxy_depth: usize,
    /// Default for `TransactionOptions::wait_for_finalization` in client-built options.
    #[serde(default)]
    pub wait_for_finalization: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            centrifuge_ws_url: default_centrifuge_ws_url(),
            altair_ws_url: default_altair_ws_url(),
            polkadot_ws_url: default_polkadot_ws_url(),
            kusama_ws_url: default_kusama_ws_url(),
            print_extrinsics: false,
            debug: false,
            proxies: None,
            max_proxy_depth: default_max_proxy_depth(),
            wait_for_finalization: false,
        }
    }
}

impl ClientConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Rejects configurations the client cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_proxy_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_proxy_depth must be at least 1".into(),
            ));
        }
        if self.parachain_url().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "no parachain endpoint configured for {:?}",
                self.network
            )));
        }
        Ok(())
    }

    /// The parachain node endpoint for the selected network.
    pub fn parachain_url(&self) -> &str {
        match self.network {
            Network::Centrifuge => &self.centrifuge_ws_url,
            Network::Altair => &self.altair_ws_url,
        }
    }

    /// The relay chain node endpoint for the selected network.
    pub fn relay_chain_url(&self) -> &str {
        match self.network {
            Network::Centrifuge => &self.polkadot_ws_url,
            Network::Altair => &self.kusama_ws_url,
        }
    }

    /// The EVM-facing chain id of the selected network.
    pub fn chain_id(&self) -> u64 {
        match self.network {
            Network::Centrifuge => 36,
            Network::Altair => 136,
        }
    }
}
