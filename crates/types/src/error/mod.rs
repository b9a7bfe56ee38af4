// Path: crates/types/src/error/mod.rs
//! Core error types for Waypoint.

use crate::app::{Address, DispatchError};
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors raised by a node connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// The node answered an RPC call with an error.
    #[error("RPC error: {0}")]
    Rpc(String),
    /// The connection to the node could not be established or was lost.
    #[error("Connection error: {0}")]
    Connection(String),
    /// A subscription ended before it produced what was awaited.
    #[error("Subscription closed by the node")]
    SubscriptionClosed,
    /// A node response could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ErrorCode for NodeError {
    fn code(&self) -> &'static str {
        match self {
            Self::Rpc(_) => "NODE_RPC_ERROR",
            Self::Connection(_) => "NODE_CONNECTION_ERROR",
            Self::SubscriptionClosed => "NODE_SUBSCRIPTION_CLOSED",
            Self::Decode(_) => "NODE_DECODE_ERROR",
        }
    }
}

/// Errors raised by a signing capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    /// The signer holds no key for the requested address.
    #[error("No key available for address {0}")]
    UnknownAddress(Address),
    /// The signer refused or failed to sign (e.g. the user cancelled).
    #[error("Signing rejected: {0}")]
    Rejected(String),
}

impl ErrorCode for SignerError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownAddress(_) => "SIGNER_UNKNOWN_ADDRESS",
            Self::Rejected(_) => "SIGNER_REJECTED",
        }
    }
}

/// Errors related to preparing, submitting and tracking a transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// The signer's free balance does not exceed the estimated fee.
    #[error("{token} balance too low: balance {balance}, fee {fee}")]
    InsufficientBalance {
        /// The signer's free balance.
        balance: u128,
        /// The estimated inclusion fee.
        fee: u128,
        /// The native token symbol.
        token: String,
    },
    /// The extrinsic was included but its dispatch (or an inner call's) failed.
    #[error("Dispatch failed: {0}")]
    DispatchFailed(DispatchError),
    /// The node refused the extrinsic or dropped it from its pool.
    #[error("Broadcast rejected: {0}")]
    BroadcastRejected(String),
    /// No signing capability is configured for the required address.
    #[error("No signer set")]
    NoSigner,
    /// Send-only mode broadcasts an extrinsic that was signed beforehand, never a bare call.
    #[error("Send-only mode needs an already signed extrinsic")]
    SignedExtrinsicRequired,
    /// The signing capability failed.
    #[error("Signer error: {0}")]
    Signing(#[from] SignerError),
    /// The node connection failed.
    #[error("Node error: {0}")]
    Node(#[from] NodeError),
    /// An encoding error occurred.
    #[error("Codec error: {0}")]
    Codec(String),
}

impl ErrorCode for TransactionError {
    fn code(&self) -> &'static str {
        match self {
            Self::InsufficientBalance { .. } => "TX_INSUFFICIENT_BALANCE",
            Self::DispatchFailed(_) => "TX_DISPATCH_FAILED",
            Self::BroadcastRejected(_) => "TX_BROADCAST_REJECTED",
            Self::NoSigner => "TX_NO_SIGNER",
            Self::SignedExtrinsicRequired => "TX_SIGNED_EXTRINSIC_REQUIRED",
            Self::Signing(_) => "TX_SIGNING_FAILED",
            Self::Node(_) => "TX_NODE_ERROR",
            Self::Codec(_) => "TX_CODEC_ERROR",
        }
    }
}

impl TransactionError {
    /// Returns true if the caller can fix the cause and retry (e.g. by funding the account).
    ///
    /// Dispatch failures are not retryable: the extrinsic already consumed its nonce.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientBalance { .. } | Self::Node(_))
    }
}

/// Errors related to loading client configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid TOML for the expected schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration parsed but is semantically invalid.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "CONFIG_IO_ERROR",
            Self::Parse(_) => "CONFIG_PARSE_ERROR",
            Self::Invalid(_) => "CONFIG_INVALID",
        }
    }
}
