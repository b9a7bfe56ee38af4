// Path: crates/api/src/signer/mod.rs
//! Defines the externally supplied signing capability.

use async_trait::async_trait;
use std::fmt::Debug;
use waypoint_types::app::{Address, SignerPayload};
use waypoint_types::error::SignerError;

/// Signs extrinsic payloads on behalf of one or more addresses.
///
/// Implementations may be a browser extension bridge, a hardware wallet or a
/// raw keypair; the core only requires that the same payload always be signed
/// by the key belonging to `address`.
#[async_trait]
pub trait Signer: Send + Sync + Debug {
    /// Returns true if this signer holds a key for `address`.
    fn can_sign(&self, address: &Address) -> bool;

    /// Signs the canonical bytes of `payload` with the key of `address`.
    async fn sign(&self, address: &Address, payload: &SignerPayload)
        -> Result<Vec<u8>, SignerError>;
}
