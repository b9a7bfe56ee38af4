// Path: crates/types/src/app/call.rs

use super::{Address, Balance, ProxyKind, TxHash};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// The block height and extrinsic index at which a multisig operation was first approved.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct Timepoint {
    /// The block number containing the first approval.
    pub height: u32,
    /// The extrinsic index of the first approval within that block.
    pub index: u32,
}

/// A runtime call, possibly wrapping other calls.
///
/// Composed calls nest: a `Proxy` or `AsMulti` wraps exactly one inner call and
/// a batch aggregates several. The chain unwraps layers from the outside in, so
/// the outermost variant is the first one the runtime dispatches.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum Call {
    /// An opaque application call, already argument-encoded by the caller.
    Runtime {
        /// The pallet (module) name.
        pallet: String,
        /// The method name within the pallet.
        method: String,
        /// SCALE-encoded arguments.
        args: Vec<u8>,
    },
    /// `balances.transfer`: move `value` from the origin to `dest`.
    Transfer {
        /// The receiving account.
        dest: Address,
        /// The amount transferred.
        value: Balance,
    },
    /// `proxy.proxy`: dispatch `call` with the authority of `real`.
    Proxy {
        /// The delegator whose authority is used.
        real: Address,
        /// Restricts the proxy relationship used to this kind, if set.
        force_proxy_type: Option<ProxyKind>,
        /// The call dispatched as `real`.
        call: Box<Call>,
    },
    /// `multisig.as_multi`: approve and possibly dispatch `call` from a multisig account.
    AsMulti {
        /// The number of approvals required.
        threshold: u16,
        /// Every signer except the submitting one, in canonical order.
        other_signatories: Vec<Address>,
        /// The timepoint of the first approval; `None` for the first approval.
        maybe_timepoint: Option<Timepoint>,
        /// The call dispatched once the threshold is met.
        call: Box<Call>,
        /// The maximum weight the inner call may consume.
        max_weight: u64,
    },
    /// `utility.batch`: dispatch calls in order, stopping at the first failure.
    Batch(Vec<Call>),
    /// `utility.batch_all`: dispatch calls in order, reverting all on any failure.
    BatchAll(Vec<Call>),
}

impl Call {
    /// Convenience constructor for an opaque application call.
    pub fn runtime(pallet: impl Into<String>, method: impl Into<String>, args: Vec<u8>) -> Self {
        Call::Runtime {
            pallet: pallet.into(),
            method: method.into(),
            args,
        }
    }

    /// The pallet name of the outermost layer.
    pub fn section(&self) -> &str {
        match self {
            Call::Runtime { pallet, .. } => pallet,
            Call::Transfer { .. } => "balances",
            Call::Proxy { .. } => "proxy",
            Call::AsMulti { .. } => "multisig",
            Call::Batch(_) | Call::BatchAll(_) => "utility",
        }
    }

    /// The method name of the outermost layer.
    pub fn method(&self) -> &str {
        match self {
            Call::Runtime { method, .. } => method,
            Call::Transfer { .. } => "transfer",
            Call::Proxy { .. } => "proxy",
            Call::AsMulti { .. } => "asMulti",
            Call::Batch(_) => "batch",
            Call::BatchAll(_) => "batchAll",
        }
    }

    /// The canonical SCALE encoding of the whole call tree.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode()
    }

    /// The size in bytes of the encoded call.
    pub fn encoded_len(&self) -> usize {
        self.encoded_size()
    }

    /// The call hash multisig co-signers agree on: SHA-256 over the encoding.
    pub fn hash(&self) -> TxHash {
        Sha256::digest(self.encode()).into()
    }

    /// Returns the inner call of a single-call wrapper (`Proxy` or `AsMulti`).
    pub fn inner(&self) -> Option<&Call> {
        match self {
            Call::Proxy { call, .. } | Call::AsMulti { call, .. } => Some(call),
            _ => None,
        }
    }

    /// Renders the call in the `section.method(args)` form, batches one inner call per line.
    pub fn describe(&self) -> String {
        match self {
            Call::Batch(calls) | Call::BatchAll(calls) => {
                let mut out = format!("utility.{}([\n", self.method());
                for call in calls {
                    out.push('\t');
                    out.push_str(&call.to_string());
                    out.push('\n');
                }
                out.push_str("])");
                out
            }
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.section(), self.method())?;
        match self {
            Call::Runtime { args, .. } => write!(f, "0x{}", hex::encode(args))?,
            Call::Transfer { dest, value } => write!(f, "{}, {}", dest, value)?,
            Call::Proxy {
                real,
                force_proxy_type,
                call,
            } => {
                let kind = force_proxy_type
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "None".to_string());
                write!(f, "{}, {}, {}", real, kind, call)?
            }
            Call::AsMulti {
                threshold,
                other_signatories,
                call,
                ..
            } => {
                let signers: Vec<String> =
                    other_signatories.iter().map(|s| s.to_string()).collect();
                write!(f, "{}, [{}], None, {}, 0", threshold, signers.join(", "), call)?
            }
            Call::Batch(calls) | Call::BatchAll(calls) => {
                let inner: Vec<String> = calls.iter().map(|c| c.to_string()).collect();
                write!(f, "[{}]", inner.join(", "))?
            }
        }
        write!(f, ")")
    }
}
