// Path: crates/types/src/app/events.rs

use super::{Address, Balance};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The stage of block execution during which an event was deposited.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum Phase {
    /// Applying the extrinsic at the given index in the block.
    ApplyExtrinsic(u32),
    /// Finalizing the block.
    Finalization,
    /// Initializing the block.
    Initialization,
}

/// Token-related dispatch failures.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum TokenError {
    /// The account cannot pay for the operation.
    FundsUnavailable,
    /// The account would be reaped below the existential deposit.
    OnlyProvider,
    /// The amount is below the minimum.
    BelowMinimum,
    /// The asset is frozen.
    Frozen,
}

/// The reason a dispatched call failed on-chain.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum DispatchError {
    /// A pallet-specific error.
    Module {
        /// The pallet that raised the error.
        pallet: String,
        /// The error name within the pallet.
        error: String,
    },
    /// The origin was not permitted to dispatch the call.
    BadOrigin,
    /// An account lookup failed.
    CannotLookup,
    /// A token operation failed.
    Token(TokenError),
    /// Any other failure, with a description.
    Other(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Module { pallet, error } => write!(f, "{}.{}", pallet, error),
            DispatchError::BadOrigin => write!(f, "BadOrigin"),
            DispatchError::CannotLookup => write!(f, "CannotLookup"),
            DispatchError::Token(e) => write!(f, "Token({:?})", e),
            DispatchError::Other(s) => write!(f, "Other({})", s),
        }
    }
}

/// A runtime event. Events the orchestration core interprets are modeled
/// explicitly; everything else is carried as `Other`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum RuntimeEvent {
    /// `system.ExtrinsicSuccess`.
    ExtrinsicSuccess,
    /// `system.ExtrinsicFailed`: the extrinsic was included but its dispatch failed.
    ExtrinsicFailed {
        /// The dispatch failure.
        error: DispatchError,
    },
    /// `proxy.ProxyExecuted`: the proxied inner call ran with this result.
    ProxyExecuted {
        /// The result of the inner call.
        result: Result<(), DispatchError>,
    },
    /// `multisig.MultisigExecuted`: the threshold was met and the inner call ran.
    MultisigExecuted {
        /// The multisig account that executed.
        multisig: Address,
        /// The result of the inner call.
        result: Result<(), DispatchError>,
    },
    /// `multisig.NewMultisig`: the first approval of a multisig operation.
    NewMultisig {
        /// The approving signer.
        approving: Address,
        /// The multisig account.
        multisig: Address,
        /// The hash of the pending call.
        call_hash: [u8; 32],
    },
    /// `utility.BatchInterrupted`: a `batch` stopped at `index`.
    BatchInterrupted {
        /// The index of the failed item.
        index: u32,
        /// The failure of that item.
        error: DispatchError,
    },
    /// `utility.BatchCompleted`.
    BatchCompleted,
    /// `balances.Transfer`.
    Transfer {
        /// The sender.
        from: Address,
        /// The receiver.
        to: Address,
        /// The amount moved.
        amount: Balance,
    },
    /// Any event the core does not interpret.
    Other {
        /// The pallet name.
        pallet: String,
        /// The event name.
        name: String,
        /// The raw SCALE-encoded event data.
        data: Vec<u8>,
    },
}

impl RuntimeEvent {
    /// The `pallet.Name` identifier of the event.
    pub fn name(&self) -> String {
        match self {
            RuntimeEvent::ExtrinsicSuccess => "system.ExtrinsicSuccess".into(),
            RuntimeEvent::ExtrinsicFailed { .. } => "system.ExtrinsicFailed".into(),
            RuntimeEvent::ProxyExecuted { .. } => "proxy.ProxyExecuted".into(),
            RuntimeEvent::MultisigExecuted { .. } => "multisig.MultisigExecuted".into(),
            RuntimeEvent::NewMultisig { .. } => "multisig.NewMultisig".into(),
            RuntimeEvent::BatchInterrupted { .. } => "utility.BatchInterrupted".into(),
            RuntimeEvent::BatchCompleted => "utility.BatchCompleted".into(),
            RuntimeEvent::Transfer { .. } => "balances.Transfer".into(),
            RuntimeEvent::Other { pallet, name, .. } => format!("{}.{}", pallet, name),
        }
    }

    /// Returns the dispatch failure this event signals, if any.
    ///
    /// A wrapper call can be accepted by the chain while the call it wraps fails,
    /// so proxy and multisig execution results are inspected as well as the
    /// top-level `ExtrinsicFailed`.
    pub fn failure(&self) -> Option<&DispatchError> {
        match self {
            RuntimeEvent::ExtrinsicFailed { error } => Some(error),
            RuntimeEvent::ProxyExecuted { result: Err(error) } => Some(error),
            RuntimeEvent::MultisigExecuted {
                result: Err(error), ..
            } => Some(error),
            RuntimeEvent::BatchInterrupted { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// An event together with the phase in which it was deposited.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct EventRecord {
    /// When in the block the event was deposited.
    pub phase: Phase,
    /// The event itself.
    pub event: RuntimeEvent,
}

impl EventRecord {
    /// Creates an event deposited while applying extrinsic `index`.
    pub fn in_extrinsic(index: u32, event: RuntimeEvent) -> Self {
        Self {
            phase: Phase::ApplyExtrinsic(index),
            event,
        }
    }

    /// Returns true if the event belongs to extrinsic `index`.
    pub fn is_for_extrinsic(&self, index: u32) -> bool {
        self.phase == Phase::ApplyExtrinsic(index)
    }
}

/// All events deposited in one block.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct BlockEvents {
    /// The block number the events belong to.
    pub block_number: u64,
    /// The events in deposit order.
    pub events: Vec<EventRecord>,
}

impl BlockEvents {
    /// Returns true if the block deposited no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module_err() -> DispatchError {
        DispatchError::Module {
            pallet: "pools".into(),
            error: "NotAllowed".into(),
        }
    }

    #[test]
    fn failure_detects_inner_proxy_error() {
        let ok = RuntimeEvent::ProxyExecuted { result: Ok(()) };
        let bad = RuntimeEvent::ProxyExecuted {
            result: Err(module_err()),
        };
        assert!(ok.failure().is_none());
        assert_eq!(bad.failure(), Some(&module_err()));
    }

    #[test]
    fn failure_ignores_unrelated_events() {
        assert!(RuntimeEvent::ExtrinsicSuccess.failure().is_none());
        assert!(RuntimeEvent::BatchCompleted.failure().is_none());
        let other = RuntimeEvent::Other {
            pallet: "loans".into(),
            name: "Borrowed".into(),
            data: vec![],
        };
        assert!(other.failure().is_none());
        assert_eq!(other.name(), "loans.Borrowed");
    }

    #[test]
    fn record_phase_matching() {
        let rec = EventRecord::in_extrinsic(3, RuntimeEvent::ExtrinsicSuccess);
        assert!(rec.is_for_extrinsic(3));
        assert!(!rec.is_for_extrinsic(2));
        assert_eq!(module_err().to_string(), "pools.NotAllowed");
    }
}
