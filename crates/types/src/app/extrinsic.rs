// Path: crates/types/src/app/extrinsic.rs

use super::{Address, Balance, BlockHash, Call, EventRecord, TxHash};
use crate::error::TransactionError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The validity window of a signature.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
#[serde(rename_all = "snake_case")]
pub enum Era {
    /// Valid forever.
    #[default]
    Immortal,
    /// Valid for `period` blocks from the signing block.
    Mortal {
        /// The number of blocks the signature remains valid for.
        period: u64,
    },
}

/// Everything a signer commits to when signing an extrinsic.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct SignerPayload {
    /// The fully composed call.
    pub call: Call,
    /// The signature validity window.
    pub era: Era,
    /// The signer's account nonce.
    pub nonce: u64,
}

impl SignerPayload {
    /// The canonical bytes handed to the signer.
    pub fn to_sign_bytes(&self) -> Vec<u8> {
        self.encode()
    }
}

/// A signed, ready-to-broadcast extrinsic.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct SignedExtrinsic {
    /// The account that signed.
    pub signer: Address,
    /// The fully composed call.
    pub call: Call,
    /// The signature validity window.
    pub era: Era,
    /// The signer's account nonce.
    pub nonce: u64,
    /// The signature over the `SignerPayload` bytes.
    pub signature: Vec<u8>,
}

impl SignedExtrinsic {
    /// The hash that identifies this extrinsic in the transaction pool.
    pub fn hash(&self) -> TxHash {
        Sha256::digest(self.encode()).into()
    }
}

/// The dispatch class reported by fee estimation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
#[serde(rename_all = "camelCase")]
pub enum DispatchClass {
    /// A regular user transaction.
    #[default]
    Normal,
    /// An operational transaction.
    Operational,
    /// A mandatory inherent.
    Mandatory,
}

/// The node's estimate of what including a call will cost.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
#[serde(rename_all = "camelCase")]
pub struct FeeEstimate {
    /// The dispatch class of the call.
    pub class: DispatchClass,
    /// The inclusion fee, excluding any tip.
    pub partial_fee: Balance,
    /// The estimated weight of the call.
    pub weight: u64,
}

/// A chain header as pushed by the head subscription.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct BlockHeader {
    /// The block number.
    pub number: u64,
    /// The block hash.
    pub hash: BlockHash,
    /// The parent block hash.
    pub parent_hash: BlockHash,
}

/// Transaction pool status as reported by the node's submit-and-watch subscription.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum TxStatus {
    /// Waiting on an earlier nonce.
    Future,
    /// Ready for inclusion.
    Ready,
    /// Gossiped to peers.
    Broadcast,
    /// Included in the given block.
    InBlock(BlockHash),
    /// The including block was retracted.
    Retracted(BlockHash),
    /// Finality was not reached within the watch window.
    FinalityTimeout(BlockHash),
    /// The including block was finalized.
    Finalized(BlockHash),
    /// Replaced by another extrinsic with the same nonce.
    Usurped(TxHash),
    /// Dropped from the pool.
    Dropped,
    /// Declared invalid by the pool.
    Invalid,
}

impl TxStatus {
    /// Returns true if the transaction can no longer be included.
    pub fn is_rejection(&self) -> bool {
        matches!(self, TxStatus::Usurped(_) | TxStatus::Dropped | TxStatus::Invalid)
    }
}

/// One update from the node about a watched extrinsic.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct TxProgress {
    /// The pool status.
    pub status: TxStatus,
    /// The index of the extrinsic within its block, once included.
    pub extrinsic_index: Option<u32>,
    /// All events of the including block, once included.
    pub events: Vec<EventRecord>,
    /// A dispatch error the node already extracted, if any.
    pub dispatch_error: Option<super::DispatchError>,
}

impl TxProgress {
    /// A progress update carrying only a status.
    pub fn status(status: TxStatus) -> Self {
        Self {
            status,
            extrinsic_index: None,
            events: Vec::new(),
            dispatch_error: None,
        }
    }

    /// The events deposited by this extrinsic, selected by its block index.
    pub fn own_events(&self) -> Vec<EventRecord> {
        match self.extrinsic_index {
            Some(index) => self
                .events
                .iter()
                .filter(|r| r.is_for_extrinsic(index))
                .cloned()
                .collect(),
            None => self.events.clone(),
        }
    }
}

/// The lifecycle of one submission as observed by its caller.
///
/// Exactly one terminal state is emitted per submission: `Estimated`, `Signed`,
/// `Failed`, `Finalized`, or `InBlock` when finalization is not awaited.
#[derive(Debug, Clone)]
pub enum SubmissionStatus {
    /// The call was composed and passed preflight; signing is next.
    Created {
        /// The hash of the composed call.
        call_hash: TxHash,
    },
    /// The node accepted the extrinsic into its pool.
    Broadcast {
        /// The extrinsic hash.
        tx_hash: TxHash,
    },
    /// The extrinsic was included without any dispatch failure.
    InBlock {
        /// The including block.
        block_hash: BlockHash,
        /// The events this extrinsic deposited.
        events: Vec<EventRecord>,
    },
    /// The including block was finalized.
    Finalized {
        /// The finalized block.
        block_hash: BlockHash,
    },
    /// Estimate-only mode result.
    Estimated(FeeEstimate),
    /// Sign-only mode result.
    Signed(SignedExtrinsic),
    /// The submission failed.
    Failed(TransactionError),
}

impl SubmissionStatus {
    /// Returns true for states that always end the stream.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Finalized { .. }
                | SubmissionStatus::Estimated(_)
                | SubmissionStatus::Signed(_)
                | SubmissionStatus::Failed(_)
        )
    }

    /// A short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionStatus::Created { .. } => "created",
            SubmissionStatus::Broadcast { .. } => "broadcast",
            SubmissionStatus::InBlock { .. } => "in_block",
            SubmissionStatus::Finalized { .. } => "finalized",
            SubmissionStatus::Estimated(_) => "estimated",
            SubmissionStatus::Signed(_) => "signed",
            SubmissionStatus::Failed(_) => "failed",
        }
    }
}
