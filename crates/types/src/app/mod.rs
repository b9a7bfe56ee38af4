// Path: crates/types/src/app/mod.rs
//! Core application-level data structures.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The runtime call tree and its human-readable rendering.
pub mod call;
/// Combined (signing + acting) accounts produced by delegation resolution.
pub mod account;
/// Runtime events and their per-extrinsic phases.
pub mod events;
/// Signed extrinsics, node-side transaction progress and submission status.
pub mod extrinsic;
/// Deterministic multisig account derivation.
pub mod multisig;
/// Proxy relationships between accounts.
pub mod proxy;

pub use account::CombinedAccount;
pub use call::{Call, Timepoint};
pub use events::{BlockEvents, DispatchError, EventRecord, Phase, RuntimeEvent, TokenError};
pub use extrinsic::{
    BlockHeader, DispatchClass, Era, FeeEstimate, SignedExtrinsic, SignerPayload,
    SubmissionStatus, TxProgress, TxStatus,
};
pub use multisig::{sort_addresses, MultisigAccount};
pub use proxy::{ProxyEdge, ProxyKind};

/// An amount of the native token in its smallest unit.
pub type Balance = u128;

/// A 32-byte block hash.
pub type BlockHash = [u8; 32];

/// A 32-byte hash of an encoded call or extrinsic.
pub type TxHash = [u8; 32];

/// A 32-byte on-chain account identifier.
///
/// Addresses are displayed and parsed as `0x`-prefixed lowercase hex, and their
/// byte order is the canonical sort order used wherever signer sets must be
/// agreed upon by several parties.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Encode, Decode, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 32]);

impl Address {
    /// Returns the raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns a shortened `0x1234…abcd` form for log lines.
    pub fn short(&self) -> String {
        format!(
            "0x{}…{}",
            hex::encode(&self.0[..2]),
            hex::encode(&self.0[30..])
        )
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.short())
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| format!("invalid address hex: {}", e))?;
        let len = bytes.len();
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| format!("invalid address length: expected 32 bytes, got {}", len))?;
        Ok(Self(array))
    }
}

impl TryFrom<String> for Address {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

/// Token metadata reported by the node, used to render balances for humans.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChainProperties {
    /// The ticker of the native token (e.g. "CFG").
    pub token_symbol: String,
    /// The number of decimals of the native token.
    pub token_decimals: u8,
}

impl Default for ChainProperties {
    fn default() -> Self {
        Self {
            token_symbol: "CFG".to_string(),
            token_decimals: 18,
        }
    }
}

impl ChainProperties {
    /// Formats a raw balance as a decimal string with the token's precision.
    pub fn format_balance(&self, amount: Balance) -> String {
        let unit = 10u128.saturating_pow(u32::from(self.token_decimals));
        if unit <= 1 {
            return format!("{} {}", amount, self.token_symbol);
        }
        let whole = amount / unit;
        let frac = amount % unit;
        let frac = format!("{:0width$}", frac, width = usize::from(self.token_decimals));
        let frac = frac.trim_end_matches('0');
        if frac.is_empty() {
            format!("{} {}", whole, self.token_symbol)
        } else {
            format!("{}.{} {}", whole, frac, self.token_symbol)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_hex_roundtrip_and_serde() {
        let addr = Address([0xab; 32]);
        let s = addr.to_string();
        assert!(s.starts_with("0xabab"));
        assert_eq!(s.parse::<Address>().unwrap(), addr);

        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", s));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn address_rejects_wrong_length() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert!(err.contains("expected 32 bytes"));
    }

    #[test]
    fn format_balance_trims_fraction() {
        let props = ChainProperties::default();
        assert_eq!(props.format_balance(1_500_000_000_000_000_000), "1.5 CFG");
        assert_eq!(props.format_balance(2_000_000_000_000_000_000), "2 CFG");
        let raw = ChainProperties {
            token_symbol: "X".into(),
            token_decimals: 0,
        };
        assert_eq!(raw.format_balance(7), "7 X");
    }
}
