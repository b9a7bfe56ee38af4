// Path: crates/types/src/app/proxy.rs

use super::Address;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of calls a proxy is permitted to make on behalf of its delegator.
///
/// Variant order matches the on-chain enum, so the SCALE index of each variant
/// is the value the runtime expects.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub enum ProxyKind {
    /// Any call.
    Any,
    /// Any call except balance transfers.
    NonTransfer,
    /// Governance calls only.
    Governance,
    /// Staking calls only.
    Staking,
    /// Any call except proxy management.
    NonProxy,
    /// Loan borrowing calls.
    Borrow,
    /// Pool investment calls.
    Invest,
    /// Adding and removing proxies.
    ProxyManagement,
    /// Keystore management calls.
    KeystoreManagement,
    /// Pod operation calls.
    PodOperation,
    /// Pod authorization calls.
    PodAuth,
    /// Permission management calls.
    PermissionManagement,
    /// Balance transfers only.
    Transfer,
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A directed delegation edge: `delegatee` may act on behalf of `delegator`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub struct ProxyEdge {
    /// The account whose authority is delegated.
    pub delegator: Address,
    /// The account allowed to submit calls for the delegator.
    pub delegatee: Address,
    /// The category of calls the delegatee may make.
    pub kind: ProxyKind,
    /// The announcement delay (in blocks) the delegatee must observe; zero for none.
    #[serde(default)]
    pub delay: u32,
}

impl ProxyEdge {
    /// Creates an undelayed edge.
    pub fn new(delegator: Address, delegatee: Address, kind: ProxyKind) -> Self {
        Self {
            delegator,
            delegatee,
            kind,
            delay: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_kind_index_matches_chain_enum() {
        assert_eq!(ProxyKind::Any.encode(), vec![0]);
        assert_eq!(ProxyKind::Borrow.encode(), vec![5]);
        assert_eq!(ProxyKind::Transfer.encode(), vec![12]);
    }
}
