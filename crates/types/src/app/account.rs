// Path: crates/types/src/app/account.rs

use super::{Address, MultisigAccount, ProxyEdge};
use serde::{Deserialize, Serialize};

/// An account a user may transact as: a signing account plus the delegation
/// layers (proxy chain and/or multisig) that lead to the acting address.
///
/// The acting address is always computed from the other fields, never stored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CombinedAccount {
    /// The account whose key signs the extrinsic.
    pub signing_account: Address,
    /// The proxy chain, ordered from the signer outwards.
    pub proxies: Option<Vec<ProxyEdge>>,
    /// The multisig the signer approves through, if any.
    pub multisig: Option<MultisigAccount>,
}

impl CombinedAccount {
    /// The signing account acting as itself.
    pub fn direct(signing_account: Address) -> Self {
        Self {
            signing_account,
            proxies: None,
            multisig: None,
        }
    }

    /// The address the chain ultimately authorizes: the last proxy delegator,
    /// else the multisig address, else the signing account itself.
    pub fn acting_address(&self) -> Address {
        if let Some(last) = self.proxies.as_ref().and_then(|p| p.last()) {
            return last.delegator;
        }
        if let Some(multi) = &self.multisig {
            return multi.address();
        }
        self.signing_account
    }

    /// The delegator of every proxy hop, in order.
    pub fn proxy_delegators(&self) -> Vec<Address> {
        self.proxies
            .iter()
            .flatten()
            .map(|edge| edge.delegator)
            .collect()
    }

    /// Returns true if this entry matches a persisted account selection.
    pub fn matches_selection(
        &self,
        signing_account: &Address,
        proxy_delegators: Option<&[Address]>,
        multisig: Option<&Address>,
    ) -> bool {
        if &self.signing_account != signing_account {
            return false;
        }
        if self.multisig.as_ref().map(|m| m.address()) != multisig.copied() {
            return false;
        }
        match (&self.proxies, proxy_delegators) {
            (None, None) => true,
            (Some(_), Some(wanted)) => self.proxy_delegators() == wanted,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ProxyKind;

    fn a(n: u8) -> Address {
        Address([n; 32])
    }

    #[test]
    fn acting_address_prefers_proxy_then_multisig() {
        let multi = MultisigAccount::new([a(1), a(2)], 2);
        let mut acc = CombinedAccount::direct(a(1));
        assert_eq!(acc.acting_address(), a(1));

        acc.multisig = Some(multi.clone());
        assert_eq!(acc.acting_address(), multi.address());

        acc.proxies = Some(vec![ProxyEdge::new(a(7), multi.address(), ProxyKind::Any)]);
        assert_eq!(acc.acting_address(), a(7));
    }

    #[test]
    fn selection_requires_identical_layers() {
        let acc = CombinedAccount {
            signing_account: a(1),
            proxies: Some(vec![
                ProxyEdge::new(a(2), a(1), ProxyKind::Any),
                ProxyEdge::new(a(3), a(2), ProxyKind::Any),
            ]),
            multisig: None,
        };
        assert!(acc.matches_selection(&a(1), Some(&[a(2), a(3)]), None));
        assert!(!acc.matches_selection(&a(1), Some(&[a(2)]), None));
        assert!(!acc.matches_selection(&a(1), None, None));
        assert!(!acc.matches_selection(&a(9), Some(&[a(2), a(3)]), None));
    }
}
