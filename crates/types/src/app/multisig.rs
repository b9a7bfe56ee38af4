// Path: crates/types/src/app/multisig.rs

use super::Address;
use crate::config::MultisigSpec;
use parity_scale_codec::Encode;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Domain separator mixed into every derived multisig address.
const MULTISIG_DERIVATION_PREFIX: &[u8] = b"modlpy/utilisuba";

/// A virtual N-of-M account whose address is derived from its signer set and threshold.
///
/// The fields are only reachable through [`MultisigAccount::new`], so the signer
/// set is canonical and the address always matches it. The serialized form is
/// a [`MultisigSpec`]; the address is derived again on the way in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(from = "MultisigSpec", into = "MultisigSpec")]
pub struct MultisigAccount {
    address: Address,
    signers: Vec<Address>,
    threshold: u16,
}

impl MultisigAccount {
    /// Canonicalizes the signer set and derives the multisig address.
    pub fn new(signers: impl IntoIterator<Item = Address>, threshold: u16) -> Self {
        let signers = sort_addresses(signers);
        let address = derive_multisig_address(&signers, threshold);
        Self {
            address,
            signers,
            threshold,
        }
    }

    /// The derived account address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The signers, sorted and deduplicated.
    pub fn signers(&self) -> &[Address] {
        &self.signers
    }

    /// The number of approvals required.
    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Returns true if `who` is one of the signers.
    pub fn has_signer(&self, who: &Address) -> bool {
        self.signers.binary_search(who).is_ok()
    }

    /// Every signer except `local`, in canonical order.
    pub fn other_signatories(&self, local: &Address) -> Vec<Address> {
        self.signers
            .iter()
            .filter(|s| *s != local)
            .copied()
            .collect()
    }
}

/// Sorts and deduplicates addresses into the canonical signer order.
pub fn sort_addresses(addresses: impl IntoIterator<Item = Address>) -> Vec<Address> {
    let mut out: Vec<Address> = addresses.into_iter().collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Derives the multisig address for an already sorted signer set.
fn derive_multisig_address(sorted_signers: &[Address], threshold: u16) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(MULTISIG_DERIVATION_PREFIX);
    hasher.update(sorted_signers.encode());
    hasher.update(threshold.to_le_bytes());
    Address(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(n: u8) -> Address {
        Address([n; 32])
    }

    #[test]
    fn address_is_independent_of_signer_order() {
        let x = MultisigAccount::new([a(2), a(1), a(3)], 2);
        let y = MultisigAccount::new([a(3), a(2), a(1), a(1)], 2);
        assert_eq!(x, y);
        assert_eq!(x.signers(), &[a(1), a(2), a(3)]);
    }

    #[test]
    fn threshold_changes_address() {
        let x = MultisigAccount::new([a(1), a(2)], 1);
        let y = MultisigAccount::new([a(1), a(2)], 2);
        assert_ne!(x.address(), y.address());
    }

    #[test]
    fn deserialized_address_is_derived_from_signers() {
        let m = MultisigAccount::new([a(2), a(1)], 2);
        let json = serde_json::to_string(&m).unwrap();
        assert!(!json.contains("address"));
        let back: MultisigAccount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);

        // A forged address has nowhere to go: it is ignored and derived again.
        let forged = format!(
            "{{\"address\":\"{}\",\"signers\":[\"{}\",\"{}\"],\"threshold\":2}}",
            a(9),
            a(2),
            a(1)
        );
        let back: MultisigAccount = serde_json::from_str(&forged).unwrap();
        assert_eq!(back.address(), m.address());
    }

    #[test]
    fn other_signatories_excludes_local() {
        let m = MultisigAccount::new([a(3), a(1), a(2)], 2);
        assert_eq!(m.other_signatories(&a(2)), vec![a(1), a(3)]);
        assert!(m.has_signer(&a(3)));
        assert!(!m.has_signer(&a(4)));
    }
}
