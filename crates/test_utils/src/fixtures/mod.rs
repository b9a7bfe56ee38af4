//! Deterministic fixtures for addresses, delegation edges and events.

use waypoint_types::app::{
    Address, BlockEvents, DispatchError, EventRecord, MultisigAccount, ProxyEdge, ProxyKind,
    RuntimeEvent, TxProgress, TxStatus,
};

/// The address whose 32 bytes are all `n`.
pub fn addr(n: u8) -> Address {
    Address([n; 32])
}

/// An `Any` proxy edge letting `delegatee` act for `delegator`.
pub fn edge(delegator: Address, delegatee: Address) -> ProxyEdge {
    ProxyEdge::new(delegator, delegatee, ProxyKind::Any)
}

/// A linear chain where each address may act for the next: `chain[0]` is the
/// innermost delegatee, and the last entry the outermost delegator.
pub fn proxy_chain(chain: &[Address]) -> Vec<ProxyEdge> {
    chain
        .windows(2)
        .filter_map(|pair| match pair {
            [delegatee, delegator] => Some(edge(*delegator, *delegatee)),
            _ => None,
        })
        .collect()
}

/// A multisig over `signers` with the given threshold.
pub fn multisig(signers: &[Address], threshold: u16) -> MultisigAccount {
    MultisigAccount::new(signers.iter().copied(), threshold)
}

/// A `pallet.Name` event without data, deposited by extrinsic `index`.
pub fn other_event(index: u32, pallet: &str, name: &str) -> EventRecord {
    EventRecord::in_extrinsic(
        index,
        RuntimeEvent::Other {
            pallet: pallet.to_string(),
            name: name.to_string(),
            data: Vec::new(),
        },
    )
}

/// A module error raised by `pallet`.
pub fn module_error(pallet: &str, error: &str) -> DispatchError {
    DispatchError::Module {
        pallet: pallet.to_string(),
        error: error.to_string(),
    }
}

/// The events of block `number`.
pub fn block(number: u64, events: Vec<EventRecord>) -> BlockEvents {
    BlockEvents {
        block_number: number,
        events,
    }
}

/// An in-block update for extrinsic `index` of the block hashed `[h; 32]`.
pub fn included(h: u8, index: u32, events: Vec<EventRecord>) -> TxProgress {
    TxProgress {
        status: TxStatus::InBlock([h; 32]),
        extrinsic_index: Some(index),
        events,
        dispatch_error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_links_each_address_to_the_next() {
        let edges = proxy_chain(&[addr(1), addr(2), addr(3)]);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].delegatee, addr(1));
        assert_eq!(edges[0].delegator, addr(2));
        assert_eq!(edges[1].delegatee, addr(2));
        assert_eq!(edges[1].delegator, addr(3));
    }
}
