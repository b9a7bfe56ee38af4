// Path: crates/tx/src/compose/mod.rs

//! Wraps a base call in the delegation layers described by `TransactionOptions`.
//!
//! The chain unwraps a composed call from the outside in: batch, then multisig,
//! then each proxy hop, then the base call. Composition therefore applies the
//! layers in the reverse order: proxies innermost, multisig around them, and
//! the funding batch outermost.

use tracing::debug;
use waypoint_types::app::{Address, Call};
use waypoint_types::codec::to_hex_canonical;
use waypoint_types::config::{ProxySpec, TransactionOptions, TxMode};

/// Returns the proxy list if it has at least one hop.
fn proxy_hops(options: &TransactionOptions) -> Option<&[ProxySpec]> {
    options.proxies.as_deref().filter(|p| !p.is_empty())
}

/// The address the composed call ultimately acts as: the last proxy delegator,
/// else the multisig address, else the signer itself.
pub fn acting_address(options: &TransactionOptions, signer: &Address) -> Address {
    if let Some(last) = proxy_hops(options).and_then(|p| p.last()) {
        return last.delegator;
    }
    if let Some(multi) = &options.multisig {
        return multi.compute().address();
    }
    *signer
}

/// Builds the transfer that funds the acting address, if one was requested and
/// there is a delegation layer to fund.
fn funding_transfer(options: &TransactionOptions, signer: &Address) -> Option<Call> {
    let value = options.transfer_to_acting_address?;
    if proxy_hops(options).is_none() && options.multisig.is_none() {
        return None;
    }
    Some(Call::Transfer {
        dest: acting_address(options, signer),
        value,
    })
}

/// Composes `base` with the proxy, multisig and funding layers of `options`.
///
/// Composition is deterministic: identical inputs always produce byte-identical
/// encodings, which multisig co-signers rely on to agree on the call hash.
pub fn compose(base: Call, options: &TransactionOptions, signer: &Address) -> Call {
    let transfer = funding_transfer(options, signer);
    let mut call = base;

    if let Some(proxies) = proxy_hops(options) {
        // A send-only extrinsic was signed with its proxy layers already applied.
        if options.mode != TxMode::SendOnly {
            call = proxies.iter().rev().fold(call, |inner, hop| Call::Proxy {
                real: hop.delegator,
                force_proxy_type: hop.force_proxy_type,
                call: Box::new(inner),
            });
        }
    }

    if let Some(spec) = &options.multisig {
        let multi = spec.compute();
        debug!(
            target: "compose",
            multisig = %multi.address(),
            call_data = %to_hex_canonical(&call),
            "wrapping call in multisig"
        );
        call = Call::AsMulti {
            threshold: multi.threshold(),
            other_signatories: multi.other_signatories(signer),
            maybe_timepoint: None,
            call: Box::new(call),
            max_weight: 0,
        };
    }

    if let Some(transfer) = transfer {
        call = Call::BatchAll(vec![transfer, call]);
    }

    call
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_types::app::{MultisigAccount, ProxyKind};

    fn a(n: u8) -> Address {
        Address([n; 32])
    }

    fn base() -> Call {
        Call::runtime("loans", "borrow", vec![0, 1])
    }

    #[test]
    fn no_layers_returns_base() {
        let out = compose(base(), &TransactionOptions::default(), &a(1));
        assert_eq!(out, base());
    }

    #[test]
    fn proxies_fold_right_to_left() {
        let opts = TransactionOptions::default()
            .proxies([(a(2), None), (a(3), Some(ProxyKind::Borrow))]);
        let out = compose(base(), &opts, &a(1));
        let expected = Call::Proxy {
            real: a(2),
            force_proxy_type: None,
            call: Box::new(Call::Proxy {
                real: a(3),
                force_proxy_type: Some(ProxyKind::Borrow),
                call: Box::new(base()),
            }),
        };
        assert_eq!(out, expected);
        assert_eq!(acting_address(&opts, &a(1)), a(3));
    }

    #[test]
    fn send_only_skips_proxy_wrapping() {
        let mut opts = TransactionOptions::default().proxies([a(2)]);
        opts.mode = TxMode::SendOnly;
        assert_eq!(compose(base(), &opts, &a(1)), base());
        // The acting address still reflects the proxy.
        assert_eq!(acting_address(&opts, &a(1)), a(2));
    }

    #[test]
    fn multisig_signers_are_sorted_and_exclude_self() {
        let x = TransactionOptions::default().multisig(vec![a(2), a(1), a(3)], 2);
        let y = TransactionOptions::default().multisig(vec![a(3), a(2), a(1)], 2);
        let cx = compose(base(), &x, &a(1));
        let cy = compose(base(), &y, &a(1));
        assert_eq!(cx.to_bytes(), cy.to_bytes());
        match cx {
            Call::AsMulti {
                threshold,
                other_signatories,
                maybe_timepoint,
                ..
            } => {
                assert_eq!(threshold, 2);
                assert_eq!(other_signatories, vec![a(2), a(3)]);
                assert!(maybe_timepoint.is_none());
            }
            other => panic!("expected AsMulti, got {:?}", other),
        }
    }

    #[test]
    fn multisig_wraps_proxied_call() {
        let opts = TransactionOptions::default()
            .proxies([a(9)])
            .multisig(vec![a(1), a(2)], 2);
        let out = compose(base(), &opts, &a(1));
        let inner = out.inner().unwrap();
        assert_eq!(out.method(), "asMulti");
        assert_eq!(inner.method(), "proxy");
        assert_eq!(inner.inner().unwrap(), &base());
    }

    #[test]
    fn funding_transfer_targets_acting_address_and_batches_first() {
        let opts = TransactionOptions::default()
            .multisig(vec![a(1), a(2)], 2)
            .transfer_to_acting_address(500);
        let multi = MultisigAccount::new([a(1), a(2)], 2);
        match compose(base(), &opts, &a(1)) {
            Call::BatchAll(calls) => {
                assert_eq!(calls.len(), 2);
                assert_eq!(
                    calls[0],
                    Call::Transfer {
                        dest: multi.address(),
                        value: 500
                    }
                );
                assert_eq!(calls[1].method(), "asMulti");
            }
            other => panic!("expected BatchAll, got {:?}", other),
        }
    }

    #[test]
    fn funding_transfer_without_layers_is_ignored() {
        let opts = TransactionOptions::default().transfer_to_acting_address(500);
        assert_eq!(compose(base(), &opts, &a(1)), base());
    }

    #[test]
    fn composition_is_deterministic() {
        let opts = TransactionOptions::default()
            .proxies([(a(4), Some(ProxyKind::Invest)), (a(5), None)])
            .multisig(vec![a(7), a(1), a(6)], 2)
            .transfer_to_acting_address(1);
        let first = compose(base(), &opts, &a(1));
        for _ in 0..5 {
            let again = compose(base(), &opts, &a(1));
            assert_eq!(again.to_bytes(), first.to_bytes());
            assert_eq!(again.hash(), first.hash());
        }
    }
}
