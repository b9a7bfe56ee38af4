// crates/types/src/codec.rs

//! Defines the canonical, deterministic binary codec for calls and signing payloads.
//!
//! Multisig co-signers must derive byte-identical call encodings (and therefore
//! identical call hashes) from the same composition inputs, so every component
//! encodes through these wrappers around `parity-scale-codec` (SCALE) rather than
//! picking its own representation.

use parity_scale_codec::{Decode, DecodeAll, Encode};

/// Encodes a value into its canonical SCALE byte representation.
pub fn to_bytes_canonical<T: Encode>(v: &T) -> Result<Vec<u8>, String> {
    Ok(v.encode())
}

/// Decodes a value from its canonical SCALE byte representation.
///
/// Trailing bytes are rejected: a payload that decodes but leaves input behind
/// is not the canonical encoding of the value.
pub fn from_bytes_canonical<T: Decode>(b: &[u8]) -> Result<T, String> {
    T::decode_all(&mut &*b).map_err(|e| format!("canonical decode failed: {}", e))
}

/// Encodes a value and renders it as `0x`-prefixed hex, the form used when
/// sharing call data with co-signers.
pub fn to_hex_canonical<T: Encode>(v: &T) -> String {
    format!("0x{}", hex::encode(v.encode()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Address, Call};

    #[test]
    fn trailing_bytes_are_rejected() {
        let call = Call::Transfer {
            dest: Address([4; 32]),
            value: 10,
        };
        let mut bytes = to_bytes_canonical(&call).unwrap();
        assert_eq!(from_bytes_canonical::<Call>(&bytes).unwrap(), call);

        bytes.push(0);
        let err = from_bytes_canonical::<Call>(&bytes).unwrap_err();
        assert!(err.starts_with("canonical decode failed"));
    }

    #[test]
    fn hex_form_is_prefixed() {
        let hex = to_hex_canonical(&7u8);
        assert_eq!(hex, "0x07");
    }
}
