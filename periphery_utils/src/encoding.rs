//! Fixed-width string encoding for `bytes32` constructor arguments.

use crate::constants::BYTES32_WIDTH;
use alloy_primitives::B256;

/// Encodes `value` as UTF-8 bytes right-padded with NUL to 32 bytes.
///
/// Input longer than 32 bytes is truncated.
pub fn encode_bytes32_string(value: &str) -> B256 {
    let bytes = value.as_bytes();
    let len = bytes.len().min(BYTES32_WIDTH);
    let mut out = [0u8; BYTES32_WIDTH];
    out[..len].copy_from_slice(&bytes[..len]);
    B256::from(out)
}

/// Inverse of [`encode_bytes32_string`]: drops the NUL padding and decodes lossily.
pub fn decode_bytes32_string(value: &B256) -> String {
    let end = value
        .iter()
        .rposition(|b| *b != 0)
        .map(|idx| idx + 1)
        .unwrap_or(0);
    String::from_utf8_lossy(&value[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn encodes_weth9() {
        let encoded = encode_bytes32_string("WETH9");
        assert_eq!(
            encoded,
            b256!("5745544839000000000000000000000000000000000000000000000000000000")
        );
        assert_eq!(decode_bytes32_string(&encoded), "WETH9");
    }

    #[test]
    fn empty_string_is_zero() {
        assert_eq!(encode_bytes32_string(""), B256::ZERO);
        assert_eq!(decode_bytes32_string(&B256::ZERO), "");
    }

    #[test]
    fn truncates_long_input() {
        let long = "A".repeat(40);
        let encoded = encode_bytes32_string(&long);
        assert_eq!(decode_bytes32_string(&encoded), "A".repeat(32));
    }

    #[test]
    fn exact_width_fills_every_byte() {
        let value = "0123456789abcdef0123456789abcdef";
        let encoded = encode_bytes32_string(value);
        assert!(encoded.iter().all(|b| *b != 0));
        assert_eq!(decode_bytes32_string(&encoded), value);
    }
}
