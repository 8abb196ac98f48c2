//! Storage format (v1)
//!
//! Every binary field of a record is stored as hex text:
//!
//!   payload_nonce[12] payload_ct[len(json)] payload_tag[16]
//!   dek_wrap_nonce[12] dek_wrapped[32] dek_wrap_tag[16]
//!
//! Decoding validates each field on its own, before any key is touched:
//! fixed-size fields must decode to exactly their size, variable fields must
//! be non-empty even-length hex. Input hex is case-insensitive.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{EnvelopeError, FormatReason, Result};

/// Cipher identifier stored in every record.
pub const ALGORITHM: &str = "AES-256-GCM";

/// Master key generation tag. Fixed: there is no rotation support.
pub const MASTER_KEY_VERSION: u32 = 1;

pub const NONCE_BYTES: usize = 12;
pub const TAG_BYTES: usize = 16;
pub const KEY_BYTES: usize = 32;

/// Record ids are random, not derived from content.
pub const RECORD_ID_BYTES: usize = 16;

/// Hex length of a master key supplied as text.
pub const MASTER_KEY_HEX_CHARS: usize = KEY_BYTES * 2;

// Field names, as they appear in the serialized record.
pub const FIELD_PAYLOAD_NONCE: &str = "payload_nonce";
pub const FIELD_PAYLOAD_CT: &str = "payload_ct";
pub const FIELD_PAYLOAD_TAG: &str = "payload_tag";
pub const FIELD_DEK_WRAP_NONCE: &str = "dek_wrap_nonce";
pub const FIELD_DEK_WRAPPED: &str = "dek_wrapped";
pub const FIELD_DEK_WRAP_TAG: &str = "dek_wrap_tag";

/// Lower-case hex.
pub fn encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

#[inline]
fn is_hex(value: &str) -> bool {
    !value.is_empty() && value.len() % 2 == 0 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Decode a fixed-size field (nonce, tag, key).
pub fn decode_fixed<const N: usize>(field: &'static str, value: &str) -> Result<[u8; N]> {
    if !is_hex(value) {
        return Err(EnvelopeError::format(field, FormatReason::NotHex));
    }
    if value.len() != N * 2 {
        return Err(EnvelopeError::format(
            field,
            FormatReason::WrongLength {
                expected: N,
                got: value.len() / 2,
            },
        ));
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(value, &mut out)
        .map_err(|_| EnvelopeError::format(field, FormatReason::NotHex))?;
    Ok(out)
}

/// Decode a variable-size field (ciphertext, wrapped key). Format only.
pub fn decode_variable(field: &'static str, value: &str) -> Result<Vec<u8>> {
    if !is_hex(value) {
        return Err(EnvelopeError::format(field, FormatReason::NotHex));
    }
    hex::decode(value).map_err(|_| EnvelopeError::format(field, FormatReason::NotHex))
}

/// Format check without allocating the decoded bytes.
pub fn check_variable(field: &'static str, value: &str) -> Result<usize> {
    if !is_hex(value) {
        return Err(EnvelopeError::format(field, FormatReason::NotHex));
    }
    Ok(value.len() / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_accepts_either_case() {
        let lower: [u8; 2] = decode_fixed("f", "abcd").unwrap();
        let upper: [u8; 2] = decode_fixed("f", "ABCD").unwrap();
        assert_eq!(lower, [0xab, 0xcd]);
        assert_eq!(lower, upper);
    }

    #[test]
    fn fixed_rejects_wrong_length() {
        let err = decode_fixed::<NONCE_BYTES>(FIELD_PAYLOAD_NONCE, "00ff").unwrap_err();
        assert_eq!(
            err,
            EnvelopeError::Format {
                field: FIELD_PAYLOAD_NONCE,
                reason: FormatReason::WrongLength { expected: 12, got: 2 },
            }
        );
    }

    #[test]
    fn fixed_rejects_non_hex_before_length() {
        let err = decode_fixed::<2>("f", "zz").unwrap_err();
        assert_eq!(
            err,
            EnvelopeError::Format { field: "f", reason: FormatReason::NotHex }
        );
    }

    #[test]
    fn variable_rejects_empty_and_odd() {
        assert!(decode_variable("ct", "").is_err());
        assert!(decode_variable("ct", "abc").is_err());
        assert!(decode_variable("ct", "ab c0").is_err());
        assert_eq!(decode_variable("ct", "00Ff").unwrap(), vec![0x00, 0xff]);
    }

    #[test]
    fn check_variable_reports_decoded_len() {
        assert_eq!(check_variable("ct", "0011aabb").unwrap(), 4);
        assert!(check_variable("ct", "0g").is_err());
    }

    #[test]
    fn encode_is_lower_case() {
        assert_eq!(encode(&[0xAB, 0x01]), "ab01");
    }
}
