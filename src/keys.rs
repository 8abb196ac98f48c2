//! Key types: the per-record data encryption key and the long-lived master key.
//!
//! Both are 32 raw bytes, wiped on drop, compared in constant time, and
//! redacted from `Debug` output.

use alloc::string::String;
use core::fmt;

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{EnvelopeError, Result};
use crate::wire::{KEY_BYTES, MASTER_KEY_HEX_CHARS};

/// Fill `N` bytes from the OS random source.
pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut out = [0u8; N];
    getrandom::getrandom(&mut out).map_err(|_| EnvelopeError::Entropy)?;
    Ok(out)
}

fn check_len(bytes: &[u8]) -> Result<()> {
    if bytes.len() != KEY_BYTES {
        return Err(EnvelopeError::InvalidKeyLength {
            expected: KEY_BYTES,
            got: bytes.len(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Data encryption key
// ---------------------------------------------------------------------------

/// Per-record data encryption key. Never serialized.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DataKey([u8; KEY_BYTES]);

impl DataKey {
    /// Fresh random key.
    pub fn generate() -> Result<Self> {
        random_bytes().map(Self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_len(bytes)?;
        let mut key = [0u8; KEY_BYTES];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_BYTES] {
        &self.0
    }
}

impl PartialEq for DataKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for DataKey {}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataKey(<redacted>)")
    }
}

/// Generate a new DEK. One per record.
pub fn generate_dek() -> Result<DataKey> {
    DataKey::generate()
}

// ---------------------------------------------------------------------------
// Master key
// ---------------------------------------------------------------------------

/// Long-lived key that wraps every DEK.
///
/// The engine entry points take the master key as a plain byte slice and
/// check its length on every call; this type is the validated form held by
/// long-running services.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_BYTES]);

impl MasterKey {
    pub fn generate() -> Result<Self> {
        random_bytes().map(Self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_len(bytes)?;
        let mut key = [0u8; KEY_BYTES];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Parse the textual form: exactly 64 hex characters.
    pub fn from_hex(text: &str) -> Result<Self> {
        let text = text.trim();
        if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(EnvelopeError::MalformedMasterKey);
        }
        if text.len() != MASTER_KEY_HEX_CHARS {
            return Err(EnvelopeError::InvalidKeyLength {
                expected: KEY_BYTES,
                got: text.len() / 2,
            });
        }
        let mut key = [0u8; KEY_BYTES];
        hex::decode_to_slice(text, &mut key).map_err(|_| EnvelopeError::MalformedMasterKey)?;
        Ok(Self(key))
    }

    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_BYTES] {
        &self.0
    }
}

impl PartialEq for MasterKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for MasterKey {}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(<redacted>)")
    }
}
