//! DEK wrapping under the master key.
//!
//! Same AEAD as the payload, applied to the raw 32 DEK bytes. The master key
//! arrives as an arbitrary buffer and is length-checked on every call.

use alloc::string::String;

use crate::aead;
use crate::error::{EnvelopeError, Result};
use crate::keys::DataKey;
use crate::wire::{
    self, FIELD_DEK_WRAPPED, FIELD_DEK_WRAP_NONCE, FIELD_DEK_WRAP_TAG, KEY_BYTES, NONCE_BYTES,
    TAG_BYTES,
};

/// Hex-encoded output of [`wrap_dek`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrappedDek {
    pub nonce: String,
    pub wrapped: String,
    pub tag: String,
}

impl WrappedDek {
    pub fn fields(&self) -> WrapFields<'_> {
        WrapFields {
            nonce: &self.nonce,
            wrapped: &self.wrapped,
            tag: &self.tag,
        }
    }
}

/// Borrowed view of the three wrap fields of a stored record.
#[derive(Clone, Copy, Debug)]
pub struct WrapFields<'a> {
    pub nonce: &'a str,
    pub wrapped: &'a str,
    pub tag: &'a str,
}

pub(crate) fn master_key_array(master_key: &[u8]) -> Result<&[u8; KEY_BYTES]> {
    master_key
        .try_into()
        .map_err(|_| EnvelopeError::InvalidKeyLength {
            expected: KEY_BYTES,
            got: master_key.len(),
        })
}

/// Encrypt `dek` under `master_key`.
pub fn wrap_dek(dek: &DataKey, master_key: &[u8]) -> Result<WrappedDek> {
    let mk = master_key_array(master_key)?;
    let nonce = aead::nonce()?;
    let (wrapped, tag) = aead::seal(mk, &nonce, dek.as_bytes())?;

    Ok(WrappedDek {
        nonce: wire::encode(&nonce),
        wrapped: wire::encode(&wrapped),
        tag: wire::encode(&tag),
    })
}

/// Recover the DEK. Order: master key length, field format, tag check.
pub fn unwrap_dek(fields: WrapFields<'_>, master_key: &[u8]) -> Result<DataKey> {
    let mk = master_key_array(master_key)?;

    let nonce: [u8; NONCE_BYTES] = wire::decode_fixed(FIELD_DEK_WRAP_NONCE, fields.nonce)?;
    let wrapped = wire::decode_variable(FIELD_DEK_WRAPPED, fields.wrapped)?;
    let tag: [u8; TAG_BYTES] = wire::decode_fixed(FIELD_DEK_WRAP_TAG, fields.tag)?;

    let raw = aead::open(mk, &nonce, &wrapped, &tag).map_err(|_| EnvelopeError::DekIntegrity)?;

    // Only reachable with a forgery under the real master key.
    DataKey::from_bytes(&raw).map_err(|_| EnvelopeError::DekIntegrity)
}
