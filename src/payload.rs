//! Payload encryption under a data encryption key.
//!
//! The payload is serialized to UTF-8 JSON text first; those bytes, not the
//! structured value, are what gets encrypted and authenticated.

use alloc::string::String;

use serde::{de::DeserializeOwned, Serialize};

use crate::aead;
use crate::error::{EnvelopeError, Result};
use crate::keys::DataKey;
use crate::wire::{
    self, FIELD_PAYLOAD_CT, FIELD_PAYLOAD_NONCE, FIELD_PAYLOAD_TAG, NONCE_BYTES, TAG_BYTES,
};

/// Hex-encoded output of [`encrypt_payload`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedPayload {
    pub nonce: String,
    pub ciphertext: String,
    pub tag: String,
}

impl SealedPayload {
    pub fn fields(&self) -> PayloadFields<'_> {
        PayloadFields {
            nonce: &self.nonce,
            ciphertext: &self.ciphertext,
            tag: &self.tag,
        }
    }
}

/// Borrowed view of the three payload fields of a stored record.
#[derive(Clone, Copy, Debug)]
pub struct PayloadFields<'a> {
    pub nonce: &'a str,
    pub ciphertext: &'a str,
    pub tag: &'a str,
}

/// Encrypt `payload` under `dek` with a fresh nonce.
pub fn encrypt_payload<T>(payload: &T, dek: &DataKey) -> Result<SealedPayload>
where
    T: Serialize + ?Sized,
{
    let plaintext = zeroize::Zeroizing::new(
        serde_json::to_vec(payload).map_err(|_| EnvelopeError::Serialization)?,
    );
    // `to_vec` has no nesting limit but the decoder stops at 128 levels.
    // Anything `decrypt_payload` could not read back is refused here.
    serde_json::from_slice::<serde_json::Value>(&plaintext)
        .map_err(|_| EnvelopeError::Serialization)?;
    let nonce = aead::nonce()?;
    let (ciphertext, tag) = aead::seal(dek.as_bytes(), &nonce, &plaintext)?;

    Ok(SealedPayload {
        nonce: wire::encode(&nonce),
        ciphertext: wire::encode(&ciphertext),
        tag: wire::encode(&tag),
    })
}

/// Validate, decrypt, and deserialize a payload.
///
/// All three fields are format-checked before the key is used. A failed tag
/// check is [`EnvelopeError::PayloadIntegrity`] regardless of which field was
/// altered; bytes that authenticate but do not parse are
/// [`EnvelopeError::Deserialization`].
pub fn decrypt_payload<T>(fields: PayloadFields<'_>, dek: &DataKey) -> Result<T>
where
    T: DeserializeOwned,
{
    let nonce: [u8; NONCE_BYTES] = wire::decode_fixed(FIELD_PAYLOAD_NONCE, fields.nonce)?;
    let ciphertext = wire::decode_variable(FIELD_PAYLOAD_CT, fields.ciphertext)?;
    let tag: [u8; TAG_BYTES] = wire::decode_fixed(FIELD_PAYLOAD_TAG, fields.tag)?;

    let plaintext = aead::open(dek.as_bytes(), &nonce, &ciphertext, &tag)
        .map_err(|_| EnvelopeError::PayloadIntegrity)?;

    serde_json::from_slice(&plaintext).map_err(|_| EnvelopeError::Deserialization)
}
