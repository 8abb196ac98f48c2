//! AEAD: AES-256-GCM with a detached tag and empty associated data.

use alloc::vec::Vec;

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Key, Nonce, Tag,
};
use zeroize::Zeroizing;

use crate::error::{EnvelopeError, Result};
use crate::keys::random_bytes;
use crate::wire::{KEY_BYTES, NONCE_BYTES, TAG_BYTES};

/// Tag verification failed. Callers decide which integrity error to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rejected;

/// Generate a random 12-byte nonce. Used during encryption only.
pub(crate) fn nonce() -> Result<[u8; NONCE_BYTES]> {
    random_bytes()
}

fn cipher(key: &[u8; KEY_BYTES]) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key))
}

/// Seal `plaintext`, returning (ciphertext, tag).
pub(crate) fn seal(
    key: &[u8; KEY_BYTES],
    nonce: &[u8; NONCE_BYTES],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; TAG_BYTES])> {
    let mut buf = plaintext.to_vec();
    let tag = cipher(key)
        .encrypt_in_place_detached(Nonce::from_slice(nonce), b"", &mut buf)
        .map_err(|_| EnvelopeError::Encryption)?;
    let mut out = [0u8; TAG_BYTES];
    out.copy_from_slice(tag.as_slice());
    Ok((buf, out))
}

/// Open a detached-tag ciphertext. The plaintext is wiped when dropped.
pub(crate) fn open(
    key: &[u8; KEY_BYTES],
    nonce: &[u8; NONCE_BYTES],
    ciphertext: &[u8],
    tag: &[u8; TAG_BYTES],
) -> core::result::Result<Zeroizing<Vec<u8>>, Rejected> {
    let mut buf = Zeroizing::new(ciphertext.to_vec());
    cipher(key)
        .decrypt_in_place_detached(Nonce::from_slice(nonce), b"", &mut buf, Tag::from_slice(tag))
        .map_err(|_| Rejected)?;
    Ok(buf)
}
