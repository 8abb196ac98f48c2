//! Envelope orchestration: one fresh DEK per record, payload sealed under the
//! DEK, DEK wrapped under the master key.

use alloc::string::String;
use core::fmt;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{EnvelopeError, Result};
use crate::keys::{generate_dek, random_bytes};
use crate::payload::{decrypt_payload, encrypt_payload, PayloadFields};
use crate::wire::{
    self, ALGORITHM, FIELD_DEK_WRAPPED, FIELD_DEK_WRAP_NONCE, FIELD_DEK_WRAP_TAG,
    FIELD_PAYLOAD_CT, FIELD_PAYLOAD_NONCE, FIELD_PAYLOAD_TAG, MASTER_KEY_VERSION, NONCE_BYTES,
    RECORD_ID_BYTES, TAG_BYTES,
};
use crate::wrap::{master_key_array, unwrap_dek, wrap_dek, WrapFields};

// ---------------------------------------------------------------------------
// Secure record
// ---------------------------------------------------------------------------

/// The persisted unit. Fields are read-only once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureRecord {
    id: String,
    party_id: String,
    created_at: DateTime<Utc>,
    payload_nonce: String,
    payload_ct: String,
    payload_tag: String,
    dek_wrap_nonce: String,
    dek_wrapped: String,
    dek_wrap_tag: String,
    algorithm: String,
    master_key_version: u32,
}

impl SecureRecord {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn party_id(&self) -> &str {
        &self.party_id
    }

    /// Informational only; not bound into any ciphertext.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn master_key_version(&self) -> u32 {
        self.master_key_version
    }

    pub fn payload_fields(&self) -> PayloadFields<'_> {
        PayloadFields {
            nonce: &self.payload_nonce,
            ciphertext: &self.payload_ct,
            tag: &self.payload_tag,
        }
    }

    pub fn wrap_fields(&self) -> WrapFields<'_> {
        WrapFields {
            nonce: &self.dek_wrap_nonce,
            wrapped: &self.dek_wrapped,
            tag: &self.dek_wrap_tag,
        }
    }

    /// Format-check every hex field and the suite identifiers.
    pub fn validate(&self) -> Result<()> {
        inspect(self).map(|_| ())
    }
}

/// Random 128-bit record id, hex encoded.
pub fn generate_record_id() -> Result<String> {
    let bytes: [u8; RECORD_ID_BYTES] = random_bytes()?;
    Ok(wire::encode(&bytes))
}

/// Encrypt `payload` for `party_id` into a new record.
///
/// The master key length is checked before any key material is generated.
/// This is the only operation that creates key material.
pub fn encrypt_envelope<T>(party_id: &str, payload: &T, master_key: &[u8]) -> Result<SecureRecord>
where
    T: Serialize + ?Sized,
{
    master_key_array(master_key)?;

    let id = generate_record_id()?;
    let dek = generate_dek()?;
    let sealed = encrypt_payload(payload, &dek)?;
    let wrapped = wrap_dek(&dek, master_key)?;

    tracing::debug!(
        record_id = %id,
        party_id = %party_id,
        ciphertext_bytes = sealed.ciphertext.len() / 2,
        "sealed record"
    );

    Ok(SecureRecord {
        id,
        party_id: party_id.into(),
        created_at: Utc::now(),
        payload_nonce: sealed.nonce,
        payload_ct: sealed.ciphertext,
        payload_tag: sealed.tag,
        dek_wrap_nonce: wrapped.nonce,
        dek_wrapped: wrapped.wrapped,
        dek_wrap_tag: wrapped.tag,
        algorithm: ALGORITHM.into(),
        master_key_version: MASTER_KEY_VERSION,
    })
}

/// Unwrap the DEK and decrypt the payload of `record`.
pub fn open_envelope<T>(record: &SecureRecord, master_key: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    master_key_array(master_key)?;
    check_suite(record)?;

    let result = unwrap_dek(record.wrap_fields(), master_key)
        .and_then(|dek| decrypt_payload(record.payload_fields(), &dek));

    if let Err(e) = &result {
        tracing::debug!(record_id = %record.id, kind = %e.kind(), "record did not open");
    }
    result
}

fn check_suite(record: &SecureRecord) -> Result<()> {
    if record.algorithm != ALGORITHM {
        return Err(EnvelopeError::UnsupportedRecord { field: "algorithm" });
    }
    if record.master_key_version != MASTER_KEY_VERSION {
        return Err(EnvelopeError::UnsupportedRecord { field: "master_key_version" });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Inspection (no key material involved)
// ---------------------------------------------------------------------------

/// Record metadata, extracted without decryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordInfo {
    pub id: String,
    pub party_id: String,
    pub created_at: DateTime<Utc>,
    pub algorithm: &'static str,
    pub master_key_version: u32,
    /// Length of the serialized JSON payload.
    pub payload_bytes: usize,
    pub wrapped_dek_bytes: usize,
    /// Nonce length shared by the payload and the DEK wrap.
    pub nonce_bytes: usize,
    /// Tag length shared by the payload and the DEK wrap.
    pub tag_bytes: usize,
}

impl fmt::Display for RecordInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record {} | party {} | {} mk v{} | {} payload bytes | created {}",
            self.id,
            self.party_id,
            self.algorithm,
            self.master_key_version,
            self.payload_bytes,
            self.created_at.to_rfc3339()
        )
    }
}

/// Validate the stored fields of `record` and summarize them.
pub fn inspect(record: &SecureRecord) -> Result<RecordInfo> {
    check_suite(record)?;

    let nonce = wire::decode_fixed::<NONCE_BYTES>(FIELD_PAYLOAD_NONCE, &record.payload_nonce)?;
    let payload_bytes = wire::check_variable(FIELD_PAYLOAD_CT, &record.payload_ct)?;
    let tag = wire::decode_fixed::<TAG_BYTES>(FIELD_PAYLOAD_TAG, &record.payload_tag)?;
    wire::decode_fixed::<NONCE_BYTES>(FIELD_DEK_WRAP_NONCE, &record.dek_wrap_nonce)?;
    let wrapped_dek_bytes = wire::check_variable(FIELD_DEK_WRAPPED, &record.dek_wrapped)?;
    wire::decode_fixed::<TAG_BYTES>(FIELD_DEK_WRAP_TAG, &record.dek_wrap_tag)?;

    Ok(RecordInfo {
        id: record.id.clone(),
        party_id: record.party_id.clone(),
        created_at: record.created_at,
        algorithm: ALGORITHM,
        master_key_version: record.master_key_version,
        payload_bytes,
        wrapped_dek_bytes,
        nonce_bytes: nonce.len(),
        tag_bytes: tag.len(),
    })
}
