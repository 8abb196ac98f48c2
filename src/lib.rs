//! # Envelope Vault
//!
//! Envelope encryption for JSON records at rest.
//!
//! ## Quick Start
//!
//! ```rust
//! use envelope_vault::{encrypt_envelope, open_envelope};
//! use serde_json::{json, Value};
//!
//! let master_key = [0u8; 32];
//! let payload = json!({"amount": 100, "currency": "USD"});
//!
//! let record = encrypt_envelope("user_123", &payload, &master_key).unwrap();
//! assert_eq!(record.algorithm(), "AES-256-GCM");
//!
//! let opened: Value = open_envelope(&record, &master_key).unwrap();
//! assert_eq!(opened, payload);
//! ```
//!
//! ## Key Hierarchy
//!
//! - **DEK**: 32 random bytes, one per record, encrypts the payload. Never
//!   stored in plaintext.
//! - **Master key**: 32 bytes supplied by the caller, wraps every DEK.
//!
//! Both layers use AES-256-GCM with a fresh 96-bit nonce and a detached
//! 128-bit tag. Binary fields are stored as hex.
//!
//! ## Error Behavior
//!
//! - Wrong-length master keys are rejected at every entry point.
//! - Malformed fields are rejected before any decryption is attempted.
//! - Tag failures are reported generically; the message never says which
//!   field was altered.
//!
//! ## What's NOT Provided
//!
//! - Key rotation
//! - Durable storage (see the `vault-store` crate for the in-memory store)
//! - Caller authentication

#![deny(unsafe_code)]

extern crate alloc;

// ---------------------------------------------------------------------------
// Internal modules
// ---------------------------------------------------------------------------

mod aead;
mod envelope;
mod error;
mod keys;
mod payload;
mod wrap;

/// Field constants and the hex codec for stored records.
pub mod wire;

// ---------------------------------------------------------------------------
// Public interface
// ---------------------------------------------------------------------------

pub use envelope::{
    encrypt_envelope, generate_record_id, inspect, open_envelope, RecordInfo, SecureRecord,
};
pub use error::{EnvelopeError, ErrorKind, FormatReason, Result};
pub use keys::{generate_dek, DataKey, MasterKey};
pub use payload::{decrypt_payload, encrypt_payload, PayloadFields, SealedPayload};
pub use wrap::{unwrap_dek, wrap_dek, WrapFields, WrappedDek};

pub use wire::{ALGORITHM, MASTER_KEY_VERSION};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
