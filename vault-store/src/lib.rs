//! # Vault Store
//!
//! Storage and service layer for sealed records.
//!
//! The envelope engine is stateless; this crate owns the state around it.
//! A [`Vault`] holds the master key, an injected [`RecordStore`] and an
//! [`AuditSink`], and exposes create / get / decrypt / list operations.
//!
//! ## Quick Start
//!
//! ```
//! use vault_store::*;
//! use envelope_vault::MasterKey;
//! use serde_json::{json, Value};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryStore::new());
//! let audit = Arc::new(InMemoryAuditSink::new());
//! let vault = Vault::new(store, audit, MasterKey::generate().unwrap());
//!
//! let record = vault.create("user_123", &json!({"amount": 100})).unwrap();
//! let payload: Value = vault.decrypt(record.id()).unwrap();
//! assert_eq!(payload, json!({"amount": 100}));
//! ```

pub mod audit;
pub mod error;
pub mod storage;
pub mod vault;

pub use audit::{AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use error::StoreError;
pub use storage::{InMemoryStore, RecordStore};
pub use vault::Vault;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use envelope_vault::{encrypt_envelope, EnvelopeError, ErrorKind, MasterKey};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn test_vault() -> (Vault, Arc<InMemoryStore>, Arc<InMemoryAuditSink>) {
        let store = Arc::new(InMemoryStore::new());
        let audit = Arc::new(InMemoryAuditSink::new());
        let mk = MasterKey::from_bytes(&[9u8; 32]).unwrap();
        (Vault::new(store.clone(), audit.clone(), mk), store, audit)
    }

    #[test]
    fn test_create_and_decrypt() {
        let (vault, store, _) = test_vault();
        let payload = json!({"amount": 100, "currency": "USD"});

        let record = vault.create("user_123", &payload).unwrap();
        assert_eq!(record.party_id(), "user_123");
        assert_eq!(store.len().unwrap(), 1);

        let back: Value = vault.decrypt(record.id()).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_get_returns_stored_record() {
        let (vault, _, _) = test_vault();
        let record = vault.create("p", &json!([1, 2])).unwrap();
        assert_eq!(vault.get(record.id()).unwrap(), record);
    }

    #[test]
    fn test_get_nonexistent_record() {
        let (vault, _, _) = test_vault();
        assert_eq!(
            vault.get("deadbeef").unwrap_err(),
            StoreError::RecordNotFound("deadbeef".into())
        );
        assert!(matches!(
            vault.decrypt::<Value>("deadbeef"),
            Err(StoreError::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_empty_party_rejected() {
        let (vault, store, audit) = test_vault();
        for party in ["", "   "] {
            assert!(matches!(
                vault.create(party, &json!({})),
                Err(StoreError::InvalidRequest(_))
            ));
        }
        assert!(store.is_empty().unwrap());
        assert!(audit.is_empty());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = InMemoryStore::new();
        let record = encrypt_envelope("p", &json!(1), &[0u8; 32]).unwrap();
        store.put(&record).unwrap();
        assert_eq!(
            store.put(&record).unwrap_err(),
            StoreError::DuplicateRecord(record.id().to_string())
        );
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_list_by_party() {
        let (vault, _, _) = test_vault();
        let a1 = vault.create("alice", &json!({"n": 1})).unwrap();
        let _b = vault.create("bob", &json!({"n": 2})).unwrap();
        let a2 = vault.create("alice", &json!({"n": 3})).unwrap();

        let alice = vault.list_by_party("alice").unwrap();
        assert_eq!(alice.len(), 2);
        assert!(alice.iter().all(|r| r.party_id() == "alice"));
        let ids: Vec<&str> = alice.iter().map(|r| r.id()).collect();
        assert!(ids.contains(&a1.id()) && ids.contains(&a2.id()));

        assert!(vault.list_by_party("carol").unwrap().is_empty());
        assert_eq!(vault.len().unwrap(), 3);
    }

    #[test]
    fn test_wrong_master_key_fails_integrity() {
        let store = Arc::new(InMemoryStore::new());
        let audit = Arc::new(InMemoryAuditSink::new());
        let writer = Vault::new(store.clone(), audit.clone(), MasterKey::generate().unwrap());
        let reader = Vault::new(store, audit.clone(), MasterKey::generate().unwrap());

        let record = writer.create("p", &json!({"secret": true})).unwrap();
        let err = reader.decrypt::<Value>(record.id()).unwrap_err();

        assert_eq!(err, StoreError::Envelope(EnvelopeError::DekIntegrity));
        assert_eq!(err.envelope_kind(), Some(ErrorKind::Integrity));

        let events = audit.events_for_record(record.id());
        let last = events.last().unwrap();
        assert!(!last.success);
        assert_eq!(
            last.action,
            AuditAction::DecryptionFailed { kind: "integrity".into() }
        );
    }

    #[test]
    fn test_audit_events_generated() {
        let (vault, _, audit) = test_vault();
        let record = vault.create("p", &json!({"k": "v"})).unwrap();
        vault.get(record.id()).unwrap();
        let _: Value = vault.decrypt(record.id()).unwrap();
        vault.list_by_party("p").unwrap();

        let actions: Vec<AuditAction> = audit.events().into_iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                AuditAction::RecordCreated { payload_bytes: br#"{"k":"v"}"#.len() },
                AuditAction::RecordRead,
                AuditAction::RecordDecrypted,
                AuditAction::PartyListed { count: 1 },
            ]
        );
    }

    #[test]
    fn test_audit_events_carry_no_payload() {
        let (vault, _, audit) = test_vault();
        vault.create("p", &json!({"ssn": "123-45-6789"})).unwrap();
        for event in audit.events() {
            let text = serde_json::to_string(&event).unwrap();
            assert!(!text.contains("123-45-6789"));
        }
    }

    #[test]
    fn test_error_display() {
        let err: StoreError = EnvelopeError::PayloadIntegrity.into();
        assert!(err.to_string().contains("integrity check failed"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(
            StoreError::RecordNotFound("abc".into()).to_string(),
            "record not found: abc"
        );
    }

    #[test]
    fn test_concurrent_creates() {
        let (vault, store, _) = test_vault();
        let vault = Arc::new(vault);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let vault = vault.clone();
                std::thread::spawn(move || {
                    for j in 0..16 {
                        vault.create(&format!("party-{}", i), &json!({"j": j})).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.len().unwrap(), 128);
        assert_eq!(vault.list_by_party("party-3").unwrap().len(), 16);
    }
}
