//! The vault service: a record store, an audit sink and the master key,
//! composed around the envelope engine.

use crate::audit::{AuditAction, AuditEvent, AuditSink};
use crate::error::StoreError;
use crate::storage::RecordStore;

use envelope_vault::{encrypt_envelope, open_envelope, MasterKey, SecureRecord};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

pub struct Vault {
    store: Arc<dyn RecordStore>,
    audit: Arc<dyn AuditSink>,
    master_key: MasterKey,
}

impl Vault {
    pub fn new(store: Arc<dyn RecordStore>, audit: Arc<dyn AuditSink>, master_key: MasterKey) -> Self {
        Self {
            store,
            audit,
            master_key,
        }
    }

    /// Seal `payload` for `party_id` and store the record.
    pub fn create<T>(&self, party_id: &str, payload: &T) -> Result<SecureRecord, StoreError>
    where
        T: Serialize + ?Sized,
    {
        if party_id.trim().is_empty() {
            return Err(StoreError::InvalidRequest("party_id is required".into()));
        }

        let record = encrypt_envelope(party_id, payload, self.master_key.as_bytes())?;
        self.store.put(&record)?;

        let payload_bytes = record.payload_fields().ciphertext.len() / 2;
        tracing::info!(
            record_id = %record.id(),
            party_id = %party_id,
            payload_bytes,
            "record created"
        );
        self.audit.record(AuditEvent::record_event(
            record.id(),
            party_id,
            AuditAction::RecordCreated { payload_bytes },
        ));

        Ok(record)
    }

    pub fn get(&self, id: &str) -> Result<SecureRecord, StoreError> {
        let record = self
            .store
            .get(id)?
            .ok_or_else(|| StoreError::RecordNotFound(id.to_string()))?;
        self.audit.record(AuditEvent::record_event(
            record.id(),
            record.party_id(),
            AuditAction::RecordRead,
        ));
        Ok(record)
    }

    /// Fetch a record and open it with the vault's master key.
    pub fn decrypt<T>(&self, id: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let record = self
            .store
            .get(id)?
            .ok_or_else(|| StoreError::RecordNotFound(id.to_string()))?;

        match open_envelope(&record, self.master_key.as_bytes()) {
            Ok(payload) => {
                tracing::info!(record_id = %id, "record decrypted");
                self.audit.record(AuditEvent::record_event(
                    id,
                    record.party_id(),
                    AuditAction::RecordDecrypted,
                ));
                Ok(payload)
            }
            Err(e) => {
                tracing::warn!(record_id = %id, kind = %e.kind(), "record failed to decrypt");
                self.audit.record(
                    AuditEvent::record_event(
                        id,
                        record.party_id(),
                        AuditAction::DecryptionFailed {
                            kind: e.kind().to_string(),
                        },
                    )
                    .with_failure(),
                );
                Err(e.into())
            }
        }
    }

    pub fn list_by_party(&self, party_id: &str) -> Result<Vec<SecureRecord>, StoreError> {
        let records = self.store.list_by_party(party_id)?;
        self.audit.record(AuditEvent::party_event(
            party_id,
            AuditAction::PartyListed {
                count: records.len(),
            },
        ));
        Ok(records)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        self.store.len()
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.store.is_empty()
    }
}
