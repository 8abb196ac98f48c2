//! Audit trail: every vault operation emits a structured event.
//!
//! Events carry ids, sizes and error kinds. They never carry payloads or key
//! material.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Audit events
// ---------------------------------------------------------------------------

/// What happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    RecordCreated { payload_bytes: usize },
    RecordRead,
    RecordDecrypted,
    DecryptionFailed { kind: String },
    PartyListed { count: usize },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub record_id: Option<String>,
    pub party_id: Option<String>,
    pub action: AuditAction,
    pub success: bool,
}

impl AuditEvent {
    pub fn record_event(record_id: &str, party_id: &str, action: AuditAction) -> Self {
        Self {
            timestamp: Utc::now(),
            record_id: Some(record_id.into()),
            party_id: Some(party_id.into()),
            action,
            success: true,
        }
    }

    pub fn party_event(party_id: &str, action: AuditAction) -> Self {
        Self {
            timestamp: Utc::now(),
            record_id: None,
            party_id: Some(party_id.into()),
            action,
            success: true,
        }
    }

    pub fn with_failure(mut self) -> Self {
        self.success = false;
        self
    }
}

// ---------------------------------------------------------------------------
// Audit sink trait
// ---------------------------------------------------------------------------

/// Where audit events go.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Logs events via the `tracing` crate.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            timestamp = %event.timestamp,
            record_id = ?event.record_id,
            party_id = ?event.party_id,
            action = ?event.action,
            success = event.success,
            "audit"
        );
    }
}

/// Collects events in memory (for tests).
pub struct InMemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn events_for_record(&self, record_id: &str) -> Vec<AuditEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.record_id.as_deref() == Some(record_id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
