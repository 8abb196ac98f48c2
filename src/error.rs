//! Error types for the envelope engine.
//!
//! Each failure has its own variant; [`ErrorKind`] groups them for callers
//! that only need to pick a response. The `Display` text of the integrity
//! variants never says which field or which check was responsible.

use core::fmt;

/// Why a hex field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatReason {
    /// Empty, odd-length, or containing a non-hex character.
    NotHex,
    /// Decoded to the wrong number of bytes.
    WrongLength { expected: usize, got: usize },
}

impl fmt::Display for FormatReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotHex => write!(f, "not a hex string"),
            Self::WrongLength { expected, got } => {
                write!(f, "expected {} bytes, got {}", expected, got)
            }
        }
    }
}

/// Coarse classification used by boundary layers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Master key absent, malformed, or the wrong length.
    Configuration,
    /// A stored field failed validation before any key material was used.
    Format,
    /// Authentication failed, or the authenticated bytes were unusable.
    Integrity,
    /// Entropy or serialization failure on the sealing side.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Format => write!(f, "format"),
            Self::Integrity => write!(f, "integrity"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Everything that can go wrong sealing or opening a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeError {
    /// A key buffer was not exactly `expected` bytes.
    InvalidKeyLength { expected: usize, got: usize },
    /// Master key text was not hex.
    MalformedMasterKey,
    /// A hex field failed validation.
    Format {
        field: &'static str,
        reason: FormatReason,
    },
    /// `algorithm` or `master_key_version` names something this engine does not produce.
    UnsupportedRecord { field: &'static str },
    /// Payload tag verification failed.
    PayloadIntegrity,
    /// DEK unwrap failed: wrong master key or tampered wrap fields.
    DekIntegrity,
    /// Payload authenticated but is not valid JSON for the requested type.
    Deserialization,
    /// Payload could not be serialized to JSON that reads back, e.g. nesting too deep.
    Serialization,
    /// The cipher refused the plaintext (length limit).
    Encryption,
    /// The OS random source failed.
    Entropy,
}

impl EnvelopeError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidKeyLength { .. } | Self::MalformedMasterKey => ErrorKind::Configuration,
            Self::Format { .. } | Self::UnsupportedRecord { .. } => ErrorKind::Format,
            Self::PayloadIntegrity | Self::DekIntegrity | Self::Deserialization => {
                ErrorKind::Integrity
            }
            Self::Serialization | Self::Encryption | Self::Entropy => ErrorKind::Internal,
        }
    }

    pub(crate) fn format(field: &'static str, reason: FormatReason) -> Self {
        Self::Format { field, reason }
    }
}

impl fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKeyLength { expected, got } => {
                write!(f, "invalid key length: expected {} bytes, got {}", expected, got)
            }
            Self::MalformedMasterKey => write!(f, "master key must be hex encoded"),
            Self::Format { field, reason } => write!(f, "malformed field {}: {}", field, reason),
            Self::UnsupportedRecord { field } => write!(f, "unsupported record: {}", field),
            Self::PayloadIntegrity | Self::Deserialization => {
                write!(f, "payload decryption failed: integrity check failed")
            }
            Self::DekIntegrity => write!(f, "DEK unwrap failed: integrity check failed"),
            Self::Serialization => write!(f, "payload is not serializable as JSON"),
            Self::Encryption => write!(f, "encryption failed"),
            Self::Entropy => write!(f, "secure random source unavailable"),
        }
    }
}

impl std::error::Error for EnvelopeError {}

pub type Result<T, E = EnvelopeError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_messages_do_not_name_fields() {
        for err in [
            EnvelopeError::PayloadIntegrity,
            EnvelopeError::DekIntegrity,
            EnvelopeError::Deserialization,
        ] {
            let msg = err.to_string();
            assert!(msg.contains("integrity check failed"));
            assert!(!msg.contains("nonce"));
            assert!(!msg.contains("tag"));
            assert_eq!(err.kind(), ErrorKind::Integrity);
        }
    }

    #[test]
    fn deserialization_reads_like_a_tamper_failure() {
        assert_eq!(
            EnvelopeError::Deserialization.to_string(),
            EnvelopeError::PayloadIntegrity.to_string()
        );
        assert_ne!(EnvelopeError::Deserialization, EnvelopeError::PayloadIntegrity);
    }

    #[test]
    fn classification() {
        assert_eq!(
            EnvelopeError::InvalidKeyLength { expected: 32, got: 16 }.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            EnvelopeError::format("payload_tag", FormatReason::NotHex).kind(),
            ErrorKind::Format
        );
        assert_eq!(
            EnvelopeError::UnsupportedRecord { field: "algorithm" }.kind(),
            ErrorKind::Format
        );
        assert_eq!(EnvelopeError::Entropy.kind(), ErrorKind::Internal);
        assert_eq!(EnvelopeError::Serialization.kind(), ErrorKind::Internal);
    }

    #[test]
    fn format_message_names_the_field() {
        let err = EnvelopeError::format(
            "payload_nonce",
            FormatReason::WrongLength { expected: 12, got: 8 },
        );
        assert_eq!(
            err.to_string(),
            "malformed field payload_nonce: expected 12 bytes, got 8"
        );
    }
}
