//! Error types for artifact storage.

use std::path::PathBuf;

/// Errors raised by an [`ArtifactStore`](crate::ArtifactStore) backend.
///
/// On the read path the cache treats every one of these as a miss; on the
/// commit path they are reported to the caller as "compiled but not persisted".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A filesystem operation in a directory-backed store failed.
    #[error("store I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A networked backend was unreachable or rejected a command.
    #[error("{backend} backend error: {reason}")]
    Backend {
        /// Backend name (e.g. "redis").
        backend: &'static str,
        /// Description of the failure.
        reason: String,
    },

    /// A record could not be encoded for storage.
    #[error("store serialization error: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },
}

/// A sealed artifact failed validation when opened.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// The buffer is too short or the header does not decode.
    #[error("invalid artifact header: {reason}")]
    InvalidHeader {
        /// Description of the header problem.
        reason: String,
    },

    /// The header does not carry the expected magic bytes.
    #[error("artifact magic mismatch: got {found:?}")]
    BadMagic {
        /// The magic bytes that were found.
        found: [u8; 4],
    },

    /// The artifact was written by an incompatible format version.
    #[error("artifact version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The expected format version.
        expected: u32,
        /// The version found in the header.
        actual: u32,
    },

    /// The payload does not match the checksum recorded in the header.
    #[error("artifact checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Checksum recorded in the header.
        expected: String,
        /// Checksum of the payload actually read.
        actual: String,
    },

    /// The header could not be encoded.
    #[error("artifact header serialization error: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },
}
