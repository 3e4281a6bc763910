//! Self-validating wrapper around stored artifact bytes.
//!
//! Layout: `u32-le header length ‖ bincode(ArtifactHeader) ‖ payload`. The
//! header carries magic bytes, a format version, the producing crate version
//! and a checksum of the payload. Sealing is deterministic, so sealing the
//! same payload twice yields identical bytes.

use serde::{Deserialize, Serialize};
use viewcache_common::ContentHash;

use crate::error::EnvelopeError;

/// Magic bytes identifying a viewcache artifact.
pub const ARTIFACT_MAGIC: [u8; 4] = *b"VWCA";

/// Current envelope format version. Bump on breaking changes to the header
/// or the payload encoding.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Header prepended to every stored artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    /// Must be [`ARTIFACT_MAGIC`].
    pub magic: [u8; 4],

    /// Envelope format version.
    pub format_version: u32,

    /// Version of the software that produced the artifact.
    pub producer: String,

    /// Content hash of the payload.
    pub checksum: ContentHash,
}

/// Wraps `payload` in an envelope.
pub fn seal(payload: &[u8], producer: &str) -> Result<Vec<u8>, EnvelopeError> {
    let header = ArtifactHeader {
        magic: ARTIFACT_MAGIC,
        format_version: ARTIFACT_FORMAT_VERSION,
        producer: producer.to_string(),
        checksum: ContentHash::of(payload),
    };
    let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
        .map_err(|e| EnvelopeError::Serialization {
            reason: e.to_string(),
        })?;

    let header_len = header_bytes.len() as u32;
    let mut out = Vec::with_capacity(4 + header_bytes.len() + payload.len());
    out.extend_from_slice(&header_len.to_le_bytes());
    out.extend_from_slice(&header_bytes);
    out.extend_from_slice(payload);
    Ok(out)
}

/// Validates an envelope and returns its payload.
pub fn open(raw: &[u8]) -> Result<&[u8], EnvelopeError> {
    let len_bytes: [u8; 4] = raw
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| EnvelopeError::InvalidHeader {
            reason: format!("{} bytes is too short for a header length", raw.len()),
        })?;
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    let header_raw = raw
        .get(4..4 + header_len)
        .ok_or_else(|| EnvelopeError::InvalidHeader {
            reason: format!("header length {header_len} exceeds buffer"),
        })?;

    let (header, _): (ArtifactHeader, usize) =
        bincode::serde::decode_from_slice(header_raw, bincode::config::standard()).map_err(
            |e| EnvelopeError::InvalidHeader {
                reason: e.to_string(),
            },
        )?;

    if header.magic != ARTIFACT_MAGIC {
        return Err(EnvelopeError::BadMagic {
            found: header.magic,
        });
    }
    if header.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(EnvelopeError::VersionMismatch {
            expected: ARTIFACT_FORMAT_VERSION,
            actual: header.format_version,
        });
    }

    let payload = &raw[4 + header_len..];
    let actual = ContentHash::of(payload);
    if actual != header.checksum {
        return Err(EnvelopeError::ChecksumMismatch {
            expected: header.checksum.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(payload)
}
