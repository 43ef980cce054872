//! Cache Envelope Module
//!
//! The serialized unit stored in either tier: payload plus creation
//! timestamp plus optional TTL, with a derived freshness check.
//!
//! The wire format is a JSON record `{payload, created_at,
//! expiration_minutes}`. Metadata can be decoded without touching the
//! payload, which the durable-tier expiration sweep relies on.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::Result;

// == Cache Envelope ==
/// A stored cache entry: payload and expiration metadata.
///
/// Envelopes are constructed at save time, never mutated, and replaced
/// wholesale on overwrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// The cached value
    pub payload: T,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// TTL in minutes, None = no expiration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_minutes: Option<f64>,
}

impl<T: DeserializeOwned> Envelope<T> {
    // == Decode ==
    /// Decodes an envelope from stored bytes.
    ///
    /// Fails with [`CacheError::SerializationFailed`] when the bytes are
    /// malformed or the payload does not match the requested type.
    ///
    /// [`CacheError::SerializationFailed`]: crate::error::CacheError::SerializationFailed
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl<T> Envelope<T> {
    // == Is Expired ==
    /// Checks whether the envelope is past its TTL.
    pub fn is_expired(&self) -> bool {
        is_expired_at(self.created_at, self.expiration_minutes, Utc::now())
    }
}

// == Encode ==
/// Borrowing mirror of [`Envelope`] so encoding never clones the payload.
#[derive(Serialize)]
struct EnvelopeRef<'a, T: Serialize> {
    payload: &'a T,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration_minutes: Option<f64>,
}

/// Encodes a payload with its expiration metadata into stored bytes.
pub fn encode<T: Serialize>(
    payload: &T,
    created_at: DateTime<Utc>,
    expiration_minutes: Option<f64>,
) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&EnvelopeRef {
        payload,
        created_at,
        expiration_minutes,
    })?)
}

// == Envelope Metadata ==
/// The expiration-relevant fields of an envelope.
///
/// Deserializing this skips the payload entirely, so sweeps over the
/// durable tier stay cheap regardless of payload size or shape.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EnvelopeMetadata {
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// TTL in minutes, None = no expiration
    #[serde(default)]
    pub expiration_minutes: Option<f64>,
}

impl EnvelopeMetadata {
    /// Checks whether the entry is past its TTL at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        is_expired_at(self.created_at, self.expiration_minutes, now)
    }
}

/// Decodes only the metadata fields of stored envelope bytes.
pub fn decode_metadata(bytes: &[u8]) -> Result<EnvelopeMetadata> {
    Ok(serde_json::from_slice(bytes)?)
}

// == Expiry Math ==
/// An entry with a TTL is expired once more than `expiration_minutes`
/// have elapsed since `created_at`. Entries without a TTL never expire.
pub(crate) fn is_expired_at(
    created_at: DateTime<Utc>,
    expiration_minutes: Option<f64>,
    now: DateTime<Utc>,
) -> bool {
    match expiration_minutes {
        Some(minutes) => {
            let elapsed_ms = now.signed_duration_since(created_at).num_milliseconds() as f64;
            elapsed_ms > minutes * 60_000.0
        }
        None => false,
    }
}
