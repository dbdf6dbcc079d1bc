//! The storage envelope exchanged with the persistence middleware.
//!
//! Every persisted collection travels as the JSON wrapper
//! `{"state":{"<stateName>":[...],"isHydrated":false},"version":1}`. The
//! collection key is configured per adapter instance, so the envelope is
//! encoded through a manual `Serialize` implementation rather than a derived
//! struct. Field order is part of the contract: consumers compare hydrated
//! blobs byte-for-byte when deciding whether a write is needed.
//!
//! `isHydrated` is always written as `false`. Flipping it to `true` after
//! hydration is the consuming layer's job; this module never reads it back.

use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use thiserror::Error;

/// Version stamped into every envelope this codec produces.
pub const STORAGE_VERSION: u32 = 1;

/// Errors produced by the strict envelope decode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The raw value is not valid JSON, or not a JSON object.
    #[error("Malformed envelope: {0}")]
    Malformed(String),
    /// The envelope has no object-valued `state` field.
    #[error("Envelope has no object-valued `state` field")]
    MissingState,
    /// The `state` object has no entry for the configured collection key.
    #[error("Envelope state has no `{state_name}` collection")]
    MissingCollection { state_name: String },
    /// The collection entry exists but is not an array.
    #[error("Envelope collection `{state_name}` is not an array")]
    NotAnArray { state_name: String },
    /// An element of the collection failed to deserialize.
    #[error("Envelope item failed to deserialize: {0}")]
    Item(String),
    /// The envelope itself failed to serialize.
    #[error("Failed to serialize envelope: {0}")]
    Serialize(String),
}

/// Result type for envelope operations.
pub type Result<T> = std::result::Result<T, EnvelopeError>;

struct EnvelopeState<'a, T> {
    state_name: &'a str,
    items: &'a [T],
}

impl<T: Serialize> Serialize for EnvelopeState<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.state_name, self.items)?;
        map.serialize_entry("isHydrated", &false)?;
        map.end()
    }
}

struct Envelope<'a, T> {
    state_name: &'a str,
    items: &'a [T],
}

impl<T: Serialize> Serialize for Envelope<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(
            "state",
            &EnvelopeState {
                state_name: self.state_name,
                items: self.items,
            },
        )?;
        map.serialize_entry("version", &STORAGE_VERSION)?;
        map.end()
    }
}

/// Encodes `items` as a storage envelope under the given collection key.
pub fn encode_envelope<T: Serialize>(state_name: &str, items: &[T]) -> Result<String> {
    serde_json::to_string(&Envelope { state_name, items })
        .map_err(|e| EnvelopeError::Serialize(e.to_string()))
}

/// Builds the empty-state envelope for a collection key.
///
/// This is the degraded value the storage adapter serves when the durable
/// store cannot be read; it must always be constructible, so it bypasses
/// serde entirely.
pub fn empty_envelope(state_name: &str) -> String {
    // Value's Display renders the key as a quoted, escaped JSON string.
    let key = serde_json::Value::String(state_name.to_string());
    format!("{{\"state\":{{{key}:[],\"isHydrated\":false}},\"version\":{STORAGE_VERSION}}}")
}

/// Decodes a storage envelope, returning the collection under `state_name`.
///
/// The decode is strict about shape: the raw value must be a JSON object, its
/// `state` field must be an object, and the collection entry must be an
/// array. Each violation maps to a dedicated [`EnvelopeError`] variant so
/// callers can log what actually went wrong. Fields other than the ones the
/// codec recognizes (`state`, `version`, `isHydrated`) are ignored.
pub fn decode_envelope<T: DeserializeOwned>(state_name: &str, raw: &str) -> Result<Vec<T>> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| EnvelopeError::Malformed(e.to_string()))?;
    let envelope = value
        .as_object()
        .ok_or_else(|| EnvelopeError::Malformed("envelope is not a JSON object".to_string()))?;
    let state = envelope
        .get("state")
        .and_then(|s| s.as_object())
        .ok_or(EnvelopeError::MissingState)?;
    let collection = state
        .get(state_name)
        .ok_or_else(|| EnvelopeError::MissingCollection {
            state_name: state_name.to_string(),
        })?;
    if !collection.is_array() {
        return Err(EnvelopeError::NotAnArray {
            state_name: state_name.to_string(),
        });
    }
    serde_json::from_value(collection.clone()).map_err(|e| EnvelopeError::Item(e.to_string()))
}
