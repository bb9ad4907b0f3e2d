//! Shared wire contract for the attempt coordination service.
//!
//! Every client operation is a JSON `POST` body discriminated by an `action`
//! field. This crate keeps the payload shapes, identity normalization, and
//! encode/decode helpers in one place so the engine and any future tooling
//! stay interoperable with the collaborator.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Normalized participant label used to gate one attempt per person.
///
/// Construct via [`Identity::normalize`]; the wire form is a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Normalizes raw participant input by trimming and case-folding.
    ///
    /// Only simple lowercase folding is applied. Unicode normalization and
    /// homoglyph detection are out of scope, so labels that merely look
    /// alike can still map to distinct identities.
    pub fn normalize(raw: &str) -> Result<Self, ProtocolError> {
        let folded = raw.trim().to_lowercase();
        if folded.is_empty() {
            return Err(ProtocolError::EmptyIdentity);
        }
        Ok(Self(folded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Final scored report for one scene, submitted once per finish action.
///
/// `scene` is the 1-based scene number shown to participants; `time` travels
/// as an RFC 3339 timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub name: Identity,
    pub display_name: String,
    pub scene: u32,
    pub score: u32,
    pub total: u32,
    pub missed: Vec<String>,
    pub time: DateTime<Utc>,
}

/// Request bodies understood by the collaborator.
///
/// `Complete` flattens the attempt record fields next to the `action` tag,
/// matching the deployed service contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum CoordinationRequest {
    Check { name: Identity },
    Reserve { name: Identity, meta: Value },
    Complete(AttemptRecord),
}

/// Reply to a `check` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReply {
    pub played: bool,
}

/// Reply to a `reserve` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveReply {
    pub reserved: bool,
}

/// Reply to a `complete` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteReply {
    pub ok: bool,
}

/// Reply to the unauthenticated `GET` liveness probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

/// Builds the reservation metadata the engine sends alongside a claim.
///
/// The collaborator treats `meta` as opaque; this is the shape the deployed
/// client always sent.
pub fn reserve_meta(display_name: &str) -> Value {
    serde_json::json!({ "started": true, "displayName": display_name })
}

/// Error conditions returned by the protocol helpers.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("identity is empty after trimming")]
    EmptyIdentity,
    #[error("request encode error: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("reply decode error: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Encodes a request body for the wire.
pub fn encode_request(request: &CoordinationRequest) -> Result<Vec<u8>, ProtocolError> {
    serde_json::to_vec(request).map_err(ProtocolError::Encode)
}

/// Decodes a JSON reply body into the requested type.
pub fn decode_reply<T>(body: &[u8]) -> Result<T, ProtocolError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_slice(body).map_err(ProtocolError::Decode)
}
