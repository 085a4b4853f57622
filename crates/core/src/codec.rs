// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON codec for the leader election record
//!
//! Backends keep the record as an opaque string inside their stored object
//! (an annotation value for ConfigMap and Endpoints locks).

use crate::record::LeaderElectionRecord;
use thiserror::Error;

/// Annotation key under which annotation-based locks store the record
pub const LEADER_ANNOTATION_KEY: &str = "control-plane.alpha.kubernetes.io/leader";

/// Stored bytes were present but could not be parsed as a record
#[derive(Debug, Error)]
#[error("malformed leader election record: {0}")]
pub struct MalformedRecord(#[from] serde_json::Error);

/// Decode a stored record.
///
/// Empty input means the field is absent, which is "no current claim" and
/// decodes to the zero record.
pub fn decode(raw: &[u8]) -> Result<LeaderElectionRecord, MalformedRecord> {
    if raw.is_empty() {
        return Ok(LeaderElectionRecord::default());
    }
    Ok(serde_json::from_slice(raw)?)
}

/// Encode a record for storage. Field order is fixed by the struct layout.
pub fn encode(record: &LeaderElectionRecord) -> Result<Vec<u8>, MalformedRecord> {
    Ok(serde_json::to_vec(record)?)
}

/// Encode into the string form carried by annotations
pub fn encode_string(record: &LeaderElectionRecord) -> Result<String, MalformedRecord> {
    Ok(serde_json::to_string(record)?)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
