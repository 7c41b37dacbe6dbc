//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Each agent has its own chain. Every field that contributes to a record's
//! hash is listed explicitly so nothing is accidentally omitted.
//!
//! Hash input layout (bytes, in order):
//!   1. record id as 8-byte little-endian
//!   2. agent id as UTF-8 bytes
//!   3. sequence as 8-byte little-endian
//!   4. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   5. record kind as UTF-8 bytes (`action` / `inquiry`)
//!   6. recorded_at as RFC 3339 UTF-8 bytes
//!   7. canonical JSON of the decision (serde_json with no pretty-printing)
//!
//! The execution outcome is not hashed. It is attached after the record is
//! chained, and the log accepts it at most once.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use bastion_contracts::{
    agent::AgentId,
    audit::{AuditRecord, AuditRecordId, RecordKind},
    decision::AuthorizationDecision,
    error::{BastionError, BastionResult},
};

/// The sentinel `prev_hash` of the first record in every agent chain.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// The chained fields of one record, borrowed for hashing.
#[derive(Debug, Clone, Copy)]
pub struct ChainLink<'a> {
    pub id: AuditRecordId,
    pub agent_id: &'a AgentId,
    pub sequence: u64,
    pub prev_hash: &'a str,
    pub kind: RecordKind,
    pub recorded_at: DateTime<Utc>,
    pub decision: &'a AuthorizationDecision,
}

impl<'a> ChainLink<'a> {
    pub fn of(record: &'a AuditRecord) -> Self {
        Self {
            id: record.id,
            agent_id: record.agent_id(),
            sequence: record.sequence,
            prev_hash: &record.prev_hash,
            kind: record.kind,
            recorded_at: record.recorded_at,
            decision: &record.decision,
        }
    }
}

fn kind_label(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Action => "action",
        RecordKind::Inquiry => "inquiry",
    }
}

/// Compute the SHA-256 hash for one chain link.
///
/// Returns a lowercase 64-character hex string, or `AuditWriteFailed` if the
/// decision cannot be serialized.
pub fn hash_record(link: &ChainLink<'_>) -> BastionResult<String> {
    let decision_json =
        serde_json::to_vec(link.decision).map_err(|e| BastionError::AuditWriteFailed {
            reason: format!("decision could not be serialized for hashing: {}", e),
            transient: false,
        })?;

    let mut hasher = Sha256::new();
    hasher.update(link.id.0.to_le_bytes());
    hasher.update(link.agent_id.as_str().as_bytes());
    hasher.update(link.sequence.to_le_bytes());
    hasher.update(link.prev_hash.as_bytes());
    hasher.update(kind_label(link.kind).as_bytes());
    hasher.update(link.recorded_at.to_rfc3339().as_bytes());
    hasher.update(&decision_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify the integrity of one agent's chain.
///
/// Returns `true` when, for every record in order:
///
/// 1. **Sequence** — `sequence` equals its position in the slice.
/// 2. **Prev-hash linkage** — `prev_hash` equals the previous record's
///    `this_hash` (or `GENESIS_HASH` for the first).
/// 3. **Hash correctness** — `this_hash` matches the value recomputed from
///    the record's own fields.
///
/// An empty chain is valid.
pub fn verify_chain(records: &[AuditRecord]) -> bool {
    let mut expected_prev = GENESIS_HASH;

    for (position, record) in records.iter().enumerate() {
        if record.sequence != position as u64 || record.prev_hash != expected_prev {
            return false;
        }

        match hash_record(&ChainLink::of(record)) {
            Ok(recomputed) if recomputed == record.this_hash => {}
            _ => return false,
        }

        expected_prev = record.this_hash.as_str();
    }

    true
}
