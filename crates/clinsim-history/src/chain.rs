//! Hashing and verification of the attempt chain.
//!
//! Hash input, in order:
//!   1. session_id as UTF-8
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 (64 hex chars)
//!   4. compact JSON of the attempt

use sha2::{Digest, Sha256};

use clinsim_contracts::evaluation::DiagnosisAttempt;

use crate::event::AttemptEvent;

/// Lowercase hex SHA-256 of one event's content.
///
/// # Panics
///
/// Panics if `attempt` cannot be serialized, which a `DiagnosisAttempt`
/// (strings, numbers, booleans and a timestamp) never fails to do.
pub fn hash_event(
    session_id: &str,
    sequence: u64,
    attempt: &DiagnosisAttempt,
    prev_hash: &str,
) -> String {
    let attempt_json =
        serde_json::to_vec(attempt).expect("DiagnosisAttempt must always serialize to JSON");

    let mut hasher = Sha256::new();
    hasher.update(session_id.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&attempt_json);

    hex::encode(hasher.finalize())
}

/// `true` when every event links to its predecessor (genesis for the first),
/// carries the expected sequence number and hashes to its stored
/// `this_hash`. An empty chain is valid.
pub fn verify_chain(events: &[AttemptEvent]) -> bool {
    let mut expected_prev = AttemptEvent::GENESIS_HASH;

    for (position, event) in events.iter().enumerate() {
        if event.sequence != position as u64 || event.prev_hash != expected_prev {
            return false;
        }

        let recomputed = hash_event(
            &event.session_id,
            event.sequence,
            &event.attempt,
            &event.prev_hash,
        );
        if event.this_hash != recomputed {
            return false;
        }

        expected_prev = &event.this_hash;
    }

    true
}
