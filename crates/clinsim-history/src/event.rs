//! Attempt event and exported log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clinsim_contracts::evaluation::DiagnosisAttempt;

/// One diagnosis attempt linked into a session's hash chain.
///
/// Changing any field, including those of `attempt`, invalidates
/// `this_hash` and every later `prev_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    pub session_id: String,

    pub attempt: DiagnosisAttempt,

    /// `this_hash` of the previous event, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    /// Hex SHA-256 over (session_id, sequence, prev_hash, attempt JSON).
    pub this_hash: String,
}

impl AttemptEvent {
    /// `prev_hash` of the first event in every chain: 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// Snapshot of a session's history.
///
/// `terminal_hash` is the last event's `this_hash` (empty when there are no
/// events) and commits to the whole log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptLog {
    pub session_id: String,
    pub events: Vec<AttemptEvent>,
    pub exported_at: DateTime<Utc>,
    pub terminal_hash: String,
    pub sealed: bool,
}

impl AttemptLog {
    /// Highest similarity score recorded, `None` for an empty log.
    pub fn best_score(&self) -> Option<f64> {
        self.events
            .iter()
            .map(|e| e.attempt.similarity_score)
            .reduce(f64::max)
    }

    /// Whether any recorded attempt was correct.
    pub fn solved(&self) -> bool {
        self.events.iter().any(|e| e.attempt.is_correct)
    }
}
