//! In-memory implementation of `AttemptRecorder`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info, warn};

use clinsim_contracts::{
    error::{ClinsimError, ClinsimResult},
    evaluation::DiagnosisAttempt,
};
use clinsim_core::traits::AttemptRecorder;

use crate::{
    chain::{hash_event, verify_chain},
    event::{AttemptEvent, AttemptLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct HistoryState {
    pub(crate) events: Vec<AttemptEvent>,
    pub(crate) sequence: u64,
    /// `this_hash` of the last event, `GENESIS_HASH` before the first.
    pub(crate) last_hash: String,
    pub(crate) sealed: bool,
}

// ── Public history ────────────────────────────────────────────────────────────

/// Append-only attempt history for one learner session, hash-chained with
/// SHA-256.
///
/// `record` and `seal` lock an internal `Mutex`, so one history can be
/// shared across threads behind an `Arc`.
pub struct InMemoryAttemptHistory {
    session_id: String,
    pub(crate) state: Arc<Mutex<HistoryState>>,
}

impl InMemoryAttemptHistory {
    pub fn new(session_id: impl Into<String>) -> Self {
        let state = HistoryState {
            events: Vec::new(),
            sequence: 0,
            last_hash: AttemptEvent::GENESIS_HASH.to_string(),
            sealed: false,
        };
        Self {
            session_id: session_id.into(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Read access for snapshots. A poisoned lock still holds a consistent
    /// chain, because events are pushed only after their hash is computed.
    fn read(&self) -> MutexGuard<'_, HistoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> ClinsimResult<MutexGuard<'_, HistoryState>> {
        self.state.lock().map_err(|e| ClinsimError::History {
            reason: format!("history lock poisoned: {e}"),
        })
    }

    /// Snapshot of every event recorded so far.
    pub fn export_log(&self) -> AttemptLog {
        let state = self.read();
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        AttemptLog {
            session_id: self.session_id.clone(),
            events: state.events.clone(),
            exported_at: Utc::now(),
            terminal_hash,
            sealed: state.sealed,
        }
    }

    /// Whether the in-memory chain is still intact.
    pub fn verify_integrity(&self) -> bool {
        verify_chain(&self.read().events)
    }

    pub fn len(&self) -> usize {
        self.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().events.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.read().sealed
    }

    /// Highest similarity score recorded so far.
    pub fn best_score(&self) -> Option<f64> {
        self.read()
            .events
            .iter()
            .map(|e| e.attempt.similarity_score)
            .reduce(f64::max)
    }

    /// Whether any recorded attempt was correct.
    pub fn solved(&self) -> bool {
        self.read().events.iter().any(|e| e.attempt.is_correct)
    }
}

// ── AttemptRecorder impl ──────────────────────────────────────────────────────

impl AttemptRecorder for InMemoryAttemptHistory {
    fn record(&self, attempt: &DiagnosisAttempt) -> ClinsimResult<()> {
        let mut state = self.write()?;
        if state.sealed {
            warn!(session_id = %self.session_id, "attempt rejected by sealed history");
            return Err(ClinsimError::History {
                reason: format!("history for session '{}' is sealed", self.session_id),
            });
        }

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let this_hash = hash_event(&self.session_id, sequence, attempt, &prev_hash);

        state.events.push(AttemptEvent {
            sequence,
            session_id: self.session_id.clone(),
            attempt: attempt.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.sequence += 1;
        state.last_hash = this_hash;

        debug!(
            session_id = %self.session_id,
            sequence,
            is_correct = attempt.is_correct,
            "attempt recorded"
        );
        Ok(())
    }

    /// Sealing twice is allowed and logs nothing the second time.
    fn seal(&self) -> ClinsimResult<()> {
        let mut state = self.write()?;
        if state.sealed {
            return Ok(());
        }
        state.sealed = true;

        info!(
            session_id = %self.session_id,
            event_count = state.events.len(),
            terminal_hash = %state.last_hash,
            "attempt history sealed"
        );
        Ok(())
    }
}
