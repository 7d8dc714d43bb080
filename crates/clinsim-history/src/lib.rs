//! # clinsim-history
//!
//! Append-only history of a learner's diagnosis attempts.
//!
//! Every attempt is wrapped in an `AttemptEvent` that links to the previous
//! event through its SHA-256 hash, so editing or reordering recorded
//! attempts is detected by `verify_chain`. Histories belong to the caller's
//! session; the engine only produces the attempts.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use clinsim_core::traits::AttemptRecorder;
//! use clinsim_history::InMemoryAttemptHistory;
//!
//! let history = InMemoryAttemptHistory::new("session-42");
//! history.record(&evaluator.attempt("heart attack", &case.illness))?;
//! history.seal()?;
//!
//! assert!(history.verify_integrity());
//! let log = history.export_log();
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{AttemptEvent, AttemptLog};
pub use memory::InMemoryAttemptHistory;

// ── Tests ─────────────────────────────────────────────────────────────────────
