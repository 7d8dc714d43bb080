//! # clinsim-engine
//!
//! Reference wiring of the clinsim crates into one engine.
//!
//! [`ClinsimEngine::from_config`] loads the knowledge base, builds the
//! configured validator, the generated-case verifier and the generation
//! pipeline, and pairs them with a [`DiagnosisEvaluator`]. Completion is
//! delegated to any [`CompletionClient`]; [`mock_data::ScriptedCompletion`]
//! replays fixed replies for demos and tests.
//!
//! Two walk-throughs live in [`scenarios`]:
//!
//! 1. **Case authoring**: validation, rejection and generation with one
//!    correction round.
//! 2. **Diagnosis assessment**: scoring guesses into a hash-chained history.
//!
//! [`DiagnosisEvaluator`]: clinsim_evaluate::DiagnosisEvaluator
//! [`CompletionClient`]: clinsim_core::traits::CompletionClient

pub mod engine;
pub mod mock_data;
pub mod scenarios;

pub use engine::ClinsimEngine;

// ── Tests ─────────────────────────────────────────────────────────────────────
