//! Walk-throughs printed by the demo CLI.
//!
//! Each scenario builds its own engine around a `ScriptedCompletion`, so the
//! output is the same on every run.

pub mod assessment;
pub mod authoring;
