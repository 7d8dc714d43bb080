//! # clinsim-contracts
//!
//! Shared types, result records, and error contracts for the clinsim case
//! engine.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod case;
pub mod error;
pub mod evaluation;
pub mod validation;
pub mod verify;
