//! # clinsim-verify
//!
//! Verification of parsed completion objects before they become cases.
//!
//! This crate provides [`engine::SchemaVerifier`], which implements the
//! [`clinsim_core::traits::CaseVerifier`] trait, and the
//! [`schema::generated_case_schema`] it is normally run with:
//!
//! 1. **Structural**: JSON Schema validation via the `jsonschema` crate.
//! 2. **Field rules**: `RequiredField`, `AllowedValues`, `MinLength`,
//!    `MinItems` and `Custom` rules evaluated against the payload.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use clinsim_verify::{case_verifier, generated_case_schema};
//!
//! let verifier = case_verifier();
//! let report = verifier.verify(&payload, &generated_case_schema())?;
//! ```

pub mod engine;
pub mod schema;

pub use engine::{CustomVerifierFn, SchemaVerifier};
pub use schema::{case_verifier, generated_case_schema, GENERATED_CASE_SCHEMA_ID};
