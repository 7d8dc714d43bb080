//! # clinsim-core
//!
//! The collaborator seams and the case-generation pipeline.
//!
//! This crate provides:
//! - The four traits (`CaseValidator`, `CompletionClient`, `CaseVerifier`,
//!   `AttemptRecorder`)
//! - `CaseGenerationPipeline`, which wires validator, client and verifier
//!   together in the correct order
//! - The prompt builder and `extract_json`
//! - `EngineConfig`, the TOML configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use clinsim_core::{CaseGenerationPipeline, traits::{CaseValidator, CompletionClient, CaseVerifier}};
//! ```

pub mod config;
pub mod extract;
pub mod pipeline;
pub mod prompt;
pub mod traits;

pub use config::{EngineConfig, GenerationConfig, ValidatorKind};
pub use extract::extract_json;
pub use pipeline::CaseGenerationPipeline;
