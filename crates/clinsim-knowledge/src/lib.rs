//! # clinsim-knowledge
//!
//! The declarative medical knowledge the validator and prompt builder read:
//! specialties, symptoms, combination and contradiction rules, age and
//! severity tables.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use clinsim_knowledge::KnowledgeBase;
//!
//! let kb = KnowledgeBase::from_file(Path::new("data/medical_knowledge.json"))?;
//! // or the reference document compiled into the crate:
//! let kb = KnowledgeBase::bundled()?;
//! ```
//!
//! All maps are `BTreeMap`s, so iteration (and every message that lists
//! keys) is sorted and deterministic.

pub mod base;
pub mod tables;

pub use base::{KnowledgeBase, SpecialtyRules, SpecialtySymptoms};
pub use tables::{
    AgeGroup, AgeRule, CombinationRule, ContradictionRule, KnowledgeDocument, SeverityDescription,
    SeverityRule, Specialty, Symptom, SymptomBounds, ValidationRules,
};

// ── Tests ─────────────────────────────────────────────────────────────────────
