//! Engine configuration loaded from TOML.
//!
//! Every field has a default, so an empty document is a valid configuration.
//!
//! ```toml
//! knowledge_path = "crates/clinsim-knowledge/data/medical_knowledge.json"
//! validator = "knowledge"          # or "legacy"
//!
//! [generation]
//! default_difficulty = "intermediate"
//! correction_attempts = 0
//! system_instruction = "You are an expert medical case generator."
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use clinsim_contracts::{
    case::Difficulty,
    error::{ClinsimError, ClinsimResult},
};

use crate::prompt::DEFAULT_SYSTEM_INSTRUCTION;

/// Which `CaseValidator` implementation the engine is built with.
///
/// ```toml
/// validator = "knowledge"
/// validator = "legacy"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorKind {
    /// Rule tables from the loaded knowledge document.
    #[default]
    Knowledge,
    /// The fixed built-in specialty and symptom tables.
    Legacy,
}

/// Settings for the case-generation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Difficulty used when the caller does not ask for one.
    pub default_difficulty: Difficulty,

    /// Follow-up completion calls allowed after a parse or verification
    /// failure. `0` means a single call per `generate`.
    pub correction_attempts: u32,

    /// Overrides the system instruction sent with every completion call.
    pub system_instruction: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_difficulty: Difficulty::Intermediate,
            correction_attempts: 0,
            system_instruction: None,
        }
    }
}

impl GenerationConfig {
    /// The configured system instruction, or the built-in one.
    pub fn system_instruction(&self) -> &str {
        self.system_instruction
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_INSTRUCTION)
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Knowledge document to load. `None` selects the bundled document.
    pub knowledge_path: Option<PathBuf>,
    pub validator: ValidatorKind,
    pub generation: GenerationConfig,
}

impl EngineConfig {
    /// Parse `s` as TOML engine configuration.
    ///
    /// Returns `ClinsimError::Config` if the TOML is malformed or a value has
    /// the wrong shape.
    pub fn from_toml_str(s: &str) -> ClinsimResult<Self> {
        toml::from_str(s).map_err(|e| ClinsimError::Config {
            reason: format!("failed to parse engine TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as TOML engine configuration.
    pub fn from_file(path: &Path) -> ClinsimResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ClinsimError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.validator, ValidatorKind::Knowledge);
        assert_eq!(config.generation.correction_attempts, 0);
        assert_eq!(config.generation.system_instruction(), DEFAULT_SYSTEM_INSTRUCTION);
    }

    #[test]
    fn full_document_parses() {
        let toml = r#"
            knowledge_path = "/etc/clinsim/knowledge.json"
            validator = "legacy"

            [generation]
            default_difficulty = "advanced"
            correction_attempts = 2
            system_instruction = "Respond with JSON."
        "#;
        let config = EngineConfig::from_toml_str(toml).unwrap();

        assert_eq!(
            config.knowledge_path.as_deref(),
            Some(Path::new("/etc/clinsim/knowledge.json"))
        );
        assert_eq!(config.validator, ValidatorKind::Legacy);
        assert_eq!(config.generation.default_difficulty, Difficulty::Advanced);
        assert_eq!(config.generation.correction_attempts, 2);
        assert_eq!(config.generation.system_instruction(), "Respond with JSON.");
    }

    #[test]
    fn unknown_validator_is_config_error() {
        let err = EngineConfig::from_toml_str(r#"validator = "fuzzy""#).unwrap_err();
        assert!(matches!(err, ClinsimError::Config { .. }), "got: {err:?}");
    }

    #[test]
    fn malformed_toml_is_config_error() {
        match EngineConfig::from_toml_str("validator = ") {
            Err(ClinsimError::Config { reason }) => {
                assert!(reason.contains("failed to parse engine TOML"), "got: {reason}")
            }
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/clinsim.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
