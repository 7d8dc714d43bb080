//! The assembled engine: knowledge base, validator, pipeline and evaluator.

use std::sync::Arc;

use tracing::{debug, info};

use clinsim_contracts::{
    case::{CaseRequest, Demographics, Difficulty, GeneratedCase, GenerationResult},
    error::ClinsimResult,
    evaluation::{DiagnosisAttempt, EvaluationResult},
    validation::ValidationResult,
};
use clinsim_core::{
    traits::{AttemptRecorder, CompletionClient},
    CaseGenerationPipeline, EngineConfig,
};
use clinsim_evaluate::DiagnosisEvaluator;
use clinsim_knowledge::KnowledgeBase;
use clinsim_validate::build_validator;
use clinsim_verify::{case_verifier, generated_case_schema};

/// A ready-to-use case engine.
///
/// Owns no per-request state; one instance can serve every session.
pub struct ClinsimEngine {
    knowledge: Arc<KnowledgeBase>,
    pipeline: CaseGenerationPipeline,
    evaluator: DiagnosisEvaluator,
    config: EngineConfig,
}

impl ClinsimEngine {
    /// Load the knowledge base named by `config` (the bundled document when
    /// none is named) and wire the engine around `client`.
    ///
    /// Fails only with `ClinsimError::KnowledgeLoad`.
    pub fn from_config(config: &EngineConfig, client: Box<dyn CompletionClient>) -> ClinsimResult<Self> {
        let knowledge = match &config.knowledge_path {
            Some(path) => KnowledgeBase::from_file(path)?,
            None => KnowledgeBase::bundled()?,
        };
        Ok(Self::with_knowledge(config, Arc::new(knowledge), client))
    }

    /// Wire the engine around an already loaded knowledge base.
    pub fn with_knowledge(
        config: &EngineConfig,
        knowledge: Arc<KnowledgeBase>,
        client: Box<dyn CompletionClient>,
    ) -> Self {
        let validator = build_validator(config.validator, Arc::clone(&knowledge));
        info!(
            validator = validator.name(),
            correction_attempts = config.generation.correction_attempts,
            "engine ready"
        );

        let pipeline = CaseGenerationPipeline::new(
            Arc::clone(&knowledge),
            validator,
            client,
            Box::new(case_verifier()),
            generated_case_schema(),
            config.generation.clone(),
        );

        Self {
            knowledge,
            pipeline,
            evaluator: DiagnosisEvaluator::new(),
            config: config.clone(),
        }
    }

    /// Replace the evaluator, e.g. with one using a custom synonym table.
    pub fn with_evaluator(mut self, evaluator: DiagnosisEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build a request, falling back to the configured default difficulty.
    pub fn request(
        &self,
        specialty: impl Into<String>,
        symptoms: &[&str],
        demographics: Demographics,
        severity: impl Into<String>,
        difficulty: Option<Difficulty>,
    ) -> CaseRequest {
        CaseRequest {
            specialty: specialty.into(),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            demographics,
            severity: severity.into(),
            difficulty: difficulty.unwrap_or(self.config.generation.default_difficulty),
        }
    }

    pub fn validate(&self, request: &CaseRequest) -> ValidationResult {
        self.pipeline.validate(request)
    }

    pub fn generate(&self, request: &CaseRequest) -> GenerationResult {
        self.pipeline.generate(request)
    }

    /// Score a diagnosis against any reference diagnosis.
    pub fn evaluate(&self, user_diagnosis: &str, correct_diagnosis: &str) -> EvaluationResult {
        self.evaluator.evaluate(user_diagnosis, correct_diagnosis)
    }

    /// Score a learner's guess against `case` and append the attempt to the
    /// caller's history.
    ///
    /// The returned result never contains the hidden diagnosis.
    pub fn submit_diagnosis(
        &self,
        history: &dyn AttemptRecorder,
        case: &GeneratedCase,
        user_diagnosis: &str,
    ) -> ClinsimResult<EvaluationResult> {
        let result = self.evaluator.evaluate(user_diagnosis, case.diagnosis());
        history.record(&DiagnosisAttempt::new(user_diagnosis, case.diagnosis(), &result))?;

        debug!(
            case_id = %case.case_id,
            score = result.similarity_score,
            is_correct = result.is_correct,
            "diagnosis submitted"
        );
        Ok(result)
    }
}
