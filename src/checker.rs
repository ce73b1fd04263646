//! End-to-end fact checking.
//!
//! [`FactChecker`] wires claim extraction, answer normalization and the
//! verdict engine into the three call paths the crate supports:
//!
//! - question + answer ("What is the capital of France?", "It is called Paris")
//! - standalone statement ("The capital of France is Berlin")
//! - question answered by a text-completion model
//!
//! Each call returns a [`CheckReport`] and never fails.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::annotation::Annotator;
use crate::answer::{AnswerNormalizer, CanonicalAnswer, ClarifiedAnswer};
use crate::claim::{Claim, ClaimExtractor};
use crate::completion::{CompletionRequest, TextCompletion};
use crate::config::FactCheckConfig;
use crate::error::FactCheckResult;
use crate::knowledge::{EntityResolver, FactRetriever, FactSet, KnowledgeBase, KnowledgeEntity};
use crate::verdict::{judge, judge_clarified, UnverifiableReason, Verdict, VerdictEngine};

/// Unique identifier of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckId(Uuid);

impl CheckId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CheckId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything a check saw and decided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    /// Unique id of this check.
    pub id: CheckId,
    /// The question or statement that was checked.
    pub input: String,
    /// Raw candidate answer, if there was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Claim extracted from `input`.
    pub claim: Claim,
    /// Knowledge-base entity the claim's subject resolved to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_entity: Option<KnowledgeEntity>,
    /// Canonical form of `answer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<CanonicalAnswer>,
    /// Knowledge-base entity an entity answer resolved to, when answer
    /// entities are validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_entity: Option<KnowledgeEntity>,
    /// Entities the answer explicitly ruled out (negation-aware mode only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<String>,
    /// Outcome of the check.
    pub verdict: Verdict,
    /// When the check finished.
    pub checked_at: DateTime<Utc>,
}

impl CheckReport {
    fn new(input: &str, answer: Option<&str>, claim: Claim) -> Self {
        Self {
            id: CheckId::new(),
            input: input.to_string(),
            answer: answer.map(ToString::to_string),
            claim,
            subject_entity: None,
            canonical: None,
            answer_entity: None,
            rejected: Vec::new(),
            verdict: Verdict::Unverifiable(UnverifiableReason::UnparseableClaim),
            checked_at: Utc::now(),
        }
    }

    fn finish(mut self, verdict: Verdict) -> Self {
        self.verdict = verdict;
        info!(
            id = %self.id,
            input = %self.input,
            claim = %self.claim,
            subject = ?self.subject_entity.as_ref().map(|e| e.id.as_str()),
            verdict = %self.verdict,
            "fact check finished"
        );
        self
    }
}

/// Claim extraction, answer normalization and verification in one place.
#[derive(Debug, Clone)]
pub struct FactChecker {
    config: FactCheckConfig,
    extractor: ClaimExtractor,
    normalizer: AnswerNormalizer,
    engine: VerdictEngine,
}

impl FactChecker {
    /// Builds a checker; fails only on invalid configuration.
    pub fn new(
        config: FactCheckConfig,
        annotator: Arc<dyn Annotator>,
        kb: Arc<dyn KnowledgeBase>,
    ) -> FactCheckResult<Self> {
        config.validate()?;
        let registry = Arc::new(config.relation_registry()?);

        let extractor = ClaimExtractor::new(annotator.clone(), registry.clone());
        let normalizer = AnswerNormalizer::new(annotator, &config.variants)?;

        let retriever = FactRetriever::new(kb.clone())
            .with_languages(config.language.clone(), config.fallback_language.clone())
            .with_max_facts(config.max_facts);
        let engine = VerdictEngine::new(registry, EntityResolver::new(kb), retriever)
            .with_policy(config.match_policy)?;

        Ok(Self {
            config,
            extractor,
            normalizer,
            engine,
        })
    }

    /// Configuration the checker was built from.
    #[must_use]
    pub fn config(&self) -> &FactCheckConfig {
        &self.config
    }

    /// Claim extractor in use.
    #[must_use]
    pub fn extractor(&self) -> &ClaimExtractor {
        &self.extractor
    }

    /// Answer normalizer in use.
    #[must_use]
    pub fn normalizer(&self) -> &AnswerNormalizer {
        &self.normalizer
    }

    /// Verdict engine in use.
    #[must_use]
    pub fn engine(&self) -> &VerdictEngine {
        &self.engine
    }

    /// Checks a candidate answer to a question.
    #[must_use]
    pub fn check_answer(&self, question: &str, answer: &str) -> CheckReport {
        let claim = self.extractor.extract(question);
        let clarified = if self.config.negation_aware {
            self.normalizer.normalize_clarified(answer)
        } else {
            ClarifiedAnswer::plain(self.normalizer.normalize(answer))
        };

        let mut report = CheckReport::new(question, Some(answer), claim);
        report.canonical = Some(clarified.canonical.clone());
        report.rejected = clarified.rejected.clone();

        let facts = match self.lookup_into(&mut report) {
            Ok(facts) => facts,
            Err(reason) => return report.finish(Verdict::Unverifiable(reason)),
        };

        if self.config.validate_answer_entities {
            if let Some(name) = clarified.canonical.as_entity() {
                match self.engine.resolver().resolve(name) {
                    Some(entity) => report.answer_entity = Some(entity),
                    None => {
                        return report.finish(Verdict::Unverifiable(
                            UnverifiableReason::UnknownAnswerEntity,
                        ));
                    }
                }
            }
        }

        let verdict = judge_clarified(&clarified, &facts, self.engine.policy());
        report.finish(verdict)
    }

    /// Checks a statement's own object against the knowledge base.
    #[must_use]
    pub fn check_statement(&self, statement: &str) -> CheckReport {
        let claim = self.extractor.extract(statement);
        let mut report = CheckReport::new(statement, None, claim);
        let Some(object) = report.claim.object.clone() else {
            return report.finish(Verdict::Unverifiable(UnverifiableReason::UnparseableClaim));
        };

        let canonical = CanonicalAnswer::Entity(object);
        let verdict = match self.lookup_into(&mut report) {
            Ok(facts) => judge(&canonical, &facts, self.engine.policy()),
            Err(reason) => Verdict::Unverifiable(reason),
        };
        report.finish(verdict)
    }

    // Records the linked subject even when retrieval fails afterwards.
    fn lookup_into(&self, report: &mut CheckReport) -> Result<FactSet, UnverifiableReason> {
        let resolved = self.engine.resolve_claim(&report.claim)?;
        let facts = self.engine.retrieve_facts(&resolved);
        report.subject_entity = Some(resolved.subject);
        facts
    }

    /// Asks a completion model the question and checks its answer.
    #[must_use]
    pub fn ask(&self, question: &str, completion: &dyn TextCompletion) -> CheckReport {
        match completion.complete(&CompletionRequest::new(question)) {
            Ok(text) => self.check_answer(question, text.trim()),
            Err(err) => {
                warn!(question, error = %err, "completion failed");
                let claim = self.extractor.extract(question);
                CheckReport::new(question, None, claim)
                    .finish(Verdict::Unverifiable(UnverifiableReason::CompletionFailed))
            }
        }
    }
}
