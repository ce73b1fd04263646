//! The verdict engine.
//!
//! Combines a [`Claim`] with a [`CanonicalAnswer`], looks the claim's facts
//! up and decides whether the answer agrees with them. Every call terminates
//! in [`Verdict::Match`], [`Verdict::NoMatch`] or
//! [`Verdict::Unverifiable`]; failures never escape as errors.
//!
//! Yes/no answers are judged with the "existence implies yes" heuristic: a
//! non-empty fact set counts as "yes". This says nothing about whether a
//! specific claimed value is right ("Is Berlin the capital of France?" →
//! "yes" matches, because France has *a* capital). Use
//! [`VerdictEngine::verify_statement`] when the claim's object should be
//! compared.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::answer::{CanonicalAnswer, ClarifiedAnswer};
use crate::claim::Claim;
use crate::error::ValidationError;
use crate::knowledge::{EntityResolver, FactRetriever, FactSet, KnowledgeEntity};
use crate::relation::RelationRegistry;
use crate::similarity::folded_ratio;

/// Default fuzzy-match threshold on the 0.0–1.0 similarity scale.
pub const DEFAULT_THRESHOLD: f64 = 0.85;

/// Why a claim could not be verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnverifiableReason {
    /// The claim is missing its subject or relation (or object, for statements).
    UnparseableClaim,
    /// The relation keyword has no property mapping.
    UnsupportedRelation,
    /// The subject did not resolve to a knowledge-base entity.
    UnknownSubject,
    /// The fact lookup failed.
    RetrievalFailed,
    /// An entity answer does not exist in the knowledge base.
    UnknownAnswerEntity,
    /// No candidate answer could be generated.
    CompletionFailed,
}

impl UnverifiableReason {
    /// Human-readable reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnparseableClaim => "unparseable claim",
            Self::UnsupportedRelation => "unsupported relation",
            Self::UnknownSubject => "unknown subject",
            Self::RetrievalFailed => "retrieval failed",
            Self::UnknownAnswerEntity => "unknown answer entity",
            Self::CompletionFailed => "completion failed",
        }
    }
}

impl fmt::Display for UnverifiableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    /// The answer agrees with the knowledge base.
    Match,
    /// A definite negative verification. Not an error.
    NoMatch,
    /// The claim could not be checked.
    Unverifiable(UnverifiableReason),
}

impl Verdict {
    /// Returns true for `Match`.
    #[must_use]
    pub const fn is_match(self) -> bool {
        matches!(self, Self::Match)
    }

    /// Returns true for `Unverifiable`.
    #[must_use]
    pub const fn is_unverifiable(self) -> bool {
        matches!(self, Self::Unverifiable(_))
    }

    /// The reason, if unverifiable.
    #[must_use]
    pub const fn reason(self) -> Option<UnverifiableReason> {
        match self {
            Self::Unverifiable(reason) => Some(reason),
            _ => None,
        }
    }

    const fn from_bool(matched: bool) -> Self {
        if matched {
            Self::Match
        } else {
            Self::NoMatch
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match => f.write_str("match"),
            Self::NoMatch => f.write_str("no match"),
            Self::Unverifiable(reason) => write!(f, "unverifiable: {reason}"),
        }
    }
}

/// How entity answers are compared with fact labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Case-sensitive equality with one of the labels.
    Exact,
    /// Case-folded similarity ratio of at least `threshold` (0.0–1.0) with one of the labels.
    Fuzzy { threshold: f64 },
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self::Fuzzy {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl MatchPolicy {
    /// Fuzzy policy with the given threshold.
    #[must_use]
    pub const fn fuzzy(threshold: f64) -> Self {
        Self::Fuzzy { threshold }
    }

    /// Rejects thresholds outside `[0.0, 1.0]`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            Self::Exact => Ok(()),
            Self::Fuzzy { threshold } if (0.0..=1.0).contains(&threshold) => Ok(()),
            Self::Fuzzy { threshold } => Err(ValidationError::ThresholdOutOfRange { value: threshold }),
        }
    }

    /// True if `candidate` matches at least one label in `facts`.
    #[must_use]
    pub fn matches(&self, candidate: &str, facts: &FactSet) -> bool {
        match *self {
            Self::Exact => facts.contains(candidate),
            Self::Fuzzy { threshold } => facts
                .iter()
                .any(|label| folded_ratio(candidate, label) >= threshold),
        }
    }
}

/// Compares a canonical answer with an already retrieved fact set.
#[must_use]
pub fn judge(canonical: &CanonicalAnswer, facts: &FactSet, policy: MatchPolicy) -> Verdict {
    match canonical {
        CanonicalAnswer::Affirmative | CanonicalAnswer::Negative => {
            let truth = !facts.is_empty();
            Verdict::from_bool(canonical.polarity() == Some(truth))
        }
        CanonicalAnswer::Entity(candidate) => Verdict::from_bool(policy.matches(candidate, facts)),
    }
}

/// Negation-aware counterpart of [`judge`].
#[must_use]
pub fn judge_clarified(answer: &ClarifiedAnswer, facts: &FactSet, policy: MatchPolicy) -> Verdict {
    if answer
        .rejected
        .iter()
        .any(|rejected| policy.matches(rejected, facts))
    {
        return Verdict::NoMatch;
    }
    if answer.bare_rejection {
        return Verdict::Match;
    }
    judge(&answer.canonical, facts, policy)
}

/// A claim whose relation and subject were linked to the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClaim {
    /// Entity the claim's subject resolved to.
    pub subject: KnowledgeEntity,
    /// Property the claim's relation maps to, e.g. `P36`.
    pub property_id: String,
}

/// Outcome of a successful [`VerdictEngine::lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimFacts {
    /// The linked claim.
    pub resolved: ResolvedClaim,
    /// Values held for the linked (subject, property) pair.
    pub facts: FactSet,
}

/// Looks claims up and judges answers against the retrieved facts.
#[derive(Debug, Clone)]
pub struct VerdictEngine {
    registry: Arc<RelationRegistry>,
    resolver: EntityResolver,
    retriever: FactRetriever,
    policy: MatchPolicy,
}

impl VerdictEngine {
    /// Creates an engine with the default fuzzy policy.
    pub fn new(
        registry: Arc<RelationRegistry>,
        resolver: EntityResolver,
        retriever: FactRetriever,
    ) -> Self {
        Self {
            registry,
            resolver,
            retriever,
            policy: MatchPolicy::default(),
        }
    }

    /// Replaces the match policy, rejecting out-of-range thresholds.
    pub fn with_policy(mut self, policy: MatchPolicy) -> Result<Self, ValidationError> {
        policy.validate()?;
        self.policy = policy;
        Ok(self)
    }

    /// Policy used by `verify`.
    #[must_use]
    pub const fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Resolver used for subject lookups.
    #[must_use]
    pub fn resolver(&self) -> &EntityResolver {
        &self.resolver
    }

    /// Maps the relation to its property and links the subject to a
    /// knowledge-base entity.
    ///
    /// Incomplete claims stop before any external call.
    pub fn resolve_claim(&self, claim: &Claim) -> Result<ResolvedClaim, UnverifiableReason> {
        let (Some(subject), Some(relation)) = (claim.subject.as_deref(), claim.relation.as_deref())
        else {
            return Err(UnverifiableReason::UnparseableClaim);
        };

        let property_id = self
            .registry
            .resolve(relation)
            .ok_or(UnverifiableReason::UnsupportedRelation)?;

        let subject = self
            .resolver
            .resolve(subject)
            .ok_or(UnverifiableReason::UnknownSubject)?;

        Ok(ResolvedClaim {
            subject,
            property_id: property_id.to_string(),
        })
    }

    /// Retrieves the values of a resolved claim.
    pub fn retrieve_facts(&self, resolved: &ResolvedClaim) -> Result<FactSet, UnverifiableReason> {
        let facts = self
            .retriever
            .retrieve(&resolved.subject, &resolved.property_id)
            .ok_or(UnverifiableReason::RetrievalFailed)?;
        debug!(
            entity = %resolved.subject.id,
            property_id = %resolved.property_id,
            values = facts.len(),
            "claim facts"
        );
        Ok(facts)
    }

    /// Runs the whole lookup chain: registry, subject resolution, fact retrieval.
    pub fn lookup(&self, claim: &Claim) -> Result<ClaimFacts, UnverifiableReason> {
        let resolved = self.resolve_claim(claim)?;
        let facts = self.retrieve_facts(&resolved)?;
        Ok(ClaimFacts { resolved, facts })
    }

    /// Verifies an answer with the configured policy.
    #[must_use]
    pub fn verify(&self, claim: &Claim, canonical: &CanonicalAnswer) -> Verdict {
        self.verify_with_policy(claim, canonical, self.policy)
    }

    /// Verifies an answer with an explicit policy.
    #[must_use]
    pub fn verify_with_policy(
        &self,
        claim: &Claim,
        canonical: &CanonicalAnswer,
        policy: MatchPolicy,
    ) -> Verdict {
        match self.lookup(claim) {
            Ok(found) => judge(canonical, &found.facts, policy),
            Err(reason) => Verdict::Unverifiable(reason),
        }
    }

    /// Negation-aware verification.
    ///
    /// An answer that rules out a true value ("not Paris" when the capital is
    /// Paris) is a `NoMatch`. An answer made only of rejections that all miss
    /// the facts is a `Match`. Anything else is judged on its canonical part.
    #[must_use]
    pub fn verify_clarified(&self, claim: &Claim, answer: &ClarifiedAnswer) -> Verdict {
        match self.lookup(claim) {
            Ok(found) => judge_clarified(answer, &found.facts, self.policy),
            Err(reason) => Verdict::Unverifiable(reason),
        }
    }

    /// Checks a statement's own object against the facts.
    ///
    /// "The capital of France is Berlin" is a `NoMatch`; a statement without
    /// an object is unparseable.
    #[must_use]
    pub fn verify_statement(&self, claim: &Claim) -> Verdict {
        let Some(object) = claim.object.as_deref() else {
            return Verdict::Unverifiable(UnverifiableReason::UnparseableClaim);
        };
        self.verify(claim, &CanonicalAnswer::Entity(object.to_string()))
    }
}
