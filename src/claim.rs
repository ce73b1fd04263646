//! Claim extraction.
//!
//! A claim is the (subject, relation, object) triple a question or statement
//! talks about. Extraction is deliberately literal:
//!
//! - subject: the first entity span with a place/location/person/organization label
//! - relation: the first token whose lemma is a registered relation keyword
//! - object: the last token holding an object-like dependency role
//! - text starting with "is": subject and object are swapped afterwards,
//!   which fixes "Is Berlin the capital of Germany" style questions
//!
//! Multiple relation mentions or candidate subjects are resolved by these
//! first-match/last-write rules rather than rejected.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::annotation::Annotator;
use crate::relation::RelationRegistry;

/// An extracted (subject, relation, object) triple. Any part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// What the claim is about, e.g. `France`.
    pub subject: Option<String>,
    /// Relation keyword in lemma form, e.g. `capital`.
    pub relation: Option<String>,
    /// Claimed value, e.g. `Paris`.
    pub object: Option<String>,
}

impl Claim {
    /// Creates a claim from optional parts.
    #[must_use]
    pub fn new(
        subject: Option<impl Into<String>>,
        relation: Option<impl Into<String>>,
        object: Option<impl Into<String>>,
    ) -> Self {
        Self {
            subject: subject.map(Into::into),
            relation: relation.map(Into::into),
            object: object.map(Into::into),
        }
    }

    /// Shorthand for a triple with every part present.
    #[must_use]
    pub fn triple(subject: &str, relation: &str, object: &str) -> Self {
        Self::new(Some(subject), Some(relation), Some(object))
    }

    /// Subject and relation present: enough to look facts up.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.subject.is_some() && self.relation.is_some()
    }

    /// Subject, relation and object all present.
    #[must_use]
    pub const fn is_fully_specified(&self) -> bool {
        self.is_complete() && self.object.is_some()
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |p: &Option<String>| p.clone().unwrap_or_else(|| "?".to_string());
        write!(
            f,
            "({}, {}, {})",
            part(&self.subject),
            part(&self.relation),
            part(&self.object)
        )
    }
}

/// Turns annotated text into a [`Claim`].
#[derive(Clone)]
pub struct ClaimExtractor {
    annotator: Arc<dyn Annotator>,
    registry: Arc<RelationRegistry>,
}

impl ClaimExtractor {
    /// Creates an extractor over an annotator and a relation table.
    pub fn new(annotator: Arc<dyn Annotator>, registry: Arc<RelationRegistry>) -> Self {
        Self {
            annotator,
            registry,
        }
    }

    /// Relation table used to recognize relation keywords.
    #[must_use]
    pub fn registry(&self) -> &RelationRegistry {
        &self.registry
    }

    /// Extracts a claim. Never fails: missing parts are left as `None`.
    #[must_use]
    pub fn extract(&self, text: &str) -> Claim {
        let annotation = self.annotator.annotate(text);

        let mut subject = annotation
            .entities
            .iter()
            .find(|span| span.label.is_subject_candidate())
            .map(|span| span.text.clone());

        let relation = annotation
            .tokens
            .iter()
            .map(|token| token.lemma.to_lowercase())
            .find(|lemma| self.registry.contains(lemma));

        let mut object = None;
        for token in &annotation.tokens {
            if token.role.is_object_role() {
                object = Some(token.text.clone());
            }
        }

        let starts_with_is = annotation
            .tokens
            .first()
            .is_some_and(|first| first.text.eq_ignore_ascii_case("is"));
        if starts_with_is {
            std::mem::swap(&mut subject, &mut object);
        }

        let claim = Claim {
            subject,
            relation,
            object,
        };
        debug!(text, %claim, reversed = starts_with_is, "claim extracted");
        claim
    }
}

impl fmt::Debug for ClaimExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimExtractor")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{
        Annotation, DependencyRole, EntityLabel, EntitySpan, HeuristicAnnotator, Token,
    };

    struct FixedAnnotator(Annotation);

    impl Annotator for FixedAnnotator {
        fn annotate(&self, _text: &str) -> Annotation {
            self.0.clone()
        }
    }

    fn extractor() -> ClaimExtractor {
        ClaimExtractor::new(
            Arc::new(HeuristicAnnotator::new()),
            Arc::new(RelationRegistry::default()),
        )
    }

    fn fixed(annotation: Annotation) -> ClaimExtractor {
        ClaimExtractor::new(
            Arc::new(FixedAnnotator(annotation)),
            Arc::new(RelationRegistry::default()),
        )
    }

    #[test]
    fn plain_statement() {
        let claim = extractor().extract("The capital of France is Paris");
        assert_eq!(claim, Claim::triple("France", "capital", "Paris"));
        assert!(claim.is_fully_specified());
    }

    #[test]
    fn question_form() {
        let claim = extractor().extract("Who is the leader of Germany?");
        assert_eq!(claim.subject.as_deref(), Some("Germany"));
        assert_eq!(claim.relation.as_deref(), Some("leader"));
        assert!(claim.is_complete());
    }

    #[test]
    fn copula_led_question_is_reversed() {
        let claim = extractor().extract("Is Berlin the capital of Germany");
        assert_eq!(claim, Claim::triple("Germany", "capital", "Berlin"));
    }

    #[test]
    fn copula_check_is_case_insensitive() {
        let claim = extractor().extract("IS Berlin the capital of France");
        assert_eq!(claim.subject.as_deref(), Some("France"));
        assert_eq!(claim.object.as_deref(), Some("Berlin"));
    }

    #[test]
    fn copula_check_ignores_leading_punctuation() {
        for text in ["(Is Berlin the capital of Germany)", "\"Is Berlin the capital of Germany?\""] {
            let claim = extractor().extract(text);
            assert_eq!(claim, Claim::triple("Germany", "capital", "Berlin"), "{text}");
        }
    }

    #[test]
    fn copula_is_read_from_tokens() {
        let claim = fixed(Annotation {
            entities: vec![EntitySpan::new("Germany", EntityLabel::Place)],
            tokens: vec![
                Token::new("is", "is", DependencyRole::Other),
                Token::new("Berlin", "berlin", DependencyRole::Attribute),
            ],
        })
        .extract("whatever the raw text says");
        assert_eq!(claim.subject.as_deref(), Some("Berlin"));
        assert_eq!(claim.object.as_deref(), Some("Germany"));
    }

    #[test]
    fn no_known_relation() {
        let claim = extractor().extract("The mayor of Paris is Anne Hidalgo");
        assert_eq!(claim.relation, None);
        assert!(!claim.is_complete());
    }

    #[test]
    fn empty_annotation_yields_empty_claim() {
        let claim = fixed(Annotation::default()).extract("anything");
        assert_eq!(claim, Claim::default());
    }

    #[test]
    fn first_relation_mention_wins() {
        let claim = fixed(Annotation {
            entities: vec![],
            tokens: vec![
                Token::new("leader", "leader", DependencyRole::Other),
                Token::new("capital", "capital", DependencyRole::Other),
            ],
        })
        .extract("leader capital");
        assert_eq!(claim.relation.as_deref(), Some("leader"));
    }

    #[test]
    fn last_object_role_wins() {
        let claim = fixed(Annotation {
            entities: vec![],
            tokens: vec![
                Token::new("Paris", "paris", DependencyRole::Attribute),
                Token::new("Europe", "europe", DependencyRole::PrepositionalObject),
                Token::new("big", "big", DependencyRole::Other),
            ],
        })
        .extract("x");
        assert_eq!(claim.object.as_deref(), Some("Europe"));
    }

    #[test]
    fn subject_skips_non_candidate_labels() {
        let claim = fixed(Annotation {
            entities: vec![
                EntitySpan::new("1990", EntityLabel::Date),
                EntitySpan::new("Angela Merkel", EntityLabel::Person),
                EntitySpan::new("Germany", EntityLabel::Place),
            ],
            tokens: vec![],
        })
        .extract("x");
        assert_eq!(claim.subject.as_deref(), Some("Angela Merkel"));
    }

    #[test]
    fn relation_lemma_matches_case_insensitively() {
        let claim = fixed(Annotation {
            entities: vec![],
            tokens: vec![Token::new("Capital", "Capital", DependencyRole::Other)],
        })
        .extract("Capital");
        assert_eq!(claim.relation.as_deref(), Some("capital"));
    }

    #[test]
    fn display() {
        let claim = Claim::new(Some("France"), Some("capital"), None::<String>);
        assert_eq!(claim.to_string(), "(France, capital, ?)");
    }
}
