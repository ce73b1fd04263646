//! Answer normalization.
//!
//! Free-text answers ("Sure it does", "I think it's Berlin") are reduced to a
//! [`CanonicalAnswer`]. Checks run in a fixed order, first match wins:
//!
//! 1. contains an affirmative variant → `Affirmative`
//! 2. contains a negative variant → `Negative`
//! 3. the annotator finds an entity → `Entity(first span)`
//! 4. otherwise → `Entity(trimmed text)`
//!
//! Variant checks are case-insensitive substring containment, not whole-word
//! matches, so "nope" anywhere in the answer counts. The yes/no checks must
//! run before the entity fallback: "No, it's Paris" is a `Negative`.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::annotation::Annotator;
use crate::config::AnswerVariants;
use crate::error::{FactCheckError, ValidationError};

/// "not X" where X is a capitalized word sequence or a number.
const CLARIFICATION_PATTERN: &str = r"\b(?i:not)\s+((?:\p{Lu}|\d)[\w'-]*(?:\s+\p{Lu}[\w'-]*)*)";

/// Canonical form of a free-text answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CanonicalAnswer {
    /// "yes" and its variants.
    Affirmative,
    /// "no" and its variants.
    Negative,
    /// A named entity, compared against fact labels.
    Entity(String),
}

impl CanonicalAnswer {
    /// `Some(true)` for affirmative, `Some(false)` for negative, `None` for entities.
    #[must_use]
    pub const fn polarity(&self) -> Option<bool> {
        match self {
            Self::Affirmative => Some(true),
            Self::Negative => Some(false),
            Self::Entity(_) => None,
        }
    }

    /// The entity name, if this is an entity answer.
    #[must_use]
    pub fn as_entity(&self) -> Option<&str> {
        match self {
            Self::Entity(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true for entity answers.
    #[must_use]
    pub const fn is_entity(&self) -> bool {
        matches!(self, Self::Entity(_))
    }
}

impl fmt::Display for CanonicalAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Affirmative => f.write_str("yes"),
            Self::Negative => f.write_str("no"),
            Self::Entity(name) => f.write_str(name),
        }
    }
}

/// Result of negation-aware normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarifiedAnswer {
    /// Canonical form of the answer once clarifications are removed.
    pub canonical: CanonicalAnswer,
    /// Entities explicitly ruled out ("not Madrid"), in order of appearance.
    pub rejected: Vec<String>,
    /// True when nothing besides the clarifications names an entity ("Not Berlin").
    pub bare_rejection: bool,
}

impl ClarifiedAnswer {
    /// An answer without clarifications.
    #[must_use]
    pub const fn plain(canonical: CanonicalAnswer) -> Self {
        Self {
            canonical,
            rejected: Vec::new(),
            bare_rejection: false,
        }
    }

    /// Returns true if the answer rejected at least one entity.
    #[must_use]
    pub fn has_clarification(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// Maps raw answers to [`CanonicalAnswer`]s.
#[derive(Clone)]
pub struct AnswerNormalizer {
    annotator: Arc<dyn Annotator>,
    affirmative: Vec<String>,
    negative: Vec<String>,
    clarification: Regex,
}

impl AnswerNormalizer {
    /// Builds a normalizer from the configured variant lists.
    pub fn new(
        annotator: Arc<dyn Annotator>,
        variants: &AnswerVariants,
    ) -> Result<Self, FactCheckError> {
        let lower = |list: &[String]| -> Vec<String> {
            list.iter()
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .collect()
        };
        let affirmative = lower(&variants.affirmative);
        let negative = lower(&variants.negative);
        if affirmative.is_empty() {
            return Err(ValidationError::EmptyVariantList {
                list: "affirmative".to_string(),
            }
            .into());
        }
        if negative.is_empty() {
            return Err(ValidationError::EmptyVariantList {
                list: "negative".to_string(),
            }
            .into());
        }

        let clarification = Regex::new(CLARIFICATION_PATTERN)
            .map_err(|e| FactCheckError::internal(format!("clarification pattern: {e}")))?;

        Ok(Self {
            annotator,
            affirmative,
            negative,
            clarification,
        })
    }

    fn contains_any(haystack: &str, variants: &[String]) -> bool {
        variants.iter().any(|v| haystack.contains(v.as_str()))
    }

    /// Normalizes a raw answer. Pure: the same input always gives the same output.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> CanonicalAnswer {
        let lower = raw.to_lowercase();
        let canonical = if Self::contains_any(&lower, &self.affirmative) {
            CanonicalAnswer::Affirmative
        } else if Self::contains_any(&lower, &self.negative) {
            CanonicalAnswer::Negative
        } else {
            let annotation = self.annotator.annotate(raw);
            match annotation.entities.into_iter().next() {
                Some(span) => CanonicalAnswer::Entity(span.text),
                None => CanonicalAnswer::Entity(raw.trim().to_string()),
            }
        };
        debug!(raw, %canonical, "answer normalized");
        canonical
    }

    /// Negation-aware normalization.
    ///
    /// "not X" clarifications are pulled out into `rejected` and the rest of
    /// the answer is normalized as usual. When the rest names no entity of
    /// its own ("Not Paris", "It's not Paris", "No, not Paris") the answer is
    /// a bare rejection: an implicit `Negative` aimed at the rejected entity.
    #[must_use]
    pub fn normalize_clarified(&self, raw: &str) -> ClarifiedAnswer {
        let rejected: Vec<String> = self
            .clarification
            .captures_iter(raw)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect();

        if rejected.is_empty() {
            return ClarifiedAnswer::plain(self.normalize(raw));
        }

        // What is left either names another entity ("Paris, not Madrid") or
        // only restates the rejection ("It's not Berlin", "No, not Berlin").
        let residue = self.clarification.replace_all(raw, " ");
        let canonical = self.normalize(&residue);
        let bare_rejection = match &canonical {
            CanonicalAnswer::Affirmative => false,
            CanonicalAnswer::Negative => true,
            CanonicalAnswer::Entity(_) => self.annotator.annotate(&residue).entities.is_empty(),
        };
        let canonical = if bare_rejection {
            CanonicalAnswer::Negative
        } else {
            canonical
        };

        debug!(raw, ?rejected, %canonical, "clarified answer normalized");
        ClarifiedAnswer {
            canonical,
            rejected,
            bare_rejection,
        }
    }
}

impl fmt::Debug for AnswerNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnswerNormalizer")
            .field("affirmative", &self.affirmative)
            .field("negative", &self.negative)
            .finish_non_exhaustive()
    }
}
