//! Knowledge-base seam.
//!
//! The verifier never talks to a concrete store directly. Anything that can
//! search entities by name and list the values of an (entity, property) pair
//! can back it: the in-memory store for tests and embedded use, or the
//! Wikidata client behind the `http` feature.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Knowledge-base entity identifier, e.g. `Q142`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wraps an identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for Wikidata item ids (`Q` followed by digits).
    #[must_use]
    pub fn is_item_id(&self) -> bool {
        is_prefixed_number(&self.0, 'Q')
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

pub(crate) fn is_prefixed_number(value: &str, prefix: char) -> bool {
    value
        .strip_prefix(prefix)
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

/// An entity resolved from a free-text name.
///
/// Two entities are equal when their ids are equal; labels are display only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntity {
    /// Knowledge-base identifier.
    pub id: EntityId,
    /// Display label.
    pub label: String,
}

impl KnowledgeEntity {
    /// Creates an entity.
    #[must_use]
    pub fn new(id: impl Into<EntityId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

impl PartialEq for KnowledgeEntity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for KnowledgeEntity {}

impl Hash for KnowledgeEntity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for KnowledgeEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.id)
    }
}

/// All values the knowledge base holds for one (entity, property) pair.
///
/// An empty set is a valid answer ("no such fact"). A failed lookup is
/// represented by the absence of a `FactSet`, never by an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactSet(Vec<String>);

impl FactSet {
    /// Creates a set from labels in knowledge-base order.
    #[must_use]
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    /// The empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Returns true if there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the labels in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The labels as a slice.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.0
    }

    /// Exact, case-sensitive membership.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    /// Keeps at most `max` labels, preserving order.
    pub fn truncate(&mut self, max: usize) {
        self.0.truncate(max);
    }
}

impl<S: Into<String>> FromIterator<S> for FactSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for FactSet {
    fn from(labels: Vec<String>) -> Self {
        Self(labels)
    }
}

/// A structured fact lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactQuery {
    /// Entity whose values are requested.
    pub entity_id: EntityId,
    /// Property id, e.g. `P36`.
    pub property_id: String,
    /// Preferred label language directive, e.g. `[AUTO_LANGUAGE]` or `de`.
    pub language: String,
    /// Language used when no label exists in `language`.
    pub fallback_language: String,
}

impl FactQuery {
    /// Creates a query with the default label languages.
    #[must_use]
    pub fn new(entity_id: EntityId, property_id: impl Into<String>) -> Self {
        Self {
            entity_id,
            property_id: property_id.into(),
            language: "[AUTO_LANGUAGE]".to_string(),
            fallback_language: "en".to_string(),
        }
    }

    /// Overrides the label languages.
    #[must_use]
    pub fn with_languages(
        mut self,
        language: impl Into<String>,
        fallback_language: impl Into<String>,
    ) -> Self {
        self.language = language.into();
        self.fallback_language = fallback_language.into();
        self
    }
}

/// Backend contract for entity search and fact retrieval.
///
/// Implementations report transport and payload problems as errors; the
/// resolver and retriever turn those into absent results at the boundary.
pub trait KnowledgeBase: Send + Sync {
    /// Text search for entities, best match first, at most `limit` results.
    fn search_entities(&self, name: &str, limit: usize)
        -> Result<Vec<KnowledgeEntity>, TransportError>;

    /// Labels of every value stored for the queried (entity, property) pair.
    fn query_facts(&self, query: &FactQuery) -> Result<FactSet, TransportError>;
}

impl<T: KnowledgeBase + ?Sized> KnowledgeBase for Arc<T> {
    fn search_entities(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<KnowledgeEntity>, TransportError> {
        (**self).search_entities(name, limit)
    }

    fn query_facts(&self, query: &FactQuery) -> Result<FactSet, TransportError> {
        (**self).query_facts(query)
    }
}
