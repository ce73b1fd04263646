//! Relation keywords and their knowledge-base properties.
//!
//! The registry is built once from configuration and is read-only afterwards,
//! so it can be shared freely between concurrent checks.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A relation keyword bound to a knowledge-base property identifier.
///
/// # Examples
///
/// ```
/// use factcheck::Relation;
///
/// let capital = Relation::new("capital", "P36");
/// assert_eq!(capital.property_id, "P36");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// Lemma form of the keyword, e.g. `capital`.
    pub keyword: String,
    /// Property identifier, e.g. `P36`.
    pub property_id: String,
}

impl Relation {
    /// Creates a new relation binding.
    #[must_use]
    pub fn new(keyword: impl Into<String>, property_id: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            property_id: property_id.into(),
        }
    }

    /// The relations supported out of the box (Wikidata property ids).
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("capital", "P36"),
            Self::new("population", "P1082"),
            Self::new("birthdate", "P569"),
            Self::new("deathdate", "P570"),
            Self::new("leader", "P6"),
            Self::new("country", "P17"),
        ]
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.keyword, self.property_id)
    }
}

fn normalize_keyword(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Immutable keyword → property table.
#[derive(Debug, Clone)]
pub struct RelationRegistry {
    by_keyword: HashMap<String, String>,
    // Insertion order, for stable listings.
    order: Vec<String>,
}

impl RelationRegistry {
    /// Builds a registry, rejecting empty and duplicate keywords.
    ///
    /// Keywords are compared case-insensitively, so `Capital` and `capital`
    /// count as duplicates.
    pub fn new(relations: impl IntoIterator<Item = Relation>) -> Result<Self, ValidationError> {
        let mut by_keyword = HashMap::new();
        let mut order = Vec::new();

        for relation in relations {
            let keyword = normalize_keyword(&relation.keyword);
            if keyword.is_empty() {
                return Err(ValidationError::EmptyKeyword);
            }
            if by_keyword.contains_key(&keyword) {
                return Err(ValidationError::DuplicateKeyword { keyword });
            }
            by_keyword.insert(keyword.clone(), relation.property_id.trim().to_string());
            order.push(keyword);
        }

        Ok(Self { by_keyword, order })
    }

    /// Returns the property id for `keyword`, or `None` for an unsupported relation.
    #[must_use]
    pub fn resolve(&self, keyword: &str) -> Option<&str> {
        self.by_keyword
            .get(&normalize_keyword(keyword))
            .map(String::as_str)
    }

    /// Returns true if `keyword` is a registered relation.
    #[must_use]
    pub fn contains(&self, keyword: &str) -> bool {
        self.resolve(keyword).is_some()
    }

    /// Registered keywords in registration order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of registered relations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no relation is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for RelationRegistry {
    fn default() -> Self {
        let by_keyword = Relation::defaults()
            .into_iter()
            .map(|r| (r.keyword, r.property_id))
            .collect::<HashMap<_, _>>();
        let order = Relation::defaults().into_iter().map(|r| r.keyword).collect();
        Self { by_keyword, order }
    }
}
