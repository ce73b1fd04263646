//! In-memory knowledge base.
//!
//! Thread-safe reference implementation of [`KnowledgeBase`], intended for
//! embedded usage and tests. It counts every call and can be told to fail, so
//! tests can assert which external calls a verification made.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::TransportError;
use crate::knowledge::traits::{EntityId, FactQuery, FactSet, KnowledgeBase, KnowledgeEntity};

fn lock_err(context: &'static str) -> TransportError {
    TransportError::ConnectionFailed {
        message: format!("poisoned lock: {context}"),
    }
}

fn normalize_key(s: &str) -> String {
    s.trim().to_lowercase()
}

#[derive(Debug, Clone)]
struct StoredEntity {
    entity: KnowledgeEntity,
    aliases: Vec<String>,
    // Registration order, used as the final ranking tie-breaker.
    rank: usize,
}

#[derive(Debug, Default)]
struct State {
    entities: HashMap<EntityId, StoredEntity>,
    facts: HashMap<(EntityId, String), Vec<String>>,
}

/// Thread-safe in-memory [`KnowledgeBase`].
///
/// # Examples
///
/// ```
/// use factcheck::{InMemoryKnowledgeBase, KnowledgeBase};
///
/// let kb = InMemoryKnowledgeBase::new()
///     .with_entity("Q142", "France", &["French Republic"])
///     .with_facts("Q142", "P36", &["Paris"]);
///
/// let hits = kb.search_entities("france", 1).unwrap();
/// assert_eq!(hits[0].id.as_str(), "Q142");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeBase {
    state: RwLock<State>,
    search_calls: AtomicUsize,
    fact_calls: AtomicUsize,
    fail_search: AtomicBool,
    fail_facts: AtomicBool,
}

impl InMemoryKnowledgeBase {
    /// Creates an empty knowledge base.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity with optional aliases. Re-adding an id replaces it.
    #[must_use]
    pub fn with_entity(self, id: &str, label: &str, aliases: &[&str]) -> Self {
        self.insert_entity(
            KnowledgeEntity::new(id, label),
            aliases.iter().map(|a| (*a).to_string()).collect(),
        );
        self
    }

    /// Sets the values for an (entity, property) pair.
    #[must_use]
    pub fn with_facts(self, id: &str, property_id: &str, labels: &[&str]) -> Self {
        self.insert_facts(
            EntityId::new(id),
            property_id,
            labels.iter().map(|l| (*l).to_string()).collect(),
        );
        self
    }

    /// Adds or replaces an entity with its aliases.
    pub fn insert_entity(&self, entity: KnowledgeEntity, aliases: Vec<String>) {
        // A poisoned lock only happens after a panic in another test thread.
        if let Ok(mut state) = self.state.write() {
            let rank = state
                .entities
                .get(&entity.id)
                .map_or(state.entities.len(), |existing| existing.rank);
            state.entities.insert(
                entity.id.clone(),
                StoredEntity {
                    entity,
                    aliases,
                    rank,
                },
            );
        }
    }

    /// Sets the values of an (entity, property) pair.
    pub fn insert_facts(&self, entity_id: EntityId, property_id: &str, labels: Vec<String>) {
        if let Ok(mut state) = self.state.write() {
            state
                .facts
                .insert((entity_id, property_id.to_string()), labels);
        }
    }

    /// Makes every subsequent entity search fail with a transport error.
    pub fn fail_searches(&self, fail: bool) {
        self.fail_search.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent fact query fail with a transport error.
    pub fn fail_fact_queries(&self, fail: bool) {
        self.fail_facts.store(fail, Ordering::SeqCst);
    }

    /// Number of `search_entities` calls so far.
    #[must_use]
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Number of `query_facts` calls so far.
    #[must_use]
    pub fn fact_calls(&self) -> usize {
        self.fact_calls.load(Ordering::SeqCst)
    }
}

impl KnowledgeBase for InMemoryKnowledgeBase {
    fn search_entities(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<KnowledgeEntity>, TransportError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(TransportError::ConnectionFailed {
                message: "entity search unavailable".to_string(),
            });
        }

        let query_key = normalize_key(name);
        if query_key.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let state = self.state.read().map_err(|_| lock_err("search_entities"))?;

        let mut scored: Vec<(u8, usize, KnowledgeEntity)> = Vec::new();
        for stored in state.entities.values() {
            let label = normalize_key(&stored.entity.label);
            let mut score = 0u8;
            if label == query_key {
                score = 5;
            } else if label.starts_with(&query_key) {
                score = 3;
            } else if label.contains(&query_key) {
                score = 2;
            }

            for alias in &stored.aliases {
                let alias_key = normalize_key(alias);
                if alias_key == query_key {
                    score = score.max(4);
                } else if alias_key.starts_with(&query_key) {
                    score = score.max(2);
                } else if alias_key.contains(&query_key) {
                    score = score.max(1);
                }
            }

            if score > 0 {
                scored.push((score, stored.rank, stored.entity.clone()));
            }
        }

        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, _, entity)| entity)
            .collect())
    }

    fn query_facts(&self, query: &FactQuery) -> Result<FactSet, TransportError> {
        self.fact_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_facts.load(Ordering::SeqCst) {
            return Err(TransportError::ServerError {
                code: 503,
                message: "fact query unavailable".to_string(),
            });
        }

        let state = self.state.read().map_err(|_| lock_err("query_facts"))?;
        let key = (query.entity_id.clone(), query.property_id.clone());
        Ok(state
            .facts
            .get(&key)
            .map(|labels| FactSet::new(labels.clone()))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb() -> InMemoryKnowledgeBase {
        InMemoryKnowledgeBase::new()
            .with_entity("Q142", "France", &["French Republic"])
            .with_entity("Q183", "Germany", &["Deutschland"])
            .with_entity("Q1043327", "France Gall", &[])
            .with_facts("Q142", "P36", &["Paris"])
            .with_facts("Q183", "P6", &["Olaf Scholz"])
    }

    #[test]
    fn exact_label_ranks_first() {
        let hits = kb().search_entities("France", 5).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id.as_str(), "Q142");
        assert_eq!(hits[1].id.as_str(), "Q1043327");
    }

    #[test]
    fn alias_search() {
        let hits = kb().search_entities("deutschland", 1).unwrap();
        assert_eq!(hits[0].label, "Germany");
    }

    #[test]
    fn no_match_and_blank_queries() {
        let kb = kb();
        assert!(kb.search_entities("Atlantis", 3).unwrap().is_empty());
        assert!(kb.search_entities("   ", 3).unwrap().is_empty());
        assert!(kb.search_entities("France", 0).unwrap().is_empty());
        assert_eq!(kb.search_calls(), 3);
    }

    #[test]
    fn facts_present_and_absent() {
        let kb = kb();
        let paris = kb
            .query_facts(&FactQuery::new(EntityId::new("Q142"), "P36"))
            .unwrap();
        assert_eq!(paris.labels(), &["Paris".to_string()]);

        let none = kb
            .query_facts(&FactQuery::new(EntityId::new("Q142"), "P6"))
            .unwrap();
        assert!(none.is_empty());
        assert_eq!(kb.fact_calls(), 2);
    }

    #[test]
    fn injected_failures() {
        let kb = kb();
        kb.fail_searches(true);
        kb.fail_fact_queries(true);
        assert!(kb.search_entities("France", 1).is_err());
        assert!(kb
            .query_facts(&FactQuery::new(EntityId::new("Q142"), "P36"))
            .is_err());

        kb.fail_searches(false);
        assert!(kb.search_entities("France", 1).is_ok());
    }
}
