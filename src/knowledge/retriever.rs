//! Fact retrieval for resolved entities.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::knowledge::traits::{FactQuery, FactSet, KnowledgeBase, KnowledgeEntity};

/// Retrieves ground-truth values for an (entity, property) pair.
///
/// `None` means the lookup failed. `Some` with an empty set means the
/// property simply has no values for that entity.
#[derive(Clone)]
pub struct FactRetriever {
    kb: Arc<dyn KnowledgeBase>,
    language: String,
    fallback_language: String,
    max_facts: Option<usize>,
}

impl FactRetriever {
    /// Creates a retriever asking for `[AUTO_LANGUAGE]` labels with an `en` fallback.
    pub fn new(kb: Arc<dyn KnowledgeBase>) -> Self {
        Self {
            kb,
            language: "[AUTO_LANGUAGE]".to_string(),
            fallback_language: "en".to_string(),
            max_facts: None,
        }
    }

    /// Sets the preferred and fallback label languages.
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

    /// Caps the number of values kept per lookup. Unbounded by default.
    #[must_use]
    pub fn with_max_facts(mut self, max_facts: Option<usize>) -> Self {
        self.max_facts = max_facts;
        self
    }

    /// Returns the values of `property_id` for `entity`, or `None` if the lookup failed.
    #[must_use]
    pub fn retrieve(&self, entity: &KnowledgeEntity, property_id: &str) -> Option<FactSet> {
        let query = FactQuery::new(entity.id.clone(), property_id)
            .with_languages(self.language.clone(), self.fallback_language.clone());

        match self.kb.query_facts(&query) {
            Ok(mut facts) => {
                if let Some(max) = self.max_facts {
                    facts.truncate(max);
                }
                debug!(entity = %entity.id, property_id, values = facts.len(), "facts retrieved");
                Some(facts)
            }
            Err(err) => {
                warn!(entity = %entity.id, property_id, error = %err, "fact retrieval failed");
                None
            }
        }
    }
}

impl std::fmt::Debug for FactRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactRetriever")
            .field("language", &self.language)
            .field("fallback_language", &self.fallback_language)
            .field("max_facts", &self.max_facts)
            .finish_non_exhaustive()
    }
}
