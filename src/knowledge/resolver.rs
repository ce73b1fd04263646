//! Subject resolution: free-text names to knowledge-base entities.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::knowledge::traits::{KnowledgeBase, KnowledgeEntity};

/// Resolves free-text names to knowledge-base entities.
///
/// Every call issues exactly one search (none for a blank name). Results are
/// not memoized, so callers on a hot path should avoid resolving the same
/// name twice.
#[derive(Clone)]
pub struct EntityResolver {
    kb: Arc<dyn KnowledgeBase>,
}

impl EntityResolver {
    /// Creates a resolver over `kb`.
    pub fn new(kb: Arc<dyn KnowledgeBase>) -> Self {
        Self { kb }
    }

    /// Returns the first-ranked search hit, or `None` when nothing matches or
    /// the search fails.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<KnowledgeEntity> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        match self.kb.search_entities(name, 1) {
            Ok(hits) => {
                let entity = hits.into_iter().next();
                debug!(name, resolved = ?entity.as_ref().map(|e| e.id.as_str()), "entity resolution");
                entity
            }
            Err(err) => {
                warn!(name, error = %err, "entity search failed");
                None
            }
        }
    }
}

impl std::fmt::Debug for EntityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityResolver").finish_non_exhaustive()
    }
}
