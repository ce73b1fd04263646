//! Knowledge-base access: the backend seam, entity resolution and fact retrieval.

pub mod memory;
pub mod payload;
pub mod resolver;
pub mod retriever;
pub mod traits;
#[cfg(feature = "http")]
pub mod wikidata;

pub use memory::InMemoryKnowledgeBase;
pub use resolver::EntityResolver;
pub use retriever::FactRetriever;
pub use traits::{EntityId, FactQuery, FactSet, KnowledgeBase, KnowledgeEntity};
#[cfg(feature = "http")]
pub use wikidata::WikidataClient;
