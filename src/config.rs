//! Configuration.
//!
//! Everything the checker treats as read-only (relation table, variant word
//! lists, match policy, label languages) lives in one explicitly constructed
//! [`FactCheckConfig`] that is handed to each component at construction time.
//! Configurations can be written by hand, built with the `with_*` methods or
//! loaded from JSON.

use serde::{Deserialize, Serialize};

use crate::error::{FactCheckResult, ValidationError};
use crate::relation::{Relation, RelationRegistry};
use crate::verdict::MatchPolicy;

/// Words that mark an answer as affirmative or negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerVariants {
    /// Words that mark a yes answer.
    pub affirmative: Vec<String>,
    /// Words that mark a no answer.
    pub negative: Vec<String>,
}

impl Default for AnswerVariants {
    fn default() -> Self {
        let owned = |words: &[&str]| words.iter().map(|w| (*w).to_string()).collect();
        Self {
            affirmative: owned(&["yes", "yeah", "yep", "sure", "correct", "affirmative"]),
            negative: owned(&["no", "nope", "nah", "incorrect", "negative"]),
        }
    }
}

/// Top-level checker configuration.
///
/// # Examples
///
/// ```
/// use factcheck::{FactCheckConfig, MatchPolicy};
///
/// let config = FactCheckConfig::default()
///     .with_match_policy(MatchPolicy::fuzzy(0.9))
///     .with_negation_aware(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactCheckConfig {
    /// Relation keyword table.
    pub relations: Vec<Relation>,
    /// Yes/no word lists.
    pub variants: AnswerVariants,
    /// How entity answers are compared with facts.
    pub match_policy: MatchPolicy,
    /// Preferred label language directive for fact values.
    pub language: String,
    /// Label language used when the preferred one has no label.
    pub fallback_language: String,
    /// Cap on the number of values kept per fact lookup.
    pub max_facts: Option<usize>,
    /// Treat "not X" in answers as a rejection of X.
    pub negation_aware: bool,
    /// Require entity answers to exist in the knowledge base before comparing.
    pub validate_answer_entities: bool,
}

impl Default for FactCheckConfig {
    fn default() -> Self {
        Self {
            relations: Relation::defaults(),
            variants: AnswerVariants::default(),
            match_policy: MatchPolicy::default(),
            language: "[AUTO_LANGUAGE]".to_string(),
            fallback_language: "en".to_string(),
            max_facts: None,
            negation_aware: false,
            validate_answer_entities: false,
        }
    }
}

impl FactCheckConfig {
    /// Parses a JSON configuration; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> FactCheckResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces the relation table.
    #[must_use]
    pub fn with_relations(mut self, relations: Vec<Relation>) -> Self {
        self.relations = relations;
        self
    }

    /// Replaces the yes/no word lists.
    #[must_use]
    pub fn with_variants(mut self, variants: AnswerVariants) -> Self {
        self.variants = variants;
        self
    }

    /// Replaces the match policy.
    #[must_use]
    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
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

    /// Caps the number of values kept per lookup.
    #[must_use]
    pub fn with_max_facts(mut self, max_facts: usize) -> Self {
        self.max_facts = Some(max_facts);
        self
    }

    /// Enables "not X" clarification handling.
    #[must_use]
    pub fn with_negation_aware(mut self, enabled: bool) -> Self {
        self.negation_aware = enabled;
        self
    }

    /// Requires entity answers to resolve in the knowledge base.
    #[must_use]
    pub fn with_answer_entity_validation(mut self, enabled: bool) -> Self {
        self.validate_answer_entities = enabled;
        self
    }

    /// Checks the configuration without building anything from it.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.match_policy.validate()?;
        self.relation_registry()?;
        if self.variants.affirmative.iter().all(|v| v.trim().is_empty()) {
            return Err(ValidationError::EmptyVariantList {
                list: "affirmative".to_string(),
            });
        }
        if self.variants.negative.iter().all(|v| v.trim().is_empty()) {
            return Err(ValidationError::EmptyVariantList {
                list: "negative".to_string(),
            });
        }
        if self.max_facts == Some(0) {
            return Err(ValidationError::ZeroLimit {
                field: "max_facts".to_string(),
            });
        }
        if self.language.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "language".to_string(),
            });
        }
        if self.fallback_language.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "fallback_language".to_string(),
            });
        }
        Ok(())
    }

    /// Builds the relation registry described by this configuration.
    pub fn relation_registry(&self) -> Result<RelationRegistry, ValidationError> {
        RelationRegistry::new(self.relations.iter().cloned())
    }
}

/// Endpoints and HTTP settings for the Wikidata client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikidataConfig {
    /// MediaWiki action API, used for entity search.
    pub api_url: String,
    /// SPARQL query endpoint.
    pub sparql_url: String,
    /// Wikimedia asks API clients to identify themselves.
    pub user_agent: String,
    /// Language used for entity search.
    pub search_language: String,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout_ms: Option<u64>,
}

impl Default for WikidataConfig {
    fn default() -> Self {
        Self {
            api_url: "https://www.wikidata.org/w/api.php".to_string(),
            sparql_url: "https://query.wikidata.org/sparql".to_string(),
            user_agent: concat!("factcheck/", env!("CARGO_PKG_VERSION")).to_string(),
            search_language: "en".to_string(),
            timeout_ms: None,
        }
    }
}

/// Settings for the HTTP text-completion client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// llama.cpp-style completion endpoint.
    pub endpoint: String,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout_ms: Option<u64>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/completion".to_string(),
            timeout_ms: Some(60_000),
        }
    }
}
