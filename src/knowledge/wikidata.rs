//! Blocking Wikidata client (feature `http`).
//!
//! Entity search goes through the `wbsearchentities` API action and facts
//! through the public SPARQL endpoint. Every call is a single request: no
//! retries, no caching.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::debug;

use crate::config::WikidataConfig;
use crate::error::{FactCheckError, TransportError};
use crate::knowledge::payload::{build_fact_query, parse_search_response, parse_sparql_response};
use crate::knowledge::traits::{FactQuery, FactSet, KnowledgeBase, KnowledgeEntity};

/// [`KnowledgeBase`] backed by the Wikidata web services.
#[derive(Debug, Clone)]
pub struct WikidataClient {
    client: Client,
    config: WikidataConfig,
}

impl WikidataClient {
    /// Builds a client with the configured user agent and timeout.
    pub fn new(config: WikidataConfig) -> Result<Self, FactCheckError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder
            .build()
            .map_err(|e| FactCheckError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Client configuration.
    #[must_use]
    pub fn config(&self) -> &WikidataConfig {
        &self.config
    }

    fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .query(params)
            .send()
            .map_err(|e| self.map_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::ServerError {
                code: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        response.text().map_err(|e| self.map_reqwest_error(&e))
    }

    fn map_reqwest_error(&self, err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                duration_ms: self.config.timeout_ms.unwrap_or_default(),
            }
        } else if err.is_decode() {
            TransportError::malformed(err.to_string())
        } else {
            TransportError::ConnectionFailed {
                message: err.to_string(),
            }
        }
    }
}

impl KnowledgeBase for WikidataClient {
    fn search_entities(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<KnowledgeEntity>, TransportError> {
        let limit = limit.to_string();
        let body = self.get(
            &self.config.api_url,
            &[
                ("action", "wbsearchentities"),
                ("search", name),
                ("language", &self.config.search_language),
                ("limit", &limit),
                ("format", "json"),
            ],
        )?;
        let hits = parse_search_response(&body)?;
        debug!(name, hits = hits.len(), "wikidata entity search");
        Ok(hits)
    }

    fn query_facts(&self, query: &FactQuery) -> Result<FactSet, TransportError> {
        let sparql = build_fact_query(query).map_err(|e| TransportError::malformed(e.to_string()))?;
        let body = self.get(
            &self.config.sparql_url,
            &[("query", sparql.as_str()), ("format", "json")],
        )?;
        let facts = parse_sparql_response(&body)?;
        debug!(
            entity = %query.entity_id,
            property = %query.property_id,
            values = facts.len(),
            "wikidata fact query"
        );
        Ok(facts)
    }
}
