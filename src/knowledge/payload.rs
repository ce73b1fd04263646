//! Wikidata request construction and response decoding.
//!
//! Kept free of any HTTP dependency so the wire shapes can be tested without
//! the `http` feature.

use serde::Deserialize;

use crate::error::{TransportError, ValidationError};
use crate::knowledge::traits::{is_prefixed_number, FactQuery, FactSet, KnowledgeEntity};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: String,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<SparqlBinding>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SparqlBinding {
    object_label: SparqlTerm,
}

#[derive(Debug, Deserialize)]
struct SparqlTerm {
    value: String,
}

/// Decodes a `wbsearchentities` response body, best match first.
///
/// A body without a `search` array is malformed; an empty array means
/// nothing matched.
pub fn parse_search_response(body: &str) -> Result<Vec<KnowledgeEntity>, TransportError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| TransportError::malformed(e.to_string()))?;

    Ok(response
        .search
        .into_iter()
        .map(|hit| {
            let label = hit.label.unwrap_or_else(|| hit.id.clone());
            KnowledgeEntity::new(hit.id, label)
        })
        .collect())
}

/// Decodes a SPARQL JSON result set into the `objectLabel` values, in order.
pub fn parse_sparql_response(body: &str) -> Result<FactSet, TransportError> {
    let response: SparqlResponse =
        serde_json::from_str(body).map_err(|e| TransportError::malformed(e.to_string()))?;

    Ok(response
        .results
        .bindings
        .into_iter()
        .map(|binding| binding.object_label.value)
        .collect())
}

fn validate_language(language: &str) -> Result<(), ValidationError> {
    let ok = !language.is_empty()
        && language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '[' | ']'));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidIdentifier {
            kind: "language".to_string(),
            value: language.to_string(),
        })
    }
}

/// Builds the SPARQL text for a fact lookup.
///
/// Identifiers are interpolated into the query, so they are checked first:
/// entities must look like `Q123`, properties like `P36`.
pub fn build_fact_query(query: &FactQuery) -> Result<String, ValidationError> {
    if !query.entity_id.is_item_id() {
        return Err(ValidationError::InvalidIdentifier {
            kind: "entity".to_string(),
            value: query.entity_id.to_string(),
        });
    }
    if !is_prefixed_number(&query.property_id, 'P') {
        return Err(ValidationError::InvalidIdentifier {
            kind: "property".to_string(),
            value: query.property_id.clone(),
        });
    }
    validate_language(&query.language)?;
    validate_language(&query.fallback_language)?;

    Ok(format!(
        "SELECT ?objectLabel WHERE {{\n  \
         wd:{entity} wdt:{property} ?object.\n  \
         SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"{lang},{fallback}\". }}\n\
         }}",
        entity = query.entity_id,
        property = query.property_id,
        lang = query.language,
        fallback = query.fallback_language,
    ))
}
