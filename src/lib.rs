//! # factcheck - Knowledge-Base Claim Verification
//!
//! factcheck checks whether an answer to a factual question, or a factual
//! statement on its own, agrees with a structured knowledge base such as
//! Wikidata.
//!
//! ## Core Concepts
//!
//! - **Relation**: A relation keyword ("capital") mapped to a knowledge-base property (`P36`)
//! - **Claim**: The (subject, relation, object) triple extracted from text
//! - **CanonicalAnswer**: A free-text answer reduced to yes, no or an entity name
//! - **Verdict**: `Match`, `NoMatch` or `Unverifiable` with a reason
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use factcheck::{FactCheckConfig, FactChecker, HeuristicAnnotator, InMemoryKnowledgeBase, Verdict};
//!
//! let kb = InMemoryKnowledgeBase::new()
//!     .with_entity("Q142", "France", &[])
//!     .with_facts("Q142", "P36", &["Paris"]);
//!
//! let checker = FactChecker::new(
//!     FactCheckConfig::default(),
//!     Arc::new(HeuristicAnnotator::new()),
//!     Arc::new(kb),
//! )?;
//!
//! let report = checker.check_answer("What is the capital of France?", "It is called Paris");
//! assert_eq!(report.verdict, Verdict::Match);
//!
//! let report = checker.check_statement("The capital of France is Berlin");
//! assert_eq!(report.verdict, Verdict::NoMatch);
//! # Ok::<(), factcheck::FactCheckError>(())
//! ```
//!
//! The live Wikidata client and the HTTP completion client sit behind the
//! `http` feature.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Text analysis
pub mod annotation;
pub mod answer;
pub mod claim;
pub mod similarity;

// Knowledge base access
pub mod knowledge;
pub mod relation;

// Verification and pipeline
pub mod checker;
pub mod completion;
pub mod config;
pub mod error;
pub mod verdict;

pub use annotation::{
    Annotation, Annotator, DependencyRole, EntityLabel, EntitySpan, HeuristicAnnotator, Token,
};
pub use answer::{AnswerNormalizer, CanonicalAnswer, ClarifiedAnswer};
pub use checker::{CheckId, CheckReport, FactChecker};
pub use claim::{Claim, ClaimExtractor};
pub use completion::{CompletionRequest, ScriptedCompletion, TextCompletion};
pub use config::{AnswerVariants, CompletionConfig, FactCheckConfig, WikidataConfig};
pub use error::{FactCheckError, FactCheckResult, TransportError, ValidationError};
pub use knowledge::{
    EntityId, EntityResolver, FactQuery, FactRetriever, FactSet, InMemoryKnowledgeBase,
    KnowledgeBase, KnowledgeEntity,
};
pub use relation::{Relation, RelationRegistry};
pub use verdict::{judge, judge_clarified, MatchPolicy, UnverifiableReason, Verdict, VerdictEngine};

#[cfg(feature = "http")]
pub use completion::HttpCompletionClient;
#[cfg(feature = "http")]
pub use knowledge::WikidataClient;
