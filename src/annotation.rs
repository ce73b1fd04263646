//! Linguistic annotation seam.
//!
//! Claim extraction and answer normalization need two things from a
//! linguistic annotator: named-entity spans with a coarse label, and a
//! per-token (lemma, dependency role) sequence. Any tagger/parser can be
//! plugged in through [`Annotator`]; [`HeuristicAnnotator`] is a small
//! rule-based implementation that covers short English factoid questions.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse semantic label of an entity span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLabel {
    /// Geopolitical entity: country, city, state.
    Place,
    /// Non-political location: mountain, river, region.
    Location,
    /// A named person.
    Person,
    /// A company, institution or other organization.
    Organization,
    /// A calendar date.
    Date,
    /// A number or measured amount.
    Quantity,
    /// Anything else.
    Other,
}

impl EntityLabel {
    /// Labels that may serve as the subject of a claim.
    #[must_use]
    pub const fn is_subject_candidate(self) -> bool {
        matches!(
            self,
            Self::Place | Self::Location | Self::Person | Self::Organization
        )
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Place => "place",
            Self::Location => "location",
            Self::Person => "person",
            Self::Organization => "organization",
            Self::Date => "date",
            Self::Quantity => "quantity",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// A named-entity span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Surface text of the span.
    pub text: String,
    /// Entity type.
    pub label: EntityLabel,
}

impl EntitySpan {
    /// Creates a span.
    #[must_use]
    pub fn new(text: impl Into<String>, label: EntityLabel) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Syntactic role of a token relative to its head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyRole {
    /// Complement of a copula ("Paris" in "the capital is Paris").
    Attribute,
    /// Direct object of a verb ("have a capital").
    DirectObject,
    /// Object of a preposition ("of France").
    PrepositionalObject,
    /// Number modifying a noun.
    NumericModifier,
    /// Grammatical subject.
    Subject,
    /// No role of interest.
    Other,
}

impl DependencyRole {
    /// Roles whose token may fill the object slot of a claim.
    #[must_use]
    pub const fn is_object_role(self) -> bool {
        matches!(
            self,
            Self::Attribute | Self::DirectObject | Self::PrepositionalObject | Self::NumericModifier
        )
    }
}

/// One token with its lemma and dependency role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface text, punctuation stripped.
    pub text: String,
    /// Dictionary form used for relation lookup.
    pub lemma: String,
    /// Dependency role.
    pub role: DependencyRole,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub fn new(text: impl Into<String>, lemma: impl Into<String>, role: DependencyRole) -> Self {
        Self {
            text: text.into(),
            lemma: lemma.into(),
            role,
        }
    }
}

/// Output of an annotator run. Either list may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Named-entity spans in order of appearance.
    pub entities: Vec<EntitySpan>,
    /// Tokens in order of appearance.
    pub tokens: Vec<Token>,
}

/// External linguistic annotator.
pub trait Annotator: Send + Sync {
    /// Annotates `text`. Must not fail; unknown input yields an empty annotation.
    fn annotate(&self, text: &str) -> Annotation;
}

// ----------------------------------------------------------------------------
// Rule-based annotator
// ----------------------------------------------------------------------------

const DETERMINERS: &[&str] = &["the", "a", "an", "its", "their", "his", "her"];
const PREPOSITIONS: &[&str] = &[
    "of", "in", "from", "at", "by", "for", "with", "to", "on", "about",
];
const COPULAS: &[&str] = &["is", "are", "was", "were", "called", "named", "be"];
const POSSESSION_VERBS: &[&str] = &["have", "has", "had"];

/// Capitalized words that never start a named entity.
const CAPITALIZED_FUNCTION_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "what", "who", "whom", "where", "which", "when",
    "why", "how", "does", "do", "did", "can", "could", "it", "it's", "its", "i", "i'm", "we",
    "they", "he", "she", "yes", "yeah", "yep", "no", "nope", "nah", "not", "sure", "in", "of",
    "and", "or", "but", "this", "that", "there", "correct", "incorrect", "definitely",
    "certainly", "surely", "probably", "absolutely", "maybe", "perhaps", "actually", "well",
    "oh", "hmm", "um", "so", "just", "really", "you", "my",
];

#[derive(Debug)]
struct RawToken {
    text: String,
    // Followed by clause punctuation (",", ";", ".", "?", "!").
    breaks_after: bool,
}

fn split_tokens(text: &str) -> Vec<RawToken> {
    text.split_whitespace()
        .filter_map(|word| {
            let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
            let trimmed = trimmed.trim_matches('\'');
            if trimmed.is_empty() {
                return None;
            }
            let breaks_after = word
                .chars()
                .last()
                .is_some_and(|c| matches!(c, ',' | ';' | ':' | '.' | '?' | '!'));
            Some(RawToken {
                text: trimmed.to_string(),
                breaks_after,
            })
        })
        .collect()
}

fn lemma_of(word: &str) -> String {
    let lower = word.to_lowercase();
    let is_lowercase_word = word.chars().next().is_some_and(char::is_lowercase);
    if !is_lowercase_word || lower.chars().count() <= 4 {
        return lower;
    }
    if let Some(stem) = lower.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") && !lower.ends_with("is")
    {
        return lower[..lower.len() - 1].to_string();
    }
    lower
}

fn is_numeric(word: &str) -> bool {
    word.chars().next().is_some_and(|c| c.is_ascii_digit())
        && word.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

/// Rule-based annotator for short English questions, statements and answers.
///
/// - Entities are maximal runs of capitalized words (function words such as
///   "The" or "Is" excluded, runs broken by punctuation) plus numbers.
///   Spans found in the gazetteer get its label; other capitalized spans get
///   the default label, `Place` unless overridden.
/// - Roles: the first non-determiner word after a preposition is a
///   prepositional object, after a non-initial copula an attribute, after
///   "have"/"has" a direct object; numbers are numeric modifiers.
#[derive(Debug, Clone)]
pub struct HeuristicAnnotator {
    gazetteer: HashMap<String, EntityLabel>,
    default_label: EntityLabel,
}

impl Default for HeuristicAnnotator {
    fn default() -> Self {
        Self {
            gazetteer: HashMap::new(),
            default_label: EntityLabel::Place,
        }
    }
}

impl HeuristicAnnotator {
    /// Creates an annotator with an empty gazetteer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels a known span, e.g. `("Olaf Scholz", Person)`.
    #[must_use]
    pub fn with_label(mut self, span: &str, label: EntityLabel) -> Self {
        self.gazetteer.insert(span.trim().to_lowercase(), label);
        self
    }

    /// Label used for capitalized spans missing from the gazetteer.
    #[must_use]
    pub fn with_default_label(mut self, label: EntityLabel) -> Self {
        self.default_label = label;
        self
    }

    fn label_for(&self, span: &str) -> EntityLabel {
        self.gazetteer
            .get(&span.to_lowercase())
            .copied()
            .unwrap_or(self.default_label)
    }

    fn flush(&self, current: &mut Vec<&str>, spans: &mut Vec<EntitySpan>) {
        if !current.is_empty() {
            let text = current.join(" ");
            let label = self.label_for(&text);
            spans.push(EntitySpan::new(text, label));
            current.clear();
        }
    }

    fn entities(&self, raw: &[RawToken]) -> Vec<EntitySpan> {
        let mut spans = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for token in raw {
            let lower = token.text.to_lowercase();
            if is_numeric(&token.text) {
                self.flush(&mut current, &mut spans);
                spans.push(EntitySpan::new(token.text.clone(), EntityLabel::Quantity));
                continue;
            }
            let starts_entity = is_capitalized(&token.text)
                && !CAPITALIZED_FUNCTION_WORDS.contains(&lower.as_str());
            if starts_entity {
                current.push(token.text.as_str());
                if token.breaks_after {
                    self.flush(&mut current, &mut spans);
                }
            } else {
                self.flush(&mut current, &mut spans);
            }
        }
        self.flush(&mut current, &mut spans);
        spans
    }

    fn tokens(raw: &[RawToken]) -> Vec<Token> {
        let lowers: Vec<String> = raw.iter().map(|t| t.text.to_lowercase()).collect();
        let mut roles = vec![DependencyRole::Other; raw.len()];

        // The word a trigger governs: next token, skipping determiners.
        let governed = |trigger: usize| {
            (trigger + 1..raw.len()).find(|&j| !DETERMINERS.contains(&lowers[j].as_str()))
        };

        for (i, lower) in lowers.iter().enumerate() {
            let role = if PREPOSITIONS.contains(&lower.as_str()) {
                Some(DependencyRole::PrepositionalObject)
            } else if i > 0 && COPULAS.contains(&lower.as_str()) {
                Some(DependencyRole::Attribute)
            } else if POSSESSION_VERBS.contains(&lower.as_str()) {
                Some(DependencyRole::DirectObject)
            } else {
                None
            };

            if let (Some(role), Some(j)) = (role, governed(i)) {
                if roles[j] == DependencyRole::Other {
                    roles[j] = role;
                }
            }
        }

        for (i, token) in raw.iter().enumerate() {
            if is_numeric(&token.text) {
                roles[i] = DependencyRole::NumericModifier;
            }
        }

        raw.iter()
            .zip(roles)
            .map(|(t, role)| Token::new(t.text.clone(), lemma_of(&t.text), role))
            .collect()
    }
}

impl Annotator for HeuristicAnnotator {
    fn annotate(&self, text: &str) -> Annotation {
        let raw = split_tokens(text);
        Annotation {
            entities: self.entities(&raw),
            tokens: Self::tokens(&raw),
        }
    }
}
