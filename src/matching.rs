//! # Vocabulary Matching Module
//!
//! Resolves a raw OCR token to a canonical vocabulary entry.
//!
//! Resolution order for a normalized query:
//!
//! 1. exact key lookup;
//! 2. substring containment in either direction, first entry in table order
//!    (only when the policy enables it);
//! 3. best similarity score at or above the cutoff.
//!
//! A query that normalizes to nothing never matches.

use serde::Serialize;
use tracing::{debug, trace};

use crate::observability;
use crate::similarity::{closest_match, SimilarityScorer};
use crate::vocabulary::{normalize_key, Vocabulary, VocabularyEntry};

/// Similarity threshold used unless configured otherwise
pub const DEFAULT_CUTOFF: f64 = 0.75;

/// How a query was resolved
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum MatchMethod {
    Exact,
    Substring,
    Fuzzy { score: f64 },
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Exact => "exact",
            MatchMethod::Substring => "substring",
            MatchMethod::Fuzzy { .. } => "fuzzy",
        }
    }
}

/// Per-vocabulary resolution rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    /// Minimum similarity accepted by the fuzzy step
    pub cutoff: f64,
    /// Whether containment counts as a match before the fuzzy step
    pub substring_fallback: bool,
}

impl MatchPolicy {
    /// Ingredients resolve by exact key or similarity only
    pub fn ingredients(cutoff: f64) -> Self {
        Self {
            cutoff,
            substring_fallback: false,
        }
    }

    /// Nutrient labels also resolve by containment ("Sodium" in "sodiummg")
    pub fn nutrients(cutoff: f64) -> Self {
        Self {
            cutoff,
            substring_fallback: true,
        }
    }
}

/// Outcome of resolving one query
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult<'v, R> {
    /// The query as given
    pub query: String,
    /// Normalized form of the query
    pub normalized: String,
    /// Resolved entry and how it was found
    pub resolved: Option<(&'v VocabularyEntry<R>, MatchMethod)>,
}

impl<'v, R> MatchResult<'v, R> {
    pub fn entry(&self) -> Option<&'v VocabularyEntry<R>> {
        self.resolved.map(|(entry, _)| entry)
    }

    pub fn canonical_key(&self) -> Option<&'v str> {
        self.entry().map(|entry| entry.key.as_str())
    }

    pub fn method(&self) -> Option<MatchMethod> {
        self.resolved.map(|(_, method)| method)
    }

    pub fn is_match(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Resolves queries against a vocabulary with a fixed scorer and policy
pub struct VocabularyMatcher<'s> {
    scorer: &'s dyn SimilarityScorer,
    policy: MatchPolicy,
}

impl<'s> VocabularyMatcher<'s> {
    pub fn new(scorer: &'s dyn SimilarityScorer, policy: MatchPolicy) -> Self {
        Self { scorer, policy }
    }

    /// Resolve `query` against `vocabulary`.
    ///
    /// ```rust
    /// use label_verdict::matching::{MatchMethod, MatchPolicy, VocabularyMatcher};
    /// use label_verdict::similarity::SequenceRatio;
    /// use label_verdict::vocabulary::NutrientVocabulary;
    ///
    /// let vocabulary = NutrientVocabulary::builtin().unwrap();
    /// let matcher = VocabularyMatcher::new(&SequenceRatio, MatchPolicy::nutrients(0.75));
    ///
    /// let result = matcher.match_query("Sodium", &vocabulary);
    /// assert_eq!(result.canonical_key(), Some("sodiummg"));
    /// assert_eq!(result.method(), Some(MatchMethod::Substring));
    /// ```
    pub fn match_query<'v, R>(
        &self,
        query: &str,
        vocabulary: &'v Vocabulary<R>,
    ) -> MatchResult<'v, R> {
        let normalized = normalize_key(query);
        let resolved = self.resolve(&normalized, vocabulary);

        let method = resolved.map(|(_, m)| m.as_str()).unwrap_or("none");
        observability::record_vocabulary_lookup(vocabulary.kind().as_str(), method);
        match resolved {
            Some((entry, m)) => debug!(
                vocabulary = %vocabulary.kind(),
                query = %query,
                key = %entry.key,
                method = ?m,
                scorer = self.scorer.name(),
                "Query resolved"
            ),
            None => trace!(vocabulary = %vocabulary.kind(), query = %query, "Query unresolved"),
        }

        MatchResult {
            query: query.to_string(),
            normalized,
            resolved,
        }
    }

    fn resolve<'v, R>(
        &self,
        normalized: &str,
        vocabulary: &'v Vocabulary<R>,
    ) -> Option<(&'v VocabularyEntry<R>, MatchMethod)> {
        if normalized.is_empty() {
            return None;
        }

        if let Some(entry) = vocabulary.get(normalized) {
            return Some((entry, MatchMethod::Exact));
        }

        if self.policy.substring_fallback {
            if let Some(entry) = vocabulary
                .entries()
                .find(|e| e.key.contains(normalized) || normalized.contains(e.key.as_str()))
            {
                return Some((entry, MatchMethod::Substring));
            }
        }

        let (key, score) = closest_match(
            self.scorer,
            normalized,
            vocabulary.keys(),
            self.policy.cutoff,
        )?;
        let entry = vocabulary.get(key)?;
        Some((entry, MatchMethod::Fuzzy { score }))
    }
}
