//! # String Similarity Module
//!
//! Similarity scoring used to resolve noisy OCR tokens to vocabulary keys.
//!
//! The scorer is pluggable through [`SimilarityScorer`], but the algorithm and
//! the cutoff together decide which marginal tokens match, so both are fixed
//! per deployment:
//!
//! - [`SequenceRatio`] (default): Ratcliff/Obershelp gestalt ratio
//!   `2·M / (|a| + |b|)`, where `M` counts the characters in the longest common
//!   block found recursively on both sides of each earlier block.
//! - [`NormalizedLevenshtein`]: `1 - distance / max(|a|, |b|)`.
//!
//! Both compare Unicode scalar values and return a score in `[0.0, 1.0]`;
//! two empty strings score `1.0`.

use std::fmt;
use std::str::FromStr;

/// A string similarity measure in `[0.0, 1.0]`
pub trait SimilarityScorer: Send + Sync {
    /// Short identifier used in logs and configuration
    fn name(&self) -> &'static str;

    /// Similarity of `a` to `b`
    ///
    /// Not necessarily symmetric. Vocabulary lookups pass the key as `a`
    /// and the query as `b`.
    fn ratio(&self, a: &str, b: &str) -> f64;
}

/// Ratcliff/Obershelp gestalt pattern matching ratio
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

impl SimilarityScorer for SequenceRatio {
    fn name(&self) -> &'static str {
        "sequence"
    }

    fn ratio(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let total = a.len() + b.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * matching_characters(&a, &b) as f64 / total as f64
    }
}

/// Count characters covered by recursively found longest common blocks.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_common_block(a, b, a_lo, a_hi, b_lo, b_hi);
        if size == 0 {
            continue;
        }
        matched += size;
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }

    matched
}

/// Longest block `a[i..i+size] == b[j..j+size]` inside the given windows.
///
/// Ties go to the smallest `i`, then the smallest `j`.
fn longest_common_block(
    a: &[char],
    b: &[char],
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let mut best = (a_lo, b_lo, 0);
    let width = b_hi - b_lo + 1;
    let mut previous = vec![0usize; width];
    let mut current = vec![0usize; width];

    for i in a_lo..a_hi {
        for j in b_lo..b_hi {
            let column = j - b_lo + 1;
            if a[i] == b[j] {
                let size = previous[column - 1] + 1;
                current[column] = size;
                if size > best.2 {
                    best = (i + 1 - size, j + 1 - size, size);
                }
            } else {
                current[column] = 0;
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    best
}

/// Edit-distance similarity normalized by the longer string
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLevenshtein;

impl NormalizedLevenshtein {
    /// Calculate Levenshtein distance between two strings
    pub fn distance(s1: &str, s2: &str) -> usize {
        let s1_chars: Vec<char> = s1.chars().collect();
        let s2_chars: Vec<char> = s2.chars().collect();

        let len1 = s1_chars.len();
        let len2 = s2_chars.len();

        let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

        #[allow(clippy::needless_range_loop)]
        for i in 0..=len1 {
            matrix[i][0] = i;
        }
        for j in 0..=len2 {
            matrix[0][j] = j;
        }

        for i in 1..=len1 {
            for j in 1..=len2 {
                let cost = if s1_chars[i - 1] == s2_chars[j - 1] {
                    0
                } else {
                    1
                };

                matrix[i][j] = (matrix[i - 1][j] + 1)
                    .min(matrix[i][j - 1] + 1)
                    .min(matrix[i - 1][j - 1] + cost);
            }
        }

        matrix[len1][len2]
    }
}

impl SimilarityScorer for NormalizedLevenshtein {
    fn name(&self) -> &'static str {
        "levenshtein"
    }

    fn ratio(&self, a: &str, b: &str) -> f64 {
        let longest = a.chars().count().max(b.chars().count());
        if longest == 0 {
            return 1.0;
        }
        1.0 - Self::distance(a, b) as f64 / longest as f64
    }
}

/// Configurable choice of similarity algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimilarityAlgorithm {
    #[default]
    Sequence,
    Levenshtein,
}

impl SimilarityAlgorithm {
    /// Instantiate the scorer for this algorithm
    pub fn scorer(&self) -> Box<dyn SimilarityScorer> {
        match self {
            SimilarityAlgorithm::Sequence => Box::new(SequenceRatio),
            SimilarityAlgorithm::Levenshtein => Box::new(NormalizedLevenshtein),
        }
    }
}

impl FromStr for SimilarityAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequence" | "ratcliff" => Ok(SimilarityAlgorithm::Sequence),
            "levenshtein" => Ok(SimilarityAlgorithm::Levenshtein),
            other => Err(format!("unknown similarity algorithm '{}'", other)),
        }
    }
}

impl fmt::Display for SimilarityAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimilarityAlgorithm::Sequence => write!(f, "sequence"),
            SimilarityAlgorithm::Levenshtein => write!(f, "levenshtein"),
        }
    }
}

/// Best-scoring candidate at or above `cutoff`.
///
/// Each candidate is scored as `ratio(candidate, query)`. Ties are broken
/// towards the lexicographically greatest candidate so the outcome does not
/// depend on iteration order.
pub fn closest_match<'c, I>(
    scorer: &dyn SimilarityScorer,
    query: &str,
    candidates: I,
    cutoff: f64,
) -> Option<(&'c str, f64)>
where
    I: IntoIterator<Item = &'c str>,
{
    let mut best: Option<(&'c str, f64)> = None;
    for candidate in candidates {
        let score = scorer.ratio(candidate, query);
        if score < cutoff {
            continue;
        }
        best = match best {
            Some((best_key, best_score))
                if best_score > score || (best_score == score && best_key >= candidate) =>
            {
                Some((best_key, best_score))
            }
            _ => Some((candidate, score)),
        };
    }
    best
}
