//! `label value` pair extraction from reconstructed nutrition panel lines.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

lazy_static! {
    static ref PAIR_LINE: Regex = Regex::new(
        r"^(?P<label>.+?)(?:\s*:\s*|\s+-?\s*)(?P<value>\d+\.?\d*)$"
    )
    .expect("Pair line pattern should be valid");
}

/// A nutrient label and the number printed next to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pair {
    /// Label text exactly as read, trimmed
    pub label: String,
    /// Measured value
    pub value: f64,
}

/// Parse a single panel line into a pair.
///
/// The number is separated from the label by a colon or by whitespace,
/// optionally followed by a dash. A dash glued to the label is part of it.
///
/// Lines that do not end in a bare number yield `None`, as do lines whose
/// number does not parse to a finite value.
pub fn parse_pair_line(line: &str) -> Option<Pair> {
    let line = line.trim();
    let captures = PAIR_LINE.captures(line)?;
    let label = captures.name("label")?.as_str().trim();
    let raw_value = captures.name("value")?.as_str();

    match raw_value.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(Pair {
            label: label.to_string(),
            value,
        }),
        _ => {
            warn!(line = %line, value = %raw_value, "Dropping line with malformed numeric value");
            None
        }
    }
}

/// Extract every pair from line-structured panel text.
///
/// A label seen twice keeps its first position and takes the later value.
///
/// ```rust
/// use label_verdict::text_processing::extract_pairs;
///
/// let pairs = extract_pairs("Energy 250\nProtein: 5.2\nper 100g");
/// assert_eq!(pairs.len(), 2);
/// assert_eq!(pairs[0].label, "Energy");
/// assert_eq!(pairs[1].value, 5.2);
/// ```
pub fn extract_pairs(text: &str) -> Vec<Pair> {
    let mut pairs: Vec<Pair> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for line in text.lines() {
        let Some(pair) = parse_pair_line(line) else {
            trace!(line = %line, "Line carries no label/value pair");
            continue;
        };
        match positions.get(&pair.label) {
            Some(&index) => {
                debug!(label = %pair.label, "Repeated label, keeping later value");
                pairs[index].value = pair.value;
            }
            None => {
                positions.insert(pair.label.clone(), pairs.len());
                pairs.push(pair);
            }
        }
    }

    pairs
}
