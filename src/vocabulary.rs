//! # Vocabulary Module
//!
//! Canonical ingredient and nutrient tables, keyed by normalized name.
//!
//! ## Sources
//!
//! - Ingredients: CSV with a header row. The first column holds the canonical
//!   name; `severity`, `category`, `note` and `score` columns are recognised by
//!   header (case-insensitive) and every other column is kept verbatim.
//!   Missing cells read as empty strings.
//! - Nutrients: JSON `{"nutrients": [{"name", "limit", "flag", "note"}]}`.
//!   The default table ships inside the binary.
//!
//! A table is loaded once, validated, and then only read. Any problem with the
//! source is an [`AppError::Vocabulary`]: analysis never runs on a partial
//! table.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::errors::{error_logging, AppError, AppResult};

const BUILTIN_NUTRIENT_THRESHOLDS: &str = include_str!("../config/nutrient_thresholds.json");

/// Reduce a name to its lookup key: lowercase ASCII letters and digits only.
///
/// ```rust
/// use label_verdict::vocabulary::normalize_key;
///
/// assert_eq!(normalize_key("Saturated fat, g"), "saturatedfatg");
/// assert_eq!(normalize_key("  Vitamin B-12 "), "vitaminb12");
/// ```
pub fn normalize_key(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Which table a vocabulary holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabularyKind {
    Ingredients,
    Nutrients,
}

impl VocabularyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VocabularyKind::Ingredients => "ingredients",
            VocabularyKind::Nutrients => "nutrients",
        }
    }
}

impl fmt::Display for VocabularyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity class of an ingredient rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    /// "bad", "harmful", "high"
    Bad,
    /// "moderate", "medium", "caution"
    Moderate,
    /// "good", "safe", "low"
    Good,
    /// Anything else, kept as written
    Unrecognized(String),
}

impl Severity {
    /// Classify a severity label, ignoring case and surrounding whitespace
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "bad" | "harmful" | "high" => Severity::Bad,
            "moderate" | "medium" | "caution" => Severity::Moderate,
            "good" | "safe" | "low" => Severity::Good,
            _ => Severity::Unrecognized(label.trim().to_string()),
        }
    }
}

/// Threshold category of a nutrient rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NutrientFlag {
    High,
    Low,
    Caution,
    Harmful,
    Ok,
    /// A flag the engine has no comparison for; always evaluates to OK
    Unrecognized(String),
}

impl NutrientFlag {
    pub fn parse(flag: &str) -> Self {
        match flag.trim().to_lowercase().as_str() {
            "high" => NutrientFlag::High,
            "low" => NutrientFlag::Low,
            "caution" => NutrientFlag::Caution,
            "harmful" => NutrientFlag::Harmful,
            "ok" => NutrientFlag::Ok,
            _ => NutrientFlag::Unrecognized(flag.trim().to_string()),
        }
    }
}

impl fmt::Display for NutrientFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NutrientFlag::High => f.write_str("high"),
            NutrientFlag::Low => f.write_str("low"),
            NutrientFlag::Caution => f.write_str("caution"),
            NutrientFlag::Harmful => f.write_str("harmful"),
            NutrientFlag::Ok => f.write_str("ok"),
            NutrientFlag::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

/// Ingredient row from the dataset
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientRule {
    /// Severity label as written in the dataset
    pub severity_label: String,
    pub severity: Severity,
    pub category: String,
    pub note: String,
    pub score: Option<f64>,
    /// Remaining columns in header order
    pub extra: Vec<(String, String)>,
}

/// Nutrient threshold rule
#[derive(Debug, Clone, PartialEq)]
pub struct NutrientRule {
    pub limit: f64,
    pub flag: NutrientFlag,
    pub note: String,
}

/// One canonical entry: display name, lookup key and rule
#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyEntry<R> {
    /// Canonical name as written in the source table
    pub name: String,
    /// Normalized lookup key
    pub key: String,
    pub rule: R,
}

/// Immutable table of canonical entries in source order, indexed by key
#[derive(Debug, Clone)]
pub struct Vocabulary<R> {
    kind: VocabularyKind,
    entries: Vec<VocabularyEntry<R>>,
    index: HashMap<String, usize>,
}

pub type IngredientVocabulary = Vocabulary<IngredientRule>;
pub type NutrientVocabulary = Vocabulary<NutrientRule>;

impl<R> Vocabulary<R> {
    /// Build a table from `(name, rule)` rows.
    ///
    /// A row whose key repeats an earlier one replaces that entry in place.
    pub fn from_rows<I>(kind: VocabularyKind, rows: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (String, R)>,
    {
        let mut entries: Vec<VocabularyEntry<R>> = Vec::new();
        let mut index = HashMap::new();

        for (position, (name, rule)) in rows.into_iter().enumerate() {
            let name = name.trim().to_string();
            let key = normalize_key(&name);
            if key.is_empty() {
                return Err(AppError::Vocabulary(format!(
                    "{} row {}: name '{}' has no letters or digits",
                    kind,
                    position + 1,
                    name
                )));
            }
            match index.get(&key) {
                Some(&existing) => {
                    debug!(vocabulary = %kind, key = %key, "Duplicate key, later row replaces earlier");
                    entries[existing] = VocabularyEntry { name, key, rule };
                }
                None => {
                    index.insert(key.clone(), entries.len());
                    entries.push(VocabularyEntry { name, key, rule });
                }
            }
        }

        if entries.is_empty() {
            return Err(AppError::Vocabulary(format!("{} table is empty", kind)));
        }

        Ok(Self {
            kind,
            entries,
            index,
        })
    }

    pub fn kind(&self) -> VocabularyKind {
        self.kind
    }

    /// Exact lookup by normalized key
    pub fn get(&self, key: &str) -> Option<&VocabularyEntry<R>> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    /// Entries in source order
    pub fn entries(&self) -> impl Iterator<Item = &VocabularyEntry<R>> {
        self.entries.iter()
    }

    /// Keys in source order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IngredientVocabulary {
    /// Parse an ingredient dataset from CSV
    pub fn from_csv_reader<T: Read>(reader: T) -> AppResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();
        if headers.is_empty() || headers[0].is_empty() {
            return Err(AppError::Vocabulary(
                "ingredient dataset has no header row".to_string(),
            ));
        }

        let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let severity_col = column("severity");
        let category_col = column("category");
        let note_col = column("note");
        let score_col = column("score");
        let known = [Some(0), severity_col, category_col, note_col, score_col];

        let mut rows = Vec::new();
        for (line, record) in csv_reader.records().enumerate() {
            let record = record?;
            let cell = |col: Option<usize>| {
                col.and_then(|c| record.get(c)).unwrap_or("").to_string()
            };

            let score_raw = cell(score_col);
            let score = if score_raw.is_empty() {
                None
            } else {
                let parsed = score_raw.parse::<f64>().map_err(|_| {
                    AppError::Vocabulary(format!(
                        "ingredient row {}: score '{}' is not a number",
                        line + 1,
                        score_raw
                    ))
                })?;
                Some(parsed)
            };

            let extra = headers
                .iter()
                .enumerate()
                .filter(|(i, _)| !known.contains(&Some(*i)))
                .map(|(i, h)| (h.clone(), record.get(i).unwrap_or("").to_string()))
                .collect();

            let severity_label = cell(severity_col);
            rows.push((
                cell(Some(0)),
                IngredientRule {
                    severity: Severity::parse(&severity_label),
                    severity_label,
                    category: cell(category_col),
                    note: cell(note_col),
                    score,
                    extra,
                },
            ));
        }

        Self::from_rows(VocabularyKind::Ingredients, rows)
    }
}

#[derive(Debug, Deserialize)]
struct NutrientThresholdFile {
    nutrients: Vec<NutrientThresholdRow>,
}

#[derive(Debug, Deserialize)]
struct NutrientThresholdRow {
    name: String,
    limit: f64,
    flag: String,
    #[serde(default)]
    note: String,
}

impl NutrientVocabulary {
    /// Parse a nutrient threshold table from JSON
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        let file: NutrientThresholdFile = serde_json::from_str(json)?;

        let mut rows = Vec::with_capacity(file.nutrients.len());
        for row in file.nutrients {
            if !row.limit.is_finite() {
                return Err(AppError::Vocabulary(format!(
                    "nutrient '{}' has a non-finite limit",
                    row.name
                )));
            }
            let flag = NutrientFlag::parse(&row.flag);
            if let NutrientFlag::Unrecognized(raw) = &flag {
                warn!(nutrient = %row.name, flag = %raw, "Unrecognized nutrient flag, rule will always pass");
            }
            rows.push((
                row.name,
                NutrientRule {
                    limit: row.limit,
                    flag,
                    note: row.note,
                },
            ));
        }

        Self::from_rows(VocabularyKind::Nutrients, rows)
    }

    /// The threshold table compiled into the binary
    pub fn builtin() -> AppResult<Self> {
        Self::from_json_str(BUILTIN_NUTRIENT_THRESHOLDS)
    }
}

/// Load the ingredient dataset from a CSV file
pub fn load_ingredient_vocabulary(path: &Path) -> AppResult<IngredientVocabulary> {
    let source = path.display().to_string();
    let result = File::open(path)
        .map_err(|e| AppError::Vocabulary(format!("cannot open '{}': {}", source, e)))
        .and_then(IngredientVocabulary::from_csv_reader);

    match &result {
        Ok(vocabulary) => info!(
            source = %source,
            entries = vocabulary.len(),
            "Ingredient vocabulary loaded"
        ),
        Err(e) => error_logging::log_vocabulary_error(e, "ingredients", Some(&source)),
    }
    result
}

/// Load nutrient thresholds from a JSON file, or the built-in table when no
/// path is given
pub fn load_nutrient_vocabulary(path: Option<&Path>) -> AppResult<NutrientVocabulary> {
    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "builtin".to_string());
    let result = match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| AppError::Vocabulary(format!("cannot read '{}': {}", source, e)))
            .and_then(|json| NutrientVocabulary::from_json_str(&json)),
        None => NutrientVocabulary::builtin(),
    };

    match &result {
        Ok(vocabulary) => info!(
            source = %source,
            entries = vocabulary.len(),
            "Nutrient vocabulary loaded"
        ),
        Err(e) => error_logging::log_vocabulary_error(e, "nutrients", Some(&source)),
    }
    result
}
