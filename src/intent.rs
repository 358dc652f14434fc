//! Search intent extraction
//!
//! Turns a free-text student message into [`SearchCriteria`] using a small,
//! ordered table of keyword rules. Each rule owns one field of the criteria:
//!
//! | field    | triggers                    | value                        |
//! |----------|-----------------------------|------------------------------|
//! | subject  | subject, course, teach      | next word                    |
//! | rating   | rating, stars, score        | next number (int or decimal) |
//! | keywords | focus, expertise, specialty | next word, lower-cased       |
//!
//! Triggers match case-insensitively at the start of a word and may carry a
//! suffix ("ratings", "courses", "teaches"). Rules run independently over the
//! whole message and a rule that finds nothing leaves its field unset.

use crate::error::{ProfragError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Structured filter extracted from a user message
///
/// Absent fields impose no constraint on the search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Course or subject the professor teaches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Star rating to match exactly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Area of focus, lower-cased
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

impl SearchCriteria {
    /// Returns true when no field is set
    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.rating.is_none() && self.keywords.is_none()
    }

    /// Builds the metadata filter for the vector index
    ///
    /// Every set field becomes an exact-match (`$eq`) constraint. Returns
    /// `None` for empty criteria so the query runs unfiltered.
    ///
    /// # Examples
    ///
    /// ```
    /// use profrag::intent::SearchCriteria;
    ///
    /// let criteria = SearchCriteria {
    ///     rating: Some(4.5),
    ///     ..Default::default()
    /// };
    /// let filter = criteria.to_filter().unwrap();
    /// assert_eq!(filter["rating"]["$eq"], 4.5);
    /// assert!(SearchCriteria::default().to_filter().is_none());
    /// ```
    pub fn to_filter(&self) -> Option<Value> {
        if self.is_empty() {
            return None;
        }

        let mut filter = Map::new();
        if let Some(subject) = &self.subject {
            filter.insert("subject".to_string(), json!({ "$eq": subject }));
        }
        if let Some(rating) = self.rating {
            filter.insert("rating".to_string(), json!({ "$eq": rating }));
        }
        if let Some(keywords) = &self.keywords {
            filter.insert("keywords".to_string(), json!({ "$eq": keywords }));
        }
        Some(Value::Object(filter))
    }
}

/// Criteria field a rule writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriteriaField {
    Subject,
    Rating,
    Keywords,
}

/// How the value following a trigger is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Next word token, as written
    Word,
    /// Next word token, lower-cased
    LowercaseWord,
    /// Next standalone numeric token
    Number,
}

/// One extraction rule: a field, its trigger words and the value kind
#[derive(Debug, Clone)]
pub struct IntentRule {
    field: CriteriaField,
    kind: ValueKind,
    pattern: Regex,
}

impl IntentRule {
    /// Compiles a rule from its trigger words
    ///
    /// # Errors
    ///
    /// Returns `ProfragError::Config` if the trigger list is empty or does
    /// not compile
    pub fn new(field: CriteriaField, triggers: &[&str], kind: ValueKind) -> Result<Self> {
        if triggers.is_empty() {
            return Err(ProfragError::Config(format!(
                "intent rule for {:?} has no triggers",
                field
            ))
            .into());
        }

        let alternation = triggers
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let value = match kind {
            ValueKind::Word | ValueKind::LowercaseWord => r"\W+(\w+)",
            ValueKind::Number => r".*?[^\w.]([0-9]+(?:\.[0-9]+)?)(?:[^\w.]|\.(?:[^0-9]|$)|$)",
        };
        let source = format!(r"(?is)\b(?:{})\w*{}", alternation, value);

        let pattern = Regex::new(&source).map_err(|e| {
            ProfragError::Config(format!("invalid intent rule for {:?}: {}", field, e))
        })?;

        Ok(Self {
            field,
            kind,
            pattern,
        })
    }

    /// Field this rule fills in
    pub fn field(&self) -> CriteriaField {
        self.field
    }

    /// Evaluates the rule against a message
    ///
    /// Returns the first value found after any trigger occurrence. The value
    /// is returned as text; numeric rules return the matched digits.
    pub fn extract(&self, text: &str) -> Option<String> {
        let captures = self.pattern.captures(text)?;
        let value = captures.get(1)?.as_str();
        match self.kind {
            ValueKind::Word | ValueKind::Number => Some(value.to_string()),
            ValueKind::LowercaseWord => Some(value.to_lowercase()),
        }
    }
}

/// Rule-table parser producing [`SearchCriteria`]
#[derive(Debug, Clone)]
pub struct IntentParser {
    rules: Vec<IntentRule>,
}

impl IntentParser {
    /// Builds the parser with the standard rule table
    ///
    /// # Errors
    ///
    /// Returns an error if a rule fails to compile
    pub fn new() -> Result<Self> {
        Ok(Self {
            rules: vec![
                IntentRule::new(
                    CriteriaField::Subject,
                    &["subject", "course", "teach"],
                    ValueKind::Word,
                )?,
                IntentRule::new(
                    CriteriaField::Rating,
                    &["rating", "stars", "score"],
                    ValueKind::Number,
                )?,
                IntentRule::new(
                    CriteriaField::Keywords,
                    &["focus", "expertise", "specialty"],
                    ValueKind::LowercaseWord,
                )?,
            ],
        })
    }

    /// Builds a parser from a custom rule table
    pub fn with_rules(rules: Vec<IntentRule>) -> Self {
        Self { rules }
    }

    /// Extracts search criteria from a message
    ///
    /// Never fails: text without triggers yields empty criteria.
    ///
    /// # Examples
    ///
    /// ```
    /// use profrag::intent::IntentParser;
    ///
    /// let parser = IntentParser::new().unwrap();
    /// let criteria = parser.parse("I want ratings around 4.5 stars");
    /// assert_eq!(criteria.rating, Some(4.5));
    /// assert!(criteria.subject.is_none());
    /// ```
    pub fn parse(&self, text: &str) -> SearchCriteria {
        let mut criteria = SearchCriteria::default();

        for rule in &self.rules {
            let Some(value) = rule.extract(text) else {
                continue;
            };
            match rule.field() {
                CriteriaField::Subject => criteria.subject = Some(value),
                CriteriaField::Keywords => criteria.keywords = Some(value),
                CriteriaField::Rating => match value.parse::<f64>() {
                    Ok(rating) => criteria.rating = Some(rating),
                    Err(e) => tracing::debug!(value = %value, error = %e, "Ignoring rating value"),
                },
            }
        }

        criteria
    }
}
