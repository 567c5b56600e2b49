//! Facts and the fact store.
//!
//! A fact is a confidence-weighted proposition keyed by a string id. The store
//! is open-world: an absent fact is simply unknown, never assumed true.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Confidence assumed for a fact that does not carry one.
pub const DEFAULT_CONFIDENCE: f32 = 1.0;

// ---------------------------------------------------------------------------
// Fact value
// ---------------------------------------------------------------------------

/// The payload of a fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FactValue {
    /// Truthiness of a value.
    ///
    /// Booleans are themselves, strings are true unless empty or the literal
    /// `"false"`, numbers are true iff strictly positive.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => !s.is_empty() && s != "false",
            Self::Number(n) => *n > 0.0,
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<bool> for FactValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for FactValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for FactValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for FactValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FactValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

// ---------------------------------------------------------------------------
// Fact
// ---------------------------------------------------------------------------

/// A single fact in the fact base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub id: String,
    pub value: FactValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Fact {
    /// Create a fact with no explicit confidence.
    pub fn new(id: impl Into<String>, value: impl Into<FactValue>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            confidence: None,
        }
    }

    /// A fact asserted as true with full confidence.
    pub fn asserted(id: impl Into<String>) -> Self {
        Self::new(id, true).with_confidence(DEFAULT_CONFIDENCE)
    }

    /// Set the confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Confidence, falling back to [`DEFAULT_CONFIDENCE`].
    pub fn confidence(&self) -> f32 {
        self.confidence.unwrap_or(DEFAULT_CONFIDENCE)
    }

    pub fn is_true(&self) -> bool {
        self.value.is_truthy()
    }
}

// ---------------------------------------------------------------------------
// Fact store
// ---------------------------------------------------------------------------

/// Facts keyed by id, iterated in first-insertion order.
///
/// Re-inserting an id replaces the fact in place; its position is kept.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    facts: Vec<Fact>,
    index: HashMap<String, usize>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a list of facts. Duplicate ids: last write wins.
    pub fn from_facts(facts: impl IntoIterator<Item = Fact>) -> Self {
        let mut store = Self::new();
        for fact in facts {
            store.insert(fact);
        }
        store
    }

    /// Insert a fact, returning the one it replaced.
    pub fn insert(&mut self, fact: Fact) -> Option<Fact> {
        match self.index.get(&fact.id) {
            Some(&pos) => Some(std::mem::replace(&mut self.facts[pos], fact)),
            None => {
                self.index.insert(fact.id.clone(), self.facts.len());
                self.facts.push(fact);
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Fact> {
        self.index.get(id).map(|&pos| &self.facts[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Whether the fact exists and its value is truthy.
    pub fn is_true(&self, id: &str) -> bool {
        self.get(id).is_some_and(Fact::is_true)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn clear(&mut self) {
        self.facts.clear();
        self.index.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.facts.iter().map(|f| f.id.as_str())
    }
}

impl FromIterator<Fact> for FactStore {
    fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
        Self::from_facts(iter)
    }
}
