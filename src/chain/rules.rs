//! Data-driven if-then rules.
//!
//! Rules are plain structs: they are loaded from the TOML knowledge base or
//! built programmatically with the `with_*` builders.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A single production rule: when every antecedent fact holds, derive the
/// consequent fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    /// Fact ids that must all be present and true.
    #[serde(default)]
    pub antecedents: Vec<String>,
    /// Fact id produced when the rule fires.
    pub consequent: String,
    /// Confidence given to the derived fact.
    #[serde(default = "default_rule_confidence")]
    pub confidence: f32,
    /// Refraction marker, set once the rule has fired.
    #[serde(default)]
    pub executed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_rule_confidence() -> f32 {
    1.0
}

impl Rule {
    /// Create a rule with no antecedents, priority 0 and full confidence.
    /// The name defaults to the id.
    pub fn new(id: impl Into<String>, consequent: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            priority: 0,
            antecedents: Vec::new(),
            consequent: consequent.into(),
            confidence: default_rule_confidence(),
            executed: false,
            description: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set antecedents.
    pub fn with_antecedents<I, S>(mut self, antecedents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.antecedents = antecedents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the rule as already fired.
    pub fn with_executed(mut self, executed: bool) -> Self {
        self.executed = executed;
        self
    }

    /// Human-readable justification used in recommendations.
    pub fn reason(&self) -> String {
        match &self.description {
            Some(d) if !d.is_empty() => d.clone(),
            _ => format!("rule '{}' applied", self.name),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

/// An ordered collection of rules with metadata. Declaration order matters:
/// it breaks ties in conflict resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    pub name: String,
    pub source: String,
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            source: "programmatic".into(),
            rules,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Clear every `executed` flag.
    pub fn reset(&mut self) {
        for rule in &mut self.rules {
            rule.executed = false;
        }
    }

    pub fn executed_count(&self) -> usize {
        self.rules.iter().filter(|r| r.executed).count()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl IntoIterator for RuleSet {
    type Item = Rule;
    type IntoIter = std::vec::IntoIter<Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new("anonymous", rules)
    }
}
