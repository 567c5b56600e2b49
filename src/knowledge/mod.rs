//! Knowledge base: the TOML-defined rule set and background facts.
//!
//! One knowledge base is bundled into the binary (`data/knowledge/rules.toml`)
//! together with its destination catalog. Either file can be replaced by a
//! copy on disk.

pub mod destinations;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::chain::recommend::RECOMMENDATION_PREFIX;
use crate::chain::{EngineConfig, Fact, ForwardChainingEngine, Rule, RuleSet};

pub use destinations::{Destination, DestinationCatalog};

// ── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Error, Diagnostic)]
pub enum KnowledgeError {
    #[error("failed to parse {what} \"{origin}\": {message}")]
    #[diagnostic(
        code(destino::knowledge::parse),
        help("Check the TOML syntax. Rules need id, name, consequent; destinations need id and name.")
    )]
    Parse {
        what: &'static str,
        origin: String,
        message: String,
    },

    #[error("failed to read knowledge file: {path}")]
    #[diagnostic(code(destino::knowledge::io), help("Ensure the file exists and is readable."))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rule \"{rule_id}\": {message}")]
    #[diagnostic(
        code(destino::knowledge::invalid_rule),
        help("Rule confidence must lie in 0..=1 and the consequent must not be empty.")
    )]
    InvalidRule { rule_id: String, message: String },

    #[error("duplicate rule id \"{rule_id}\"")]
    #[diagnostic(
        code(destino::knowledge::duplicate_rule),
        help("Every rule in a knowledge base needs a unique id.")
    )]
    DuplicateRule { rule_id: String },
}

pub type KnowledgeResult<T> = std::result::Result<T, KnowledgeError>;

// ── Data model ──────────────────────────────────────────────────────────

/// Where a knowledge file came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeSource {
    /// Bundled into the binary via `include_str!`.
    Bundled,
    /// Loaded from a file.
    External(PathBuf),
}

impl KnowledgeSource {
    fn describe(&self) -> String {
        match self {
            Self::Bundled => "bundled".into(),
            Self::External(path) => path.display().to_string(),
        }
    }
}

/// A rule set plus the metadata needed to run it.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    pub id: String,
    pub name: String,
    pub version: String,
    /// Fact-id prefix of recommendation consequents.
    pub recommendation_prefix: String,
    pub terminal_consequents: Vec<String>,
    /// Background facts that hold regardless of user input.
    pub facts: Vec<Fact>,
    pub rules: RuleSet,
    pub source: KnowledgeSource,
}

// ── TOML deserialization helpers ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct KnowledgeToml {
    knowledge: KnowledgeMeta,
    #[serde(default)]
    facts: Vec<Fact>,
    #[serde(default)]
    rules: Vec<Rule>,
}

#[derive(Debug, Deserialize)]
struct KnowledgeMeta {
    id: String,
    name: String,
    version: String,
    #[serde(default = "default_prefix")]
    recommendation_prefix: String,
    #[serde(default)]
    terminal_consequents: Vec<String>,
}

fn default_prefix() -> String {
    RECOMMENDATION_PREFIX.into()
}

const RULES_TOML: &str = include_str!("../../data/knowledge/rules.toml");

// ── Loading ─────────────────────────────────────────────────────────────

impl KnowledgeBase {
    /// The knowledge base compiled into the binary.
    pub fn bundled() -> KnowledgeResult<Self> {
        Self::from_toml_str(RULES_TOML, KnowledgeSource::Bundled)
    }

    /// Load a knowledge base from a TOML file.
    pub fn load(path: &Path) -> KnowledgeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content, KnowledgeSource::External(path.to_path_buf()))
    }

    /// Parse and validate a knowledge base.
    pub fn from_toml_str(toml_str: &str, source: KnowledgeSource) -> KnowledgeResult<Self> {
        let parsed: KnowledgeToml =
            toml::from_str(toml_str).map_err(|e| KnowledgeError::Parse {
                what: "knowledge base",
                origin: source.describe(),
                message: e.to_string(),
            })?;

        validate_rules(&parsed.rules)?;

        let meta = parsed.knowledge;
        let mut rules = RuleSet::new(meta.name.clone(), parsed.rules);
        rules.source = source.describe();

        tracing::debug!(
            id = %meta.id,
            rules = rules.len(),
            facts = parsed.facts.len(),
            source = %rules.source,
            "loaded knowledge base"
        );

        Ok(Self {
            id: meta.id,
            name: meta.name,
            version: meta.version,
            recommendation_prefix: meta.recommendation_prefix,
            terminal_consequents: meta.terminal_consequents,
            facts: parsed.facts,
            rules,
            source,
        })
    }

    /// Build an engine over a fresh copy of this knowledge base's rules.
    ///
    /// Background facts are not seeded; pass them with `with_facts` if wanted.
    pub fn engine(&self, config: EngineConfig) -> ForwardChainingEngine {
        ForwardChainingEngine::new(config)
            .with_rules(self.rules.rules.iter().cloned())
            .with_terminal_consequents(self.terminal_consequents.iter().cloned())
            .with_recommendation_prefix(self.recommendation_prefix.clone())
    }

    /// Rules whose consequent is a recommendation fact.
    pub fn recommendation_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules
            .rules
            .iter()
            .filter(|r| r.consequent.starts_with(&self.recommendation_prefix))
    }
}

/// Reject rules with out-of-range confidence, empty consequents or repeated
/// ids. Antecedents are not checked: an unreachable antecedent just keeps its
/// rule from ever firing.
fn validate_rules(rules: &[Rule]) -> KnowledgeResult<()> {
    let mut seen = HashSet::new();
    for rule in rules {
        if !(0.0..=1.0).contains(&rule.confidence) {
            return Err(KnowledgeError::InvalidRule {
                rule_id: rule.id.clone(),
                message: format!("confidence {} is outside 0..=1", rule.confidence),
            });
        }
        if rule.consequent.trim().is_empty() {
            return Err(KnowledgeError::InvalidRule {
                rule_id: rule.id.clone(),
                message: "consequent is empty".into(),
            });
        }
        if !seen.insert(rule.id.as_str()) {
            return Err(KnowledgeError::DuplicateRule {
                rule_id: rule.id.clone(),
            });
        }
    }
    Ok(())
}
