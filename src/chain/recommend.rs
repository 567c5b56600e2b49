//! Recommendation synthesis from the final fact base.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::fact::FactStore;
use super::rules::Rule;

/// Fact-id prefix marking a destination recommendation.
pub const RECOMMENDATION_PREFIX: &str = "destino_recomendado_";

/// Confidence used when a recommendation fact carries none.
pub const FALLBACK_CONFIDENCE: f32 = 0.5;

/// A ranked destination recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub destination_id: String,
    pub confidence: f32,
    /// Descriptions of the fired rules that produced this recommendation.
    pub reasons: Vec<String>,
    /// `confidence * 100`.
    pub score: f32,
}

/// Scans a fact base for recommendation facts.
#[derive(Debug, Clone)]
pub struct RecommendationSynthesizer {
    prefix: String,
}

impl Default for RecommendationSynthesizer {
    fn default() -> Self {
        Self::new(RECOMMENDATION_PREFIX)
    }
}

impl RecommendationSynthesizer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Destination id of a recommendation fact, if `fact_id` is one.
    pub fn destination_of<'a>(&self, fact_id: &'a str) -> Option<&'a str> {
        fact_id.strip_prefix(self.prefix.as_str())
    }

    /// Build recommendations sorted by descending confidence.
    ///
    /// Ties keep fact-store order.
    pub fn synthesize(&self, facts: &FactStore, rules: &[Rule]) -> Vec<Recommendation> {
        let mut recommendations: Vec<Recommendation> = facts
            .iter()
            .filter(|fact| fact.is_true())
            .filter_map(|fact| {
                let destination_id = self.destination_of(&fact.id)?;
                let confidence = fact.confidence.unwrap_or(FALLBACK_CONFIDENCE);
                Some(Recommendation {
                    destination_id: destination_id.to_string(),
                    confidence,
                    reasons: reasons_for(&fact.id, rules),
                    score: confidence * 100.0,
                })
            })
            .collect();

        recommendations.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });
        recommendations
    }
}

/// Reasons contributed by every executed rule concluding `fact_id`.
fn reasons_for(fact_id: &str, rules: &[Rule]) -> Vec<String> {
    rules
        .iter()
        .filter(|r| r.executed && r.consequent == fact_id)
        .map(Rule::reason)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::fact::Fact;

    #[test]
    fn ranks_by_descending_confidence() {
        let facts = FactStore::from_facts([
            Fact::new("destino_recomendado_A", true).with_confidence(0.9),
            Fact::new("destino_recomendado_B", true).with_confidence(0.95),
        ]);
        let recs = RecommendationSynthesizer::default().synthesize(&facts, &[]);

        let ids: Vec<&str> = recs.iter().map(|r| r.destination_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert!((recs[0].score - 95.0).abs() < 1e-3);
    }

    #[test]
    fn ties_keep_store_order() {
        let facts = FactStore::from_facts([
            Fact::new("destino_recomendado_x", true).with_confidence(0.8),
            Fact::new("destino_recomendado_y", true).with_confidence(0.8),
            Fact::new("destino_recomendado_z", true).with_confidence(0.8),
        ]);
        let recs = RecommendationSynthesizer::default().synthesize(&facts, &[]);
        let ids: Vec<&str> = recs.iter().map(|r| r.destination_id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn ignores_non_recommendation_and_false_facts() {
        let facts = FactStore::from_facts([
            Fact::asserted("actividad_preferida_cultura"),
            Fact::new("destino_recomendado_lima", "false"),
            Fact::new("destino_recomendado_cusco", 0i64),
        ]);
        assert!(RecommendationSynthesizer::default()
            .synthesize(&facts, &[])
            .is_empty());
    }

    #[test]
    fn missing_confidence_falls_back() {
        let facts = FactStore::from_facts([Fact::new("destino_recomendado_lima", true)]);
        let recs = RecommendationSynthesizer::default().synthesize(&facts, &[]);
        assert_eq!(recs[0].confidence, FALLBACK_CONFIDENCE);
        assert_eq!(recs[0].score, 50.0);
    }

    #[test]
    fn reasons_come_only_from_executed_rules() {
        let facts = FactStore::from_facts([
            Fact::new("destino_recomendado_lima", true).with_confidence(0.98),
        ]);
        let rules = vec![
            Rule::new("fired", "destino_recomendado_lima")
                .with_description("Lima is the food capital")
                .with_executed(true),
            Rule::new("idle", "destino_recomendado_lima").with_description("never fired"),
            Rule::new("fired_no_desc", "destino_recomendado_lima")
                .with_name("Fallback")
                .with_executed(true),
            Rule::new("other", "destino_recomendado_cusco").with_executed(true),
        ];

        let recs = RecommendationSynthesizer::default().synthesize(&facts, &rules);
        assert_eq!(
            recs[0].reasons,
            vec!["Lima is the food capital", "rule 'Fallback' applied"]
        );
    }

    #[test]
    fn custom_prefix() {
        let synth = RecommendationSynthesizer::new("rec:");
        assert_eq!(synth.destination_of("rec:paris"), Some("paris"));
        assert_eq!(synth.destination_of("destino_recomendado_lima"), None);
    }
}
