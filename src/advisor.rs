//! Travel advisor: turns user preferences into enriched recommendations.
//!
//! The advisor owns the knowledge base and destination catalog. Every call
//! builds a fresh engine over a copy of the rules, so no `executed` flags
//! need resetting between requests. The run happens on a worker thread and
//! is cancelled cooperatively once the configured timeout expires.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::{
    CancellationToken, EngineConfig, Fact, HaltReason, InferenceResult, Recommendation,
};
use crate::config::{AdvisorSettings, DestinoConfig};
use crate::error::DestinoResult;
use crate::knowledge::{Destination, DestinationCatalog, KnowledgeBase};
use crate::preferences::TravelPreferences;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum AdvisorError {
    #[error("inference took longer than {timeout_ms} ms")]
    #[diagnostic(
        code(destino::advisor::timeout),
        help("Raise advisor.timeout_ms or review the rule set for long derivation chains.")
    )]
    Timeout { timeout_ms: u64 },

    #[error("inference worker failed: {message}")]
    #[diagnostic(
        code(destino::advisor::worker),
        help("The background inference thread could not run to completion.")
    )]
    Worker { message: String },
}

pub type AdvisorResult<T> = std::result::Result<T, AdvisorError>;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A recommendation together with its destination record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendedRecommendation {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub destination: Destination,
}

/// Everything one advisory request produced, including debug details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advice {
    pub input_facts: Vec<Fact>,
    /// Names of the fired rules, in firing order.
    pub fired_rules: Vec<String>,
    pub derived_facts: Vec<Fact>,
    pub execution_trace: Vec<String>,
    pub halt: HaltReason,
    pub iterations: usize,
    pub total_rules: usize,
    pub elapsed_ms: u64,
    pub recommendations: Vec<ExtendedRecommendation>,
}

// ---------------------------------------------------------------------------
// Advisor
// ---------------------------------------------------------------------------

pub struct TravelAdvisor {
    knowledge: KnowledgeBase,
    catalog: DestinationCatalog,
    engine_config: EngineConfig,
    settings: AdvisorSettings,
}

impl TravelAdvisor {
    pub fn new(
        knowledge: KnowledgeBase,
        catalog: DestinationCatalog,
        engine_config: EngineConfig,
        settings: AdvisorSettings,
    ) -> Self {
        Self {
            knowledge,
            catalog,
            engine_config,
            settings,
        }
    }

    /// Advisor over the bundled knowledge base and catalog.
    pub fn bundled() -> DestinoResult<Self> {
        Self::from_config(&DestinoConfig::default())
    }

    /// Build from configuration, loading override files when set.
    pub fn from_config(config: &DestinoConfig) -> DestinoResult<Self> {
        config.validate()?;
        let knowledge = match &config.advisor.knowledge_file {
            Some(path) => KnowledgeBase::load(path)?,
            None => KnowledgeBase::bundled()?,
        };
        let catalog = match &config.advisor.destinations_file {
            Some(path) => DestinationCatalog::load(path)?,
            None => DestinationCatalog::bundled()?,
        };
        Ok(Self::new(
            knowledge,
            catalog,
            config.engine.clone(),
            config.advisor.clone(),
        ))
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn catalog(&self) -> &DestinationCatalog {
        &self.catalog
    }

    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine_config
    }

    /// Facts an engine run starts from for these preferences.
    pub fn input_facts(&self, preferences: &TravelPreferences) -> Vec<Fact> {
        let mut facts = Vec::new();
        if self.settings.background_facts {
            facts.extend(self.knowledge.facts.iter().cloned());
        }
        facts.extend(preferences.to_facts());
        facts
    }

    /// Run inference for `preferences` and enrich the results.
    pub fn recommend(&self, preferences: &TravelPreferences) -> AdvisorResult<Advice> {
        let started = Instant::now();
        let input_facts = self.input_facts(preferences);
        let timeout = self.settings.timeout();

        tracing::debug!(
            facts = input_facts.len(),
            strategy = %self.engine_config.strategy,
            timeout_ms = self.settings.timeout_ms,
            "running advisory inference"
        );

        let result = self.run_with_timeout(input_facts.clone(), timeout)?;

        let mut recommendations: Vec<ExtendedRecommendation> = result
            .final_recommendations
            .iter()
            .map(|rec| ExtendedRecommendation {
                destination: self.catalog.lookup(&rec.destination_id),
                recommendation: rec.clone(),
            })
            .collect();
        recommendations.sort_by(|a, b| {
            b.recommendation
                .confidence
                .total_cmp(&a.recommendation.confidence)
        });

        Ok(Advice {
            fired_rules: result.fired_rules.iter().map(|r| r.name.clone()).collect(),
            input_facts,
            derived_facts: result.derived_facts,
            execution_trace: result.execution_trace,
            halt: result.halt,
            iterations: result.iterations,
            total_rules: self.knowledge.rules.len(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            recommendations,
        })
    }

    fn run_with_timeout(
        &self,
        facts: Vec<Fact>,
        timeout: Duration,
    ) -> AdvisorResult<InferenceResult> {
        let token = CancellationToken::new();
        let mut engine = self
            .knowledge
            .engine(self.engine_config.clone())
            .with_facts(facts)
            .with_cancellation(token.clone())
            .with_deadline(Instant::now() + timeout);

        let (tx, rx) = mpsc::channel();
        let worker = std::thread::Builder::new()
            .name("destino-inference".into())
            .spawn(move || {
                // The receiver is gone only after a timeout; nothing to report then.
                let _ = tx.send(engine.infer());
            })
            .map_err(|e| AdvisorError::Worker {
                message: e.to_string(),
            })?;

        let timeout_ms = self.settings.timeout_ms;
        let result = match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                token.cancel();
                tracing::warn!(timeout_ms, "inference timed out, cancelling worker");
                return Err(AdvisorError::Timeout { timeout_ms });
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(AdvisorError::Worker {
                    message: "worker exited without a result".into(),
                });
            }
        };
        worker.join().map_err(|_| AdvisorError::Worker {
            message: "worker panicked".into(),
        })?;

        if result.halt == HaltReason::Cancelled {
            tracing::warn!(timeout_ms, "inference hit its deadline");
            return Err(AdvisorError::Timeout { timeout_ms });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ConflictResolutionStrategy;

    fn advisor() -> TravelAdvisor {
        TravelAdvisor::bundled().unwrap()
    }

    #[test]
    fn gastronomy_recommends_lima_first() {
        let advice = advisor()
            .recommend(&TravelPreferences::new().with_activity("gastronomia"))
            .unwrap();

        assert_eq!(advice.halt, HaltReason::NoMoreRules);
        assert_eq!(advice.recommendations.len(), 1);
        let top = &advice.recommendations[0];
        assert_eq!(top.recommendation.destination_id, "lima");
        assert_eq!(top.destination.name, "Lima - Capital Gastronómica");
        assert!(!top.recommendation.reasons.is_empty());
        assert_eq!(advice.total_rules, 34);
    }

    #[test]
    fn recommendations_are_sorted_and_enriched() {
        let advice = advisor()
            .recommend(
                &TravelPreferences::new()
                    .with_activity("aventura")
                    .with_budget("media")
                    .with_duration("4-7"),
            )
            .unwrap();

        assert!(advice.recommendations.len() >= 2);
        for pair in advice.recommendations.windows(2) {
            assert!(pair[0].recommendation.confidence >= pair[1].recommendation.confidence);
        }
        assert!(advice
            .recommendations
            .iter()
            .all(|r| r.destination.description != "Destino no encontrado"));
    }

    #[test]
    fn empty_preferences_recommend_nothing() {
        let advice = advisor().recommend(&TravelPreferences::new()).unwrap();
        assert!(advice.input_facts.is_empty());
        assert!(advice.fired_rules.is_empty());
        assert!(advice.recommendations.is_empty());
    }

    #[test]
    fn background_facts_are_optional() {
        let kb = KnowledgeBase::bundled().unwrap();
        let catalog = DestinationCatalog::bundled().unwrap();
        let settings = AdvisorSettings {
            background_facts: true,
            ..Default::default()
        };
        let advisor = TravelAdvisor::new(kb, catalog, EngineConfig::default(), settings);

        let facts = advisor.input_facts(&TravelPreferences::new().with_activity("relax"));
        assert_eq!(facts.len(), 4);
        assert_eq!(facts[0].id, "peru_destino_sudamerica");
        assert_eq!(facts[3].id, "actividad_preferida_relax");
    }

    #[test]
    fn zero_timeout_reports_timeout() {
        let kb = KnowledgeBase::bundled().unwrap();
        let catalog = DestinationCatalog::bundled().unwrap();
        let settings = AdvisorSettings {
            timeout_ms: 0,
            ..Default::default()
        };
        let advisor = TravelAdvisor::new(kb, catalog, EngineConfig::default(), settings);

        let err = advisor
            .recommend(&TravelPreferences::new().with_activity("cultura"))
            .unwrap_err();
        assert!(matches!(err, AdvisorError::Timeout { timeout_ms: 0 }));
    }

    #[test]
    fn repeated_requests_are_independent() {
        let advisor = advisor();
        let prefs = TravelPreferences::new().with_activity("trekking");
        let first = advisor.recommend(&prefs).unwrap();
        let second = advisor.recommend(&prefs).unwrap();

        assert_eq!(first.fired_rules, second.fired_rules);
        assert_eq!(advisor.knowledge().rules.executed_count(), 0);
    }

    #[test]
    fn strategy_comes_from_config() {
        let config = DestinoConfig {
            engine: EngineConfig::default().with_strategy(ConflictResolutionStrategy::FirstRule),
            ..Default::default()
        };
        let advisor = TravelAdvisor::from_config(&config).unwrap();
        assert_eq!(
            advisor.engine_config().strategy,
            ConflictResolutionStrategy::FirstRule
        );
    }
}
