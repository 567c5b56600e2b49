//! Forward-chaining inference engine.
//!
//! Each iteration asks the conflict resolver for one fireable rule, fires it
//! and records the derived fact, until one of the terminal states is reached:
//!
//! - no rule is fireable (the normal fixpoint),
//! - the iteration ceiling is exceeded,
//! - the last fired rules show a repetition pattern,
//! - the run was cancelled cooperatively.
//!
//! None of these is an error; every halt produces an [`InferenceResult`].
//!
//! The engine owns private copies of its rules, so `executed` flags never
//! leak into the caller's rule set. Reusing one engine for a second run
//! requires [`ForwardChainingEngine::reset`].

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::error::{ChainError, ChainResult};
use super::fact::{Fact, FactStore};
use super::recommend::{Recommendation, RecommendationSynthesizer};
use super::resolver::ConflictResolver;
use super::rules::Rule;
use super::strategy::ConflictResolutionStrategy;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the forward-chaining engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Conflict resolution strategy, fixed for the engine's lifetime.
    pub strategy: ConflictResolutionStrategy,
    /// Halt once the iteration counter exceeds this (default: 50).
    pub iteration_ceiling: usize,
    /// Repetition is only checked once more than this many rules fired (default: 20).
    pub repetition_min_fired: usize,
    /// Number of most recent firings inspected for repetition (default: 10).
    pub repetition_window: usize,
    /// Halt when the window holds at most this many distinct rule names (default: 2).
    pub repetition_max_distinct: usize,
    /// Seed for the `random` strategy. `None` draws from OS entropy.
    pub random_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: ConflictResolutionStrategy::default(),
            iteration_ceiling: 50,
            repetition_min_fired: 20,
            repetition_window: 10,
            repetition_max_distinct: 2,
            random_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_strategy(mut self, strategy: ConflictResolutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn validate(&self) -> ChainResult<()> {
        if self.iteration_ceiling == 0 {
            return Err(ChainError::InvalidConfig {
                message: "iteration_ceiling must be > 0".into(),
            });
        }
        if self.repetition_window == 0 {
            return Err(ChainError::InvalidConfig {
                message: "repetition_window must be > 0".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cooperative cancellation flag, polled once per iteration.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Terminal state of an inference run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum HaltReason {
    /// No rule was fireable.
    NoMoreRules,
    /// The iteration counter exceeded the ceiling.
    IterationLimit { ceiling: usize },
    /// The recent firings cycled through too few distinct rules.
    RepetitionPattern { window: usize, distinct: usize },
    /// The cancellation token was set or the deadline passed.
    Cancelled,
}

impl HaltReason {
    /// Whether the run stopped on a defensive guard instead of a fixpoint.
    pub fn is_defensive(&self) -> bool {
        matches!(self, Self::IterationLimit { .. } | Self::RepetitionPattern { .. })
    }
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMoreRules => write!(f, "no more fireable rules"),
            Self::IterationLimit { ceiling } => {
                write!(f, "iteration limit reached ({ceiling})")
            }
            Self::RepetitionPattern { window, distinct } => write!(
                f,
                "repetition pattern detected ({distinct} distinct rules in last {window} firings)"
            ),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of one inference run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Rules in firing order, as they were when fired.
    pub fired_rules: Vec<Rule>,
    /// Facts derived by those rules, same order.
    pub derived_facts: Vec<Fact>,
    pub execution_trace: Vec<String>,
    pub final_recommendations: Vec<Recommendation>,
    pub halt: HaltReason,
    pub iterations: usize,
}

impl InferenceResult {
    pub fn fired_rule_names(&self) -> Vec<&str> {
        self.fired_rules.iter().map(|r| r.name.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Forward-chaining inference engine over a private copy of a rule set.
pub struct ForwardChainingEngine {
    config: EngineConfig,
    rules: Vec<Rule>,
    facts: FactStore,
    terminal_consequents: Vec<String>,
    resolver: ConflictResolver,
    synthesizer: RecommendationSynthesizer,
    trace: Vec<String>,
    cancellation: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl ForwardChainingEngine {
    pub fn new(config: EngineConfig) -> Self {
        let resolver = match config.random_seed {
            Some(seed) => ConflictResolver::with_seed(config.strategy, seed),
            None => ConflictResolver::new(config.strategy),
        };
        Self {
            config,
            rules: Vec::new(),
            facts: FactStore::new(),
            terminal_consequents: Vec::new(),
            resolver,
            synthesizer: RecommendationSynthesizer::default(),
            trace: Vec::new(),
            cancellation: None,
            deadline: None,
        }
    }

    /// Append rules. Their `executed` flags are taken as given.
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Seed the fact base. Duplicate ids: last write wins.
    pub fn with_facts(mut self, facts: impl IntoIterator<Item = Fact>) -> Self {
        for fact in facts {
            self.facts.insert(fact);
        }
        self
    }

    /// Declare terminal consequents. They are reported in the trace but do
    /// not stop the run early.
    pub fn with_terminal_consequents<I, S>(mut self, consequents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terminal_consequents = consequents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_recommendation_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.synthesizer = RecommendationSynthesizer::new(prefix);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn fact_base(&self) -> &FactStore {
        &self.facts
    }

    pub fn terminal_consequents(&self) -> &[String] {
        &self.terminal_consequents
    }

    /// Trace of the most recent run.
    pub fn execution_trace(&self) -> &[String] {
        &self.trace
    }

    /// Add a fact to the fact base between runs.
    pub fn add_fact(&mut self, fact: Fact) {
        self.facts.insert(fact);
    }

    /// Clear every `executed` flag, the trace and the fact base, then seed
    /// the fact base with `initial_facts`.
    pub fn reset(&mut self, initial_facts: impl IntoIterator<Item = Fact>) {
        for rule in &mut self.rules {
            rule.executed = false;
        }
        self.trace.clear();
        self.facts = FactStore::from_facts(initial_facts);
    }

    /// Run forward chaining until a terminal state, then synthesize
    /// recommendations from the resulting fact base.
    pub fn infer(&mut self) -> InferenceResult {
        let mut fired_rules: Vec<Rule> = Vec::new();
        let mut derived_facts: Vec<Fact> = Vec::new();

        self.trace.clear();
        self.trace.push("=== inference start ===".into());
        self.trace.push(format!(
            "Initial facts: {}",
            self.facts.ids().collect::<Vec<_>>().join(", ")
        ));
        self.trace.push(format!(
            "Terminal consequents: {}",
            self.terminal_consequents.join(", ")
        ));

        tracing::debug!(
            strategy = %self.config.strategy,
            rules = self.rules.len(),
            facts = self.facts.len(),
            "starting forward chaining"
        );

        let mut iteration = 1;
        let halt = loop {
            if let Some(halt) = self.step(iteration, &mut fired_rules, &mut derived_facts) {
                break halt;
            }
            iteration += 1;
        };

        let recommendations = self.synthesizer.synthesize(&self.facts, &self.rules);

        self.trace.push("=== final result ===".into());
        self.trace.push(format!("Halted: {halt}"));
        self.trace.push(format!("Fired rules: {}", fired_rules.len()));
        self.trace.push(format!("New facts: {}", derived_facts.len()));
        self.trace
            .push(format!("Recommendations: {}", recommendations.len()));

        tracing::info!(
            fired = fired_rules.len(),
            derived = derived_facts.len(),
            recommendations = recommendations.len(),
            iterations = iteration,
            halt = %halt,
            "inference complete"
        );

        InferenceResult {
            fired_rules,
            derived_facts,
            execution_trace: self.trace.clone(),
            final_recommendations: recommendations,
            halt,
            iterations: iteration,
        }
    }

    // -----------------------------------------------------------------------
    // Loop internals
    // -----------------------------------------------------------------------

    /// Run one iteration. Returns the halt reason once a terminal state is
    /// reached.
    fn step(
        &mut self,
        iteration: usize,
        fired_rules: &mut Vec<Rule>,
        derived_facts: &mut Vec<Fact>,
    ) -> Option<HaltReason> {
        self.trace.push(format!("--- Iteration {iteration} ---"));

        if self.is_cancelled() {
            self.trace.push("Run cancelled".into());
            tracing::warn!(iteration, "inference cancelled");
            return Some(HaltReason::Cancelled);
        }

        let Some(selection) = self.resolver.resolve(&self.rules, &self.facts) else {
            self.trace.push("No fireable rules".into());
            return Some(HaltReason::NoMoreRules);
        };

        let candidates: Vec<&str> = selection
            .candidates
            .iter()
            .map(|&i| self.rules[i].name.as_str())
            .collect();
        self.trace
            .push(format!("Candidate rules: {}", candidates.join(", ")));
        self.trace
            .push(self.resolver.describe(&self.rules[selection.index]));

        let rule = &mut self.rules[selection.index];
        rule.executed = true;
        let fact = Fact::new(rule.consequent.clone(), true).with_confidence(rule.confidence);

        self.trace.push(format!("Fired rule: {}", rule.name));
        self.trace.push(format!(
            "  antecedents satisfied: {}",
            rule.antecedents.join(", ")
        ));
        self.trace
            .push(format!("  derived fact: {}", rule.consequent));

        tracing::debug!(
            rule = %rule.id,
            consequent = %rule.consequent,
            confidence = rule.confidence,
            iteration,
            "rule fired"
        );

        fired_rules.push(rule.clone());
        self.facts.insert(fact.clone());
        derived_facts.push(fact);

        if iteration + 1 > self.config.iteration_ceiling {
            let halt = HaltReason::IterationLimit {
                ceiling: self.config.iteration_ceiling,
            };
            self.trace.push(format!("Defensive stop: {halt}"));
            tracing::warn!(ceiling = self.config.iteration_ceiling, "iteration limit reached");
            return Some(halt);
        }

        if let Some(distinct) = self.repetition_in(fired_rules) {
            let halt = HaltReason::RepetitionPattern {
                window: self.config.repetition_window,
                distinct,
            };
            self.trace.push(format!("Defensive stop: {halt}"));
            tracing::warn!(
                fired = fired_rules.len(),
                distinct,
                "repetition pattern detected"
            );
            return Some(halt);
        }

        None
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Distinct rule names in the recent window, if they signal a repetition.
    fn repetition_in(&self, fired: &[Rule]) -> Option<usize> {
        if fired.len() <= self.config.repetition_min_fired {
            return None;
        }
        let window = self.config.repetition_window.min(fired.len());
        let distinct: HashSet<&str> = fired[fired.len() - window..]
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        (distinct.len() <= self.config.repetition_max_distinct).then_some(distinct.len())
    }
}

impl fmt::Debug for ForwardChainingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwardChainingEngine")
            .field("strategy", &self.config.strategy)
            .field("rules", &self.rules.len())
            .field("facts", &self.facts.len())
            .finish()
    }
}
