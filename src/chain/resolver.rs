//! Conflict resolution: compute the fireable set and pick one rule from it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::fact::FactStore;
use super::rules::Rule;
use super::strategy::ConflictResolutionStrategy;

/// Outcome of one resolution step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Index of the chosen rule in the rule list.
    pub index: usize,
    /// Indices of every fireable rule, in declaration order.
    pub candidates: Vec<usize>,
}

/// Selects at most one rule to fire per iteration.
pub struct ConflictResolver {
    strategy: ConflictResolutionStrategy,
    rng: StdRng,
}

impl ConflictResolver {
    pub fn new(strategy: ConflictResolutionStrategy) -> Self {
        Self {
            strategy,
            rng: StdRng::from_entropy(),
        }
    }

    /// Resolver whose `Random` strategy is reproducible.
    pub fn with_seed(strategy: ConflictResolutionStrategy, seed: u64) -> Self {
        Self {
            strategy,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn strategy(&self) -> ConflictResolutionStrategy {
        self.strategy
    }

    /// Whether a rule may fire against the current facts.
    ///
    /// A rule is fireable when it has not fired, its consequent is not already
    /// a known fact, and every antecedent is present and true.
    pub fn is_fireable(rule: &Rule, facts: &FactStore) -> bool {
        !rule.executed
            && !facts.contains(&rule.consequent)
            && rule.antecedents.iter().all(|a| facts.is_true(a))
    }

    /// Indices of all fireable rules, in declaration order.
    pub fn fireable(rules: &[Rule], facts: &FactStore) -> Vec<usize> {
        rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| Self::is_fireable(rule, facts))
            .map(|(i, _)| i)
            .collect()
    }

    /// Pick one rule to fire, or `None` when nothing is fireable.
    pub fn resolve(&mut self, rules: &[Rule], facts: &FactStore) -> Option<Selection> {
        let candidates = Self::fireable(rules, facts);
        let index = self.select(rules, &candidates)?;
        Some(Selection { index, candidates })
    }

    /// Apply the strategy to a candidate list.
    pub fn select(&mut self, rules: &[Rule], candidates: &[usize]) -> Option<usize> {
        let first = *candidates.first()?;

        let chosen = match self.strategy {
            ConflictResolutionStrategy::FirstRule => first,
            ConflictResolutionStrategy::HighestPriority => {
                // Strict comparison keeps the earlier rule on ties.
                candidates.iter().copied().fold(first, |best, i| {
                    if rules[i].priority > rules[best].priority {
                        i
                    } else {
                        best
                    }
                })
            }
            ConflictResolutionStrategy::Refraction => candidates
                .iter()
                .copied()
                .find(|&i| !rules[i].executed)
                .unwrap_or(first),
            ConflictResolutionStrategy::Random => {
                candidates[self.rng.gen_range(0..candidates.len())]
            }
            ConflictResolutionStrategy::LeastAntecedents => {
                candidates.iter().copied().fold(first, |best, i| {
                    if rules[i].antecedents.len() < rules[best].antecedents.len() {
                        i
                    } else {
                        best
                    }
                })
            }
        };

        Some(chosen)
    }

    /// One-line description of a choice, for the execution trace.
    pub fn describe(&self, rule: &Rule) -> String {
        match self.strategy {
            ConflictResolutionStrategy::FirstRule => format!("Strategy: first rule -> {}", rule.name),
            ConflictResolutionStrategy::HighestPriority => format!(
                "Strategy: highest priority -> {} ({})",
                rule.name, rule.priority
            ),
            ConflictResolutionStrategy::Refraction => format!("Strategy: refraction -> {}", rule.name),
            ConflictResolutionStrategy::Random => format!("Strategy: random -> {}", rule.name),
            ConflictResolutionStrategy::LeastAntecedents => format!(
                "Strategy: most general -> {} ({} antecedents)",
                rule.name,
                rule.antecedents.len()
            ),
        }
    }
}
