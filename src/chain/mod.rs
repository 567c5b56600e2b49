//! Forward-chaining inference over propositional facts.
//!
//! The engine repeatedly picks one fireable rule via a conflict resolution
//! strategy, fires it to derive a new fact, and finally scans the fact base
//! for destination recommendations.

pub mod engine;
pub mod error;
pub mod fact;
pub mod recommend;
pub mod resolver;
pub mod rules;
pub mod strategy;

pub use engine::{
    CancellationToken, EngineConfig, ForwardChainingEngine, HaltReason, InferenceResult,
};
pub use error::{ChainError, ChainResult};
pub use fact::{Fact, FactStore, FactValue};
pub use recommend::{Recommendation, RecommendationSynthesizer};
pub use resolver::{ConflictResolver, Selection};
pub use rules::{Rule, RuleSet};
pub use strategy::ConflictResolutionStrategy;
