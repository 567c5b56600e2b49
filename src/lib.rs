// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # destino
//!
//! A forward-chaining rule engine that derives travel-destination
//! recommendations from a knowledge base of if-then rules and a set of user
//! preference facts.
//!
//! ## Architecture
//!
//! - **Inference** (`chain`): fact store, conflict resolution, the
//!   forward-chaining loop and recommendation synthesis
//! - **Knowledge** (`knowledge`): bundled TOML rule set and destination catalog
//! - **Preferences** (`preferences`): user preferences to facts
//! - **Advisor** (`advisor`): runs the engine under a timeout and enriches results
//!
//! ## Library usage
//!
//! ```no_run
//! use destino::chain::{ConflictResolutionStrategy, EngineConfig, Fact, ForwardChainingEngine, Rule};
//!
//! let rule = Rule::new("gastronomia_lima", "destino_recomendado_lima")
//!     .with_antecedents(["actividad_preferida_gastronomia"])
//!     .with_confidence(0.98);
//! let mut engine = ForwardChainingEngine::new(
//!     EngineConfig::default().with_strategy(ConflictResolutionStrategy::HighestPriority),
//! )
//! .with_rules([rule])
//! .with_facts([Fact::asserted("actividad_preferida_gastronomia")]);
//!
//! let result = engine.infer();
//! assert_eq!(result.final_recommendations[0].destination_id, "lima");
//! ```

pub mod advisor;
pub mod chain;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod preferences;
