//! End-to-end tests over the bundled knowledge base.
//!
//! These exercise preference translation, forward chaining with each
//! conflict resolution strategy, recommendation synthesis and catalog
//! enrichment together.

use destino::advisor::TravelAdvisor;
use destino::chain::{
    ConflictResolutionStrategy, EngineConfig, Fact, ForwardChainingEngine, HaltReason, Rule,
};
use destino::knowledge::{DestinationCatalog, KnowledgeBase};
use destino::preferences::TravelPreferences;

fn bundled_engine(strategy: ConflictResolutionStrategy) -> ForwardChainingEngine {
    KnowledgeBase::bundled()
        .unwrap()
        .engine(EngineConfig::default().with_strategy(strategy))
}

fn destination_ids(engine: &mut ForwardChainingEngine) -> Vec<String> {
    engine
        .infer()
        .final_recommendations
        .into_iter()
        .map(|r| r.destination_id)
        .collect()
}

#[test]
fn gastronomy_preference_recommends_lima() {
    let prefs = TravelPreferences::new().with_activity("gastronomia");
    let mut engine =
        bundled_engine(ConflictResolutionStrategy::HighestPriority).with_facts(prefs.to_facts());
    let result = engine.infer();

    assert_eq!(result.halt, HaltReason::NoMoreRules);
    assert!(result.fired_rules.iter().any(|r| r.id == "gastronomia_lima"));
    assert_eq!(result.final_recommendations.len(), 1);

    let lima = &result.final_recommendations[0];
    assert_eq!(lima.destination_id, "lima");
    assert!((lima.confidence - 0.98).abs() < 1e-6);
    assert!((lima.score - 98.0).abs() < 1e-3);
    assert_eq!(lima.reasons, vec!["Lima es la capital gastronómica de Sudamérica"]);
}

#[test]
fn first_matching_rule_owns_each_destination() {
    // Both trekking rules conclude Cusco; only the higher-priority one fires.
    let prefs = TravelPreferences::new()
        .with_activity("trekking")
        .with_climate("frio");
    let mut engine =
        bundled_engine(ConflictResolutionStrategy::HighestPriority).with_facts(prefs.to_facts());
    let result = engine.infer();

    let fired: Vec<&str> = result.fired_rules.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(fired, vec!["trekking_cusco"]);
    let cusco = &result.final_recommendations[0];
    assert_eq!(cusco.destination_id, "cusco-machu-picchu");
    assert!((cusco.confidence - 0.98).abs() < 1e-6);
}

#[test]
fn culture_preferences_rank_by_confidence() {
    let prefs = TravelPreferences::new()
        .with_activity("cultura")
        .with_budget("media")
        .with_duration("1-3")
        .with_climate("templado");
    let mut engine =
        bundled_engine(ConflictResolutionStrategy::HighestPriority).with_facts(prefs.to_facts());

    assert_eq!(
        destination_ids(&mut engine),
        vec!["cusco-machu-picchu", "lima", "arequipa-colca"]
    );
}

#[test]
fn strategy_changes_which_rule_claims_a_destination() {
    // cultura + 1-3 enables cultura_lima_rapido (2 antecedents, priority 8,
    // 0.9) and segunda_opcion_cultura (1 antecedent, priority 2, 0.5). Both
    // conclude Lima, so whichever the strategy picks blocks the other.
    let prefs = TravelPreferences::new()
        .with_activity("cultura")
        .with_duration("1-3");

    let mut general =
        bundled_engine(ConflictResolutionStrategy::LeastAntecedents).with_facts(prefs.to_facts());
    let result = general.infer();
    let lima = result
        .final_recommendations
        .iter()
        .find(|r| r.destination_id == "lima")
        .unwrap();
    assert!((lima.confidence - 0.5).abs() < 1e-6);

    let mut priority =
        bundled_engine(ConflictResolutionStrategy::HighestPriority).with_facts(prefs.to_facts());
    let result = priority.infer();
    let lima = result
        .final_recommendations
        .iter()
        .find(|r| r.destination_id == "lima")
        .unwrap();
    assert!((lima.confidence - 0.9).abs() < 1e-6);
}

#[test]
fn refraction_and_first_rule_agree_on_bundled_rules() {
    let prefs = TravelPreferences::new()
        .with_activity("aventura")
        .with_budget("media")
        .with_climate("templado")
        .with_duration("4-7");

    let mut first =
        bundled_engine(ConflictResolutionStrategy::FirstRule).with_facts(prefs.to_facts());
    let mut refraction =
        bundled_engine(ConflictResolutionStrategy::Refraction).with_facts(prefs.to_facts());
    let a = first.infer();
    let b = refraction.infer();

    assert_eq!(a.fired_rule_names(), b.fired_rule_names());
    assert_eq!(a.final_recommendations, b.final_recommendations);
}

#[test]
fn seeded_random_strategy_is_reproducible() {
    let prefs = TravelPreferences::new()
        .with_activity("naturaleza")
        .with_budget("baja")
        .with_duration("1-3");
    let config = EngineConfig {
        strategy: ConflictResolutionStrategy::Random,
        random_seed: Some(1234),
        ..Default::default()
    };
    let kb = KnowledgeBase::bundled().unwrap();

    let run = || {
        kb.engine(config.clone())
            .with_facts(prefs.to_facts())
            .infer()
            .fired_rules
            .into_iter()
            .map(|r| r.id)
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn reset_makes_a_reused_engine_behave_like_new() {
    let prefs = TravelPreferences::new()
        .with_activity("relax")
        .with_climate("calido")
        .with_duration("1-3");
    let mut engine =
        bundled_engine(ConflictResolutionStrategy::HighestPriority).with_facts(prefs.to_facts());

    let first = engine.infer();
    assert!(!first.fired_rules.is_empty());

    engine.reset(prefs.to_facts());
    assert!(engine.rules().iter().all(|r| !r.executed));

    let second = engine.infer();
    assert_eq!(first.fired_rule_names(), second.fired_rule_names());
    assert_eq!(first.final_recommendations, second.final_recommendations);
}

#[test]
fn unproducible_antecedent_is_not_an_error() {
    let mut engine = ForwardChainingEngine::new(EngineConfig::default())
        .with_rules([Rule::new("orphan", "destino_recomendado_atlantis")
            .with_antecedents(["never_asserted"])])
        .with_facts([Fact::asserted("something_else")]);
    let result = engine.infer();

    assert_eq!(result.halt, HaltReason::NoMoreRules);
    assert!(result.fired_rules.is_empty());
    assert!(result.final_recommendations.is_empty());
}

#[test]
fn advisor_enriches_with_catalog() {
    let advisor = TravelAdvisor::bundled().unwrap();
    let advice = advisor
        .recommend(
            &TravelPreferences::new()
                .with_activity("naturaleza")
                .with_climate("calido")
                .with_duration("4-7"),
        )
        .unwrap();

    let top = &advice.recommendations[0];
    assert_eq!(top.recommendation.destination_id, "iquitos-amazonas");
    assert_eq!(top.destination.region, "Loreto");
    assert_eq!(advice.input_facts.len(), 3);
    assert!(advice.execution_trace.iter().any(|l| l.starts_with("Fired rule:")));

    let json = serde_json::to_value(&advice).unwrap();
    assert_eq!(json["recommendations"][0]["destination_id"], "iquitos-amazonas");
    assert_eq!(json["halt"]["reason"], "no_more_rules");
}

#[test]
fn catalog_lookup_for_unknown_destination() {
    let catalog = DestinationCatalog::bundled().unwrap();
    let placeholder = catalog.lookup("el-dorado");
    assert_eq!(placeholder.id, "el-dorado");
    assert_eq!(placeholder.region, "Desconocido");
}
