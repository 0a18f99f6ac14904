use kgpart_core::config::SimilarityConfig;
use kgpart_core::ontology::similarity_ratio;
use kgpart_core::{MasterElement, Recommendation, SimilarityMatcher};

fn element(type_name: &str, description: &str) -> MasterElement {
    MasterElement {
        type_name: type_name.to_string(),
        source_entity_type: None,
        target_entity_type: None,
        source_partitions: vec![1],
        all_example_files: vec!["a.md".to_string()],
        description: description.to_string(),
    }
}

fn master() -> Vec<MasterElement> {
    vec![
        element("Operator", "A Kubernetes operator managing an application"),
        element("ServiceAccount", "Identity for processes running in a pod"),
        element("Route", "Exposes a service at a host name"),
    ]
}

#[test]
fn test_exact_match_ignores_case() {
    let matcher = SimilarityMatcher::default();

    let report = matcher.check("OPERATOR", "anything", &master());

    assert_eq!(report.recommendation, Recommendation::UseExisting);
    assert!(report.is_exact());
    assert_eq!(report.exact_match.unwrap().type_name, "Operator");
    assert!(report.similar_elements.is_empty());
}

#[test]
fn test_near_identical_type_recommends_reuse() {
    let matcher = SimilarityMatcher::default();

    let report = matcher.check(
        "Operators",
        "A Kubernetes operator managing an application",
        &master(),
    );

    assert_eq!(report.recommendation, Recommendation::UseExisting);
    assert!(!report.is_exact());
    let best = report.best().unwrap();
    assert_eq!(best.type_name, "Operator");
    assert!(best.similarity_score > 0.85);
}

#[test]
fn test_moderate_similarity_asks_for_review() {
    let matcher = SimilarityMatcher::default().with_threshold(0.4);

    // "Service" vs "ServiceAccount": 2*7/21 on the type, no description.
    let report = matcher.check("Service", "", &master());

    assert_eq!(report.recommendation, Recommendation::ReviewSimilar);
    let best = report.best().unwrap();
    assert_eq!(best.type_name, "ServiceAccount");
    assert!((best.type_similarity - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(best.description_similarity, 0.0);
    assert!((best.similarity_score - 0.7 * 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_unrelated_type_creates_new() {
    let matcher = SimilarityMatcher::default();

    let report = matcher.check("Zebra", "A striped animal", &master());

    assert_eq!(report.recommendation, Recommendation::CreateNew);
    assert!(report.similar_elements.is_empty());
}

#[test]
fn test_empty_master_creates_new() {
    let report = SimilarityMatcher::default().check("Operator", "", &[]);
    assert_eq!(report.recommendation, Recommendation::CreateNew);
}

#[test]
fn test_threshold_is_inclusive() {
    let elements = vec![element("ServiceAccount", "Identity for processes")];
    let base = SimilarityMatcher::default();
    let score = base
        .score("Service", "Identity", &elements[0])
        .similarity_score;

    let at = base.clone().with_threshold(score).check("Service", "Identity", &elements);
    assert_eq!(at.similar_elements.len(), 1);

    let above = base
        .with_threshold(score + 1e-9)
        .check("Service", "Identity", &elements);
    assert!(above.similar_elements.is_empty());
    assert_eq!(above.recommendation, Recommendation::CreateNew);
}

#[test]
fn test_candidates_sorted_best_first() {
    let matcher = SimilarityMatcher::new(&SimilarityConfig {
        threshold: 0.0,
        ..SimilarityConfig::default()
    });

    let report = matcher.check("Routes", "", &master());

    let scores: Vec<f64> = report
        .similar_elements
        .iter()
        .map(|m| m.similarity_score)
        .collect();
    assert_eq!(scores.len(), 3);
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(report.similar_elements[0].type_name, "Route");
}

#[test]
fn test_ratio_is_symmetric_on_simple_inputs() {
    assert_eq!(similarity_ratio("Pod", "pod"), 1.0);
    assert!((similarity_ratio("Deployment", "Deploy") - 12.0 / 16.0).abs() < 1e-9);
    assert!((similarity_ratio("Deploy", "Deployment") - 12.0 / 16.0).abs() < 1e-9);
}
