use kgpart_core::ontology::{EntityElement, OntologyError, RelationshipElement};
use kgpart_core::{OntologyKind, OntologyMerger, Version};

fn entity(id: &str, type_name: &str, description: &str, example_file: &str) -> EntityElement {
    EntityElement {
        entity_id: id.to_string(),
        type_name: type_name.to_string(),
        example_file: example_file.to_string(),
        description: description.to_string(),
        example_in_file: String::new(),
    }
}

fn relationship(type_name: &str, source: &str, target: &str) -> RelationshipElement {
    RelationshipElement {
        relationship_id: "1".to_string(),
        type_name: type_name.to_string(),
        source_entity_type: source.to_string(),
        target_entity_type: target.to_string(),
        description: format!("{} {} {}", source, type_name, target),
        example_file: "a.md".to_string(),
        example_in_file: String::new(),
    }
}

#[test]
fn test_first_merge_creates_master() {
    let merger = OntologyMerger::default();
    let elements = vec![
        entity("1", "Operator", "Manages apps", "a.md"),
        entity("2", "Route", "Exposes services", "b.md"),
    ];

    let (master, stats) = merger.merge(1, &elements, None).unwrap();

    assert_eq!(master.ontology_type, OntologyKind::Entity);
    assert_eq!(master.version, Version::new(0, 1, 1));
    assert_eq!(master.len(), 2);
    assert_eq!(stats.added, 2);
    assert_eq!(stats.updated, 0);
    assert!(stats.changed);
    assert_eq!(master.elements[0].source_partitions, vec![1]);
    assert_eq!(master.elements[0].all_example_files, vec!["a.md".to_string()]);
}

#[test]
fn test_remerge_is_idempotent_but_bumps_version() {
    let merger = OntologyMerger::default();
    let elements = vec![entity("1", "Operator", "Manages apps", "a.md")];

    let (first, _) = merger.merge(1, &elements, None).unwrap();
    let (second, stats) = merger.merge(1, &elements, Some(first.clone())).unwrap();

    assert!(!stats.changed);
    assert_eq!(stats.updated, 1);
    assert_eq!(second.elements, first.elements);
    assert_eq!(second.version, first.version.bump_patch());
}

#[test]
fn test_merge_accumulates_provenance() {
    let merger = OntologyMerger::default();

    let (master, _) = merger
        .merge(1, &[entity("1", "Operator", "Manages apps", "a.md")], None)
        .unwrap();
    let (master, stats) = merger
        .merge(
            2,
            &[entity("4", "operator", "Runs reconcile loops", "c.md")],
            Some(master),
        )
        .unwrap();

    assert!(stats.changed);
    assert_eq!(master.len(), 1);
    let operator = &master.elements[0];
    assert_eq!(operator.type_name, "Operator");
    assert_eq!(operator.source_partitions, vec![1, 2]);
    assert_eq!(
        operator.all_example_files,
        vec!["a.md".to_string(), "c.md".to_string()]
    );
    assert_eq!(operator.description, "Manages apps | Runs reconcile loops");
}

#[test]
fn test_description_substring_not_repeated() {
    let merger = OntologyMerger::default();

    let (master, _) = merger
        .merge(1, &[entity("1", "Operator", "Manages apps on a cluster", "a.md")], None)
        .unwrap();
    let (master, _) = merger
        .merge(2, &[entity("1", "Operator", "Manages apps", "a.md")], Some(master))
        .unwrap();

    assert_eq!(master.elements[0].description, "Manages apps on a cluster");
    assert_eq!(master.elements[0].all_example_files.len(), 1);
}

#[test]
fn test_empty_description_is_filled() {
    let merger = OntologyMerger::default();

    let (master, _) = merger
        .merge(1, &[entity("1", "Operator", "", "")], None)
        .unwrap();
    assert!(master.elements[0].all_example_files.is_empty());

    let (master, _) = merger
        .merge(2, &[entity("1", "Operator", "Manages apps", "")], Some(master))
        .unwrap();
    assert_eq!(master.elements[0].description, "Manages apps");
}

#[test]
fn test_relationships_keyed_on_triple() {
    let merger = OntologyMerger::default();
    let elements = vec![
        relationship("MANAGES", "Operator", "Pod"),
        relationship("MANAGES", "Operator", "Node"),
        relationship("manages", "operator", "pod"),
    ];

    let (master, stats) = merger.merge(1, &elements, None).unwrap();

    assert_eq!(master.ontology_type, OntologyKind::Relationship);
    assert_eq!(master.len(), 2);
    assert_eq!(stats.added, 2);
    assert_eq!(stats.updated, 1);
    assert_eq!(
        master.elements[0].source_entity_type.as_deref(),
        Some("Operator")
    );
}

#[test]
fn test_merge_into_wrong_kind_fails() {
    let merger = OntologyMerger::default();
    let (relationships, _) = merger
        .merge(1, &[relationship("MANAGES", "Operator", "Pod")], None)
        .unwrap();

    let result = merger.merge(1, &[entity("1", "Operator", "", "")], Some(relationships));
    assert!(matches!(result, Err(OntologyError::KindMismatch { .. })));
}

#[test]
fn test_version_increases_once_per_merge() {
    let merger = OntologyMerger::default();
    let elements = vec![entity("1", "Operator", "Manages apps", "a.md")];

    let mut master = None;
    for _ in 0..3 {
        let (merged, _) = merger.merge(1, &elements, master).unwrap();
        master = Some(merged);
    }

    assert_eq!(master.unwrap().version, Version::new(0, 1, 3));
}
