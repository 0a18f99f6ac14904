use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::PARTITION_FILE_PREFIX;
use crate::ontology::{next_element_id, EntityElement, OntologyElement, RelationshipElement};

/// Fields every partition document must carry.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "partition_id",
    "title",
    "description",
    "paths",
    "entity_ontology",
    "relationship_ontology",
];

/// One entry of a partition's path list, relative to the data-source root.
///
/// A trailing `/` marks a directory reference covering every file below it;
/// anything else names a single file. The marker is parsed once here and
/// written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PathRef {
    /// Directory path without the trailing separator; empty for the root.
    Directory(String),
    File(String),
}

impl PathRef {
    pub fn parse(raw: &str) -> Self {
        if raw.ends_with('/') {
            PathRef::Directory(raw.trim_end_matches('/').to_string())
        } else {
            PathRef::File(raw.to_string())
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, PathRef::Directory(_))
    }
}

impl From<String> for PathRef {
    fn from(raw: String) -> Self {
        PathRef::parse(&raw)
    }
}

impl From<PathRef> for String {
    fn from(path: PathRef) -> Self {
        path.to_string()
    }
}

impl fmt::Display for PathRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathRef::Directory(dir) => write!(f, "{}/", dir),
            PathRef::File(file) => f.write_str(file),
        }
    }
}

/// A problem with the shape of a partition document.
///
/// These are reported back to whoever authored the partition; they are
/// data, not failures of the validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuralError {
    #[error("{document}: Malformed JSON: {message}")]
    Malformed { document: String, message: String },

    #[error("{document}: Missing required fields: {}", fields.join(", "))]
    MissingFields {
        document: String,
        fields: Vec<String>,
    },

    #[error("{document}: Invalid partition: {message}")]
    Invalid { document: String, message: String },

    #[error("{document}: Duplicate partition_id {partition_id} (already used by {first})")]
    DuplicateId {
        document: String,
        partition_id: u32,
        first: String,
    },
}

/// A named, disjoint group of data-source files with its local ontology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub partition_id: u32,
    /// Short label.
    pub title: String,
    /// How the files in this partition relate to each other.
    pub description: String,
    pub paths: Vec<PathRef>,
    pub entity_ontology: Vec<EntityElement>,
    pub relationship_ontology: Vec<RelationshipElement>,
}

impl Partition {
    /// Creates a partition with empty ontologies.
    pub fn new(
        partition_id: u32,
        title: impl Into<String>,
        description: impl Into<String>,
        paths: Vec<PathRef>,
    ) -> Self {
        Self {
            partition_id,
            title: title.into(),
            description: description.into(),
            paths,
            entity_ontology: Vec::new(),
            relationship_ontology: Vec::new(),
        }
    }

    /// Parses a partition document, checking required fields first so the
    /// author sees every missing field at once.
    pub fn from_document(document: &str, value: &Value) -> Result<Self, StructuralError> {
        let object = value.as_object().ok_or_else(|| StructuralError::Invalid {
            document: document.to_string(),
            message: "expected a JSON object".to_string(),
        })?;

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|f| !object.contains_key(**f))
            .map(|f| f.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(StructuralError::MissingFields {
                document: document.to_string(),
                fields: missing,
            });
        }

        let partition: Partition =
            serde_json::from_value(value.clone()).map_err(|e| StructuralError::Invalid {
                document: document.to_string(),
                message: e.to_string(),
            })?;

        if partition.partition_id == 0 {
            return Err(StructuralError::Invalid {
                document: document.to_string(),
                message: "partition_id must be a positive integer".to_string(),
            });
        }

        Ok(partition)
    }

    /// Canonical document id, e.g. `file_subset_03`.
    pub fn document_id(&self) -> String {
        document_id(self.partition_id)
    }

    /// Adds an entity type unless one with the same type already exists.
    ///
    /// Returns the stored element and whether it was newly created.
    pub fn add_entity(
        &mut self,
        type_name: &str,
        description: &str,
        example_file: &str,
        example_in_file: &str,
    ) -> (EntityElement, bool) {
        let candidate = EntityElement {
            entity_id: next_element_id(self.entity_ontology.iter().map(|e| e.element_id())),
            type_name: type_name.to_string(),
            example_file: example_file.to_string(),
            description: description.to_string(),
            example_in_file: example_in_file.to_string(),
        };

        let key = candidate.key();
        if let Some(existing) = self.entity_ontology.iter().find(|e| e.key() == key) {
            return (existing.clone(), false);
        }

        self.entity_ontology.push(candidate.clone());
        (candidate, true)
    }

    /// Adds a relationship type unless the same (type, source, target)
    /// triple already exists.
    ///
    /// Returns the stored element and whether it was newly created.
    pub fn add_relationship(
        &mut self,
        type_name: &str,
        source_entity_type: &str,
        target_entity_type: &str,
        description: &str,
        example_file: &str,
        example_in_file: &str,
    ) -> (RelationshipElement, bool) {
        let candidate = RelationshipElement {
            relationship_id: next_element_id(
                self.relationship_ontology.iter().map(|r| r.element_id()),
            ),
            type_name: type_name.to_string(),
            source_entity_type: source_entity_type.to_string(),
            target_entity_type: target_entity_type.to_string(),
            description: description.to_string(),
            example_file: example_file.to_string(),
            example_in_file: example_in_file.to_string(),
        };

        let key = candidate.key();
        if let Some(existing) = self.relationship_ontology.iter().find(|r| r.key() == key) {
            return (existing.clone(), false);
        }

        self.relationship_ontology.push(candidate.clone());
        (candidate, true)
    }

    /// Converts the partition to a summary (for listings).
    pub fn to_summary(&self) -> PartitionSummary {
        PartitionSummary {
            partition_id: self.partition_id,
            title: self.title.clone(),
            path_count: self.paths.len(),
            entity_count: self.entity_ontology.len(),
            relationship_count: self.relationship_ontology.len(),
        }
    }
}

/// Document id of a partition: `file_subset_` plus the zero-padded id.
pub fn document_id(partition_id: u32) -> String {
    format!("{}{:02}", PARTITION_FILE_PREFIX, partition_id)
}

/// A lightweight summary of a partition for listings.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionSummary {
    pub partition_id: u32,
    pub title: String,
    pub path_count: usize,
    pub entity_count: usize,
    pub relationship_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_ref_parsing() {
        assert_eq!(PathRef::parse("docs/"), PathRef::Directory("docs".to_string()));
        assert_eq!(PathRef::parse("/"), PathRef::Directory(String::new()));
        assert_eq!(PathRef::parse("docs/a.md"), PathRef::File("docs/a.md".to_string()));
        assert_eq!(PathRef::parse("docs/").to_string(), "docs/");
    }

    #[test]
    fn test_path_ref_json_round_trips_marker() {
        let paths: Vec<PathRef> = serde_json::from_value(json!(["a.md", "b/"])).unwrap();
        assert!(!paths[0].is_directory());
        assert!(paths[1].is_directory());
        assert_eq!(serde_json::to_value(&paths).unwrap(), json!(["a.md", "b/"]));
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let value = json!({"partition_id": 1, "title": "t", "paths": []});
        let err = Partition::from_document("p.json", &value).unwrap_err();

        assert_eq!(
            err,
            StructuralError::MissingFields {
                document: "p.json".to_string(),
                fields: vec![
                    "description".to_string(),
                    "entity_ontology".to_string(),
                    "relationship_ontology".to_string(),
                ],
            }
        );
    }

    #[test]
    fn test_wrong_field_type_is_invalid() {
        let value = json!({
            "partition_id": 1, "title": "t", "description": "d",
            "paths": "a.md", "entity_ontology": [], "relationship_ontology": []
        });
        assert!(matches!(
            Partition::from_document("p.json", &value),
            Err(StructuralError::Invalid { .. })
        ));
    }

    #[test]
    fn test_zero_partition_id_is_invalid() {
        let value = json!({
            "partition_id": 0, "title": "t", "description": "d",
            "paths": [], "entity_ontology": [], "relationship_ontology": []
        });
        assert!(Partition::from_document("p.json", &value).is_err());
    }

    #[test]
    fn test_add_entity_dedupes_case_insensitively() {
        let mut partition = Partition::new(1, "t", "d", Vec::new());

        let (first, created) = partition.add_entity("Operator", "An operator", "a.md", "x");
        assert!(created);
        assert_eq!(first.entity_id, "1");

        let (second, created) = partition.add_entity("OPERATOR", "Other", "b.md", "y");
        assert!(!created);
        assert_eq!(second, first);

        let (third, _) = partition.add_entity("Route", "A route", "c.md", "z");
        assert_eq!(third.entity_id, "2");
        assert_eq!(partition.entity_ontology.len(), 2);
    }

    #[test]
    fn test_add_relationship_keys_on_triple() {
        let mut partition = Partition::new(1, "t", "d", Vec::new());

        partition.add_relationship("MANAGES", "Operator", "Pod", "", "", "");
        let (_, created) = partition.add_relationship("manages", "operator", "pod", "", "", "");
        assert!(!created);
        let (rel, created) = partition.add_relationship("MANAGES", "Operator", "Node", "", "", "");
        assert!(created);
        assert_eq!(rel.relationship_id, "2");
    }

    #[test]
    fn test_document_id_is_zero_padded() {
        assert_eq!(document_id(3), "file_subset_03");
        assert_eq!(document_id(120), "file_subset_120");
    }
}
