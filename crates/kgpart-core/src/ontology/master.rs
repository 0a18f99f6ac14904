use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::element::{ElementKey, OntologyElement, OntologyKind};
use super::version::Version;

/// The deduplicated union of one ontology kind across all partitions of a
/// data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterOntology {
    pub ontology_type: OntologyKind,
    pub version: Version,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub elements: Vec<MasterElement>,
}

impl MasterOntology {
    /// Creates an empty master ontology.
    pub fn new(ontology_type: OntologyKind, version: Version) -> Self {
        Self {
            ontology_type,
            version,
            last_updated: Utc::now(),
            elements: Vec::new(),
        }
    }

    /// Finds the element with the given uniqueness key.
    pub fn find(&self, key: &ElementKey) -> Option<&MasterElement> {
        self.elements.iter().find(|e| &e.key() == key)
    }

    pub fn find_mut(&mut self, key: &ElementKey) -> Option<&mut MasterElement> {
        self.elements.iter_mut().find(|e| &e.key() == key)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Finds the first element whose type matches case-insensitively, ignoring
/// relationship endpoints.
pub fn find_by_type<'a>(
    elements: &'a [MasterElement],
    type_name: &str,
) -> Option<&'a MasterElement> {
    let wanted = type_name.to_lowercase();
    elements
        .iter()
        .find(|e| e.type_name.to_lowercase() == wanted)
}

/// One consolidated type in a master ontology, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterElement {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_entity_type: Option<String>,
    /// Partitions that contributed this type. Never shrinks, never repeats.
    #[serde(default)]
    pub source_partitions: Vec<u32>,
    /// Example files accumulated across merges, deduplicated.
    #[serde(default)]
    pub all_example_files: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl MasterElement {
    /// Seeds a master element from the first partition that reports it.
    pub fn from_element<E: OntologyElement>(partition_id: u32, element: &E) -> Self {
        let (source_entity_type, target_entity_type) = match element.endpoints() {
            Some((source, target)) => (Some(source.to_string()), Some(target.to_string())),
            None => (None, None),
        };

        let all_example_files = if element.example_file().is_empty() {
            Vec::new()
        } else {
            vec![element.example_file().to_string()]
        };

        Self {
            type_name: element.type_name().to_string(),
            source_entity_type,
            target_entity_type,
            source_partitions: vec![partition_id],
            all_example_files,
            description: element.description().to_string(),
        }
    }

    /// Uniqueness key, matching [`OntologyElement::key`] of the elements it
    /// was merged from.
    pub fn key(&self) -> ElementKey {
        match (&self.source_entity_type, &self.target_entity_type) {
            (Some(source), Some(target)) => {
                ElementKey::relationship(&self.type_name, source, target)
            }
            _ => ElementKey::entity(&self.type_name),
        }
    }

    /// Records a contributing partition. Returns true if it was new.
    pub fn add_source_partition(&mut self, partition_id: u32) -> bool {
        if self.source_partitions.contains(&partition_id) {
            return false;
        }
        self.source_partitions.push(partition_id);
        true
    }

    /// Records an example file. Returns true if it was new.
    pub fn add_example_file(&mut self, file: &str) -> bool {
        if file.is_empty() || self.all_example_files.iter().any(|f| f == file) {
            return false;
        }
        self.all_example_files.push(file.to_string());
        true
    }

    /// Extends the description unless the text is already part of it.
    /// Returns true if the description changed.
    pub fn extend_description(&mut self, text: &str, separator: &str) -> bool {
        if text.is_empty() || self.description.contains(text) {
            return false;
        }
        if self.description.is_empty() {
            self.description = text.to_string();
        } else {
            self.description = format!("{}{}{}", self.description, separator, text);
        }
        true
    }
}
