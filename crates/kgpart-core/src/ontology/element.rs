use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::OntologyError;
use crate::config::{MASTER_ENTITY_ONTOLOGY, MASTER_RELATIONSHIP_ONTOLOGY};

/// Which half of the vocabulary an ontology describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OntologyKind {
    /// Entity types (nodes).
    Entity,
    /// Relationship types (edges between entity types).
    Relationship,
}

impl OntologyKind {
    /// Both kinds, entity first.
    pub const ALL: [OntologyKind; 2] = [OntologyKind::Entity, OntologyKind::Relationship];

    pub fn as_str(&self) -> &'static str {
        match self {
            OntologyKind::Entity => "entity",
            OntologyKind::Relationship => "relationship",
        }
    }

    /// Document id of the master ontology of this kind.
    pub fn master_document_id(&self) -> &'static str {
        match self {
            OntologyKind::Entity => MASTER_ENTITY_ONTOLOGY,
            OntologyKind::Relationship => MASTER_RELATIONSHIP_ONTOLOGY,
        }
    }
}

impl fmt::Display for OntologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OntologyKind {
    type Err = OntologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "entity" => Ok(OntologyKind::Entity),
            "relationship" => Ok(OntologyKind::Relationship),
            _ => Err(OntologyError::UnknownKind(s.to_string())),
        }
    }
}

/// Case-insensitive uniqueness key of an ontology element.
///
/// Entities are keyed on their type alone; relationships on the
/// `(type, source_entity_type, target_entity_type)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementKey {
    type_name: String,
    endpoints: Option<(String, String)>,
}

impl ElementKey {
    pub fn entity(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_lowercase(),
            endpoints: None,
        }
    }

    pub fn relationship(type_name: &str, source: &str, target: &str) -> Self {
        Self {
            type_name: type_name.to_lowercase(),
            endpoints: Some((source.to_lowercase(), target.to_lowercase())),
        }
    }
}

/// Common interface of partition-local ontology elements.
pub trait OntologyElement {
    /// The ontology kind this element belongs to.
    fn kind() -> OntologyKind
    where
        Self: Sized;

    /// Sequential id within the owning partition.
    fn element_id(&self) -> &str;

    /// Canonical type label.
    fn type_name(&self) -> &str;

    fn description(&self) -> &str;

    /// File the element was observed in.
    fn example_file(&self) -> &str;

    /// `(source, target)` entity types, for relationships.
    fn endpoints(&self) -> Option<(&str, &str)> {
        None
    }

    /// Uniqueness key within an ontology.
    fn key(&self) -> ElementKey {
        match self.endpoints() {
            Some((source, target)) => ElementKey::relationship(self.type_name(), source, target),
            None => ElementKey::entity(self.type_name()),
        }
    }
}

/// An entity type discovered in a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityElement {
    #[serde(default)]
    pub entity_id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub example_file: String,
    #[serde(default)]
    pub description: String,
    /// Excerpt showing how the entity appears in `example_file`.
    #[serde(default)]
    pub example_in_file: String,
}

impl OntologyElement for EntityElement {
    fn kind() -> OntologyKind {
        OntologyKind::Entity
    }

    fn element_id(&self) -> &str {
        &self.entity_id
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn example_file(&self) -> &str {
        &self.example_file
    }
}

/// A relationship type between two entity types discovered in a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipElement {
    #[serde(default)]
    pub relationship_id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub source_entity_type: String,
    pub target_entity_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub example_file: String,
    /// Excerpt showing the relationship, e.g. `KCS 5682881 -> DOCUMENTS -> OCP 4`.
    #[serde(default)]
    pub example_in_file: String,
}

impl OntologyElement for RelationshipElement {
    fn kind() -> OntologyKind {
        OntologyKind::Relationship
    }

    fn element_id(&self) -> &str {
        &self.relationship_id
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn example_file(&self) -> &str {
        &self.example_file
    }

    fn endpoints(&self) -> Option<(&str, &str)> {
        Some((&self.source_entity_type, &self.target_entity_type))
    }
}

/// Returns the id following the highest numeric id in `ids`, starting at "1".
///
/// Non-numeric ids are ignored. Ids are compared and incremented as decimal
/// strings, so there is no upper bound.
pub fn next_element_id<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    let max = ids
        .into_iter()
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
        .map(|id| match id.trim_start_matches('0') {
            "" => "0",
            digits => digits,
        })
        .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
        .unwrap_or("0");
    increment_decimal(max)
}

fn increment_decimal(digits: &str) -> String {
    let mut out: Vec<u8> = digits.bytes().collect();
    let mut carry = true;
    for digit in out.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            carry = false;
            break;
        }
    }
    if carry {
        out.insert(0, b'1');
    }
    out.into_iter().map(char::from).collect()
}
