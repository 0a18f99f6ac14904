//! Ontology vocabulary and its consolidation.
//!
//! Each partition carries a local fragment of entity and relationship
//! types. Fragments are folded into one master ontology per kind, which
//! keeps provenance (contributing partitions, example files) for every
//! type.
//!
//! ## Modules
//!
//! - `element` - partition-local [`EntityElement`] / [`RelationshipElement`]
//! - `master` - [`MasterOntology`] and its provenance-carrying elements
//! - `merge` - [`OntologyMerger`], the idempotent fold
//! - `similarity` - [`SimilarityMatcher`], reuse-vs-create guidance
//! - `version` - [`Version`], bumped once per merge

mod element;
mod master;
mod merge;
mod similarity;
mod store;
mod version;

pub use element::{
    next_element_id, ElementKey, EntityElement, OntologyElement, OntologyKind,
    RelationshipElement,
};
pub use master::{MasterElement, MasterOntology};
pub use merge::{MergeStats, OntologyMerger};
pub use similarity::{
    similarity_ratio, Recommendation, SimilarMatch, SimilarityMatcher, SimilarityReport,
};
pub use store::OntologyStore;
pub use version::Version;

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur while handling ontologies.
#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("Unknown ontology kind '{0}': expected 'entity' or 'relationship'")]
    UnknownKind(String),

    #[error("Invalid version '{0}': expected MAJOR.MINOR.PATCH")]
    InvalidVersion(String),

    #[error("Ontology kind mismatch: expected {expected}, found {actual}")]
    KindMismatch {
        expected: OntologyKind,
        actual: OntologyKind,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
