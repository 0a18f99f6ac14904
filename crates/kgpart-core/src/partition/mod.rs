//! Partitions: disjoint groups of data-source files.
//!
//! A partition document lists the files it claims (literal paths or
//! directory references ending in `/`) together with the entity and
//! relationship types observed in those files.

mod model;
mod store;

pub use model::{
    document_id, Partition, PartitionSummary, PathRef, StructuralError, REQUIRED_FIELDS,
};
pub use store::{DocumentBody, PartitionDocument, PartitionStore};

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur while authoring partitions.
#[derive(Debug, Error)]
pub enum PartitionError {
    #[error("Partition not found: {0}")]
    NotFound(u32),

    #[error("Partition document already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
