use tracing::{debug, info, warn};

use super::model::{document_id, Partition, PartitionSummary, PathRef, StructuralError};
use super::PartitionError;
use crate::config::PARTITION_FILE_PREFIX;
use crate::ontology::{EntityElement, RelationshipElement};
use crate::storage::{DocumentStore, StorageError};

/// A partition document as read from storage, before schema checks.
#[derive(Debug, Clone)]
pub struct PartitionDocument {
    /// Location used when reporting problems with this document.
    pub source: String,
    pub body: DocumentBody,
}

#[derive(Debug, Clone)]
pub enum DocumentBody {
    Json(serde_json::Value),
    /// The document could not be parsed; holds the parser message.
    Malformed(String),
}

impl PartitionDocument {
    pub fn new(source: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            source: source.into(),
            body: DocumentBody::Json(value),
        }
    }

    pub fn malformed(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            body: DocumentBody::Malformed(message.into()),
        }
    }

    /// Parses the document into a partition.
    pub fn parse(&self) -> Result<Partition, StructuralError> {
        match &self.body {
            DocumentBody::Json(value) => Partition::from_document(&self.source, value),
            DocumentBody::Malformed(message) => Err(StructuralError::Malformed {
                document: self.source.clone(),
                message: message.clone(),
            }),
        }
    }
}

/// Persists the partition documents of one data source.
///
/// ```text
/// partitions/{data-source}/
///   file_subset_01.json
///   file_subset_02.json
///   ...
/// ```
pub struct PartitionStore<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> PartitionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reads every stored document without judging its shape.
    ///
    /// Unparsable documents are returned as [`DocumentBody::Malformed`] so
    /// validation can report them alongside everything else.
    pub fn documents(&self) -> Result<Vec<PartitionDocument>, StorageError> {
        let mut documents = Vec::new();

        for id in self.store.ids()? {
            let source = self.store.locate(&id);
            match self.store.load(&id) {
                Ok(Some(value)) => documents.push(PartitionDocument::new(source, value)),
                Ok(None) => {}
                Err(StorageError::MalformedDocument { source: err, .. }) => {
                    debug!(document = %source, "malformed partition document");
                    documents.push(PartitionDocument::malformed(source, err.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(documents)
    }

    /// Loads all well-formed partitions, ordered by partition id.
    ///
    /// Documents that fail schema checks are skipped with a warning.
    pub fn list(&self) -> Result<Vec<Partition>, StorageError> {
        let mut partitions: Vec<Partition> = self
            .documents()?
            .iter()
            .filter_map(|doc| match doc.parse() {
                Ok(partition) => Some(partition),
                Err(e) => {
                    warn!(error = %e, "skipping partition document");
                    None
                }
            })
            .collect();
        partitions.sort_by_key(|p| p.partition_id);
        Ok(partitions)
    }

    /// Summaries of all well-formed partitions.
    pub fn summaries(&self) -> Result<Vec<PartitionSummary>, StorageError> {
        Ok(self.list()?.iter().map(Partition::to_summary).collect())
    }

    /// Next free partition id: one past the highest id in use.
    pub fn next_id(&self) -> Result<u32, PartitionError> {
        let max = self
            .list()?
            .iter()
            .map(|p| p.partition_id)
            .max()
            .unwrap_or(0);
        max.checked_add(1).ok_or_else(|| {
            PartitionError::InvalidInput(format!("no partition id left after {}", max))
        })
    }

    /// Loads a partition by id.
    pub fn get(&self, partition_id: u32) -> Result<Partition, PartitionError> {
        self.find(partition_id).map(|(_, partition)| partition)
    }

    /// Saves a partition under its canonical document id.
    pub fn save(&self, partition: &Partition) -> Result<(), PartitionError> {
        self.store.save_as(&partition.document_id(), partition)?;
        Ok(())
    }

    /// Creates a new partition with the next free id and empty ontologies.
    pub fn create(
        &self,
        title: &str,
        description: &str,
        paths: &[String],
    ) -> Result<Partition, PartitionError> {
        if title.trim().is_empty() {
            return Err(PartitionError::InvalidInput("title must not be empty".to_string()));
        }
        if description.trim().is_empty() {
            return Err(PartitionError::InvalidInput(
                "description must not be empty".to_string(),
            ));
        }
        if paths.is_empty() {
            return Err(PartitionError::InvalidInput(
                "at least one path is required".to_string(),
            ));
        }
        if paths.iter().any(|p| p.trim().is_empty()) {
            return Err(PartitionError::InvalidInput("paths must not be empty".to_string()));
        }

        let partition_id = self.next_id()?;
        let id = document_id(partition_id);
        if self.store.ids()?.contains(&id) {
            return Err(PartitionError::AlreadyExists(self.store.locate(&id)));
        }

        let partition = Partition::new(
            partition_id,
            title,
            description,
            paths.iter().map(|p| PathRef::parse(p)).collect(),
        );
        self.save(&partition)?;

        info!(
            partition_id,
            paths = partition.paths.len(),
            document = %self.store.locate(&id),
            "created partition"
        );
        Ok(partition)
    }

    /// Adds an entity type to a partition's local ontology.
    ///
    /// An existing entity with the same type is returned unchanged and
    /// nothing is written.
    pub fn add_entity(
        &self,
        partition_id: u32,
        type_name: &str,
        description: &str,
        example_file: &str,
        example_in_file: &str,
    ) -> Result<(EntityElement, bool), PartitionError> {
        if type_name.trim().is_empty() {
            return Err(PartitionError::InvalidInput("entity type must not be empty".to_string()));
        }

        let (id, mut partition) = self.find(partition_id)?;
        let (entity, created) =
            partition.add_entity(type_name, description, example_file, example_in_file);

        if created {
            self.store.save_as(&id, &partition)?;
            debug!(partition_id, type_name, entity_id = %entity.entity_id, "added entity");
        }
        Ok((entity, created))
    }

    /// Adds a relationship type to a partition's local ontology.
    ///
    /// An existing relationship with the same (type, source, target) triple
    /// is returned unchanged and nothing is written.
    #[allow(clippy::too_many_arguments)]
    pub fn add_relationship(
        &self,
        partition_id: u32,
        type_name: &str,
        source_entity_type: &str,
        target_entity_type: &str,
        description: &str,
        example_file: &str,
        example_in_file: &str,
    ) -> Result<(RelationshipElement, bool), PartitionError> {
        for (field, value) in [
            ("relationship type", type_name),
            ("source entity type", source_entity_type),
            ("target entity type", target_entity_type),
        ] {
            if value.trim().is_empty() {
                return Err(PartitionError::InvalidInput(format!("{} must not be empty", field)));
            }
        }

        let (id, mut partition) = self.find(partition_id)?;
        let (relationship, created) = partition.add_relationship(
            type_name,
            source_entity_type,
            target_entity_type,
            description,
            example_file,
            example_in_file,
        );

        if created {
            self.store.save_as(&id, &partition)?;
            debug!(
                partition_id,
                type_name,
                relationship_id = %relationship.relationship_id,
                "added relationship"
            );
        }
        Ok((relationship, created))
    }

    /// Deletes every partition document. Returns how many were removed.
    pub fn reset(&self) -> Result<usize, StorageError> {
        let ids: Vec<String> = self
            .store
            .ids()?
            .into_iter()
            .filter(|id| id.starts_with(PARTITION_FILE_PREFIX))
            .collect();
        for id in &ids {
            self.store.remove(id)?;
        }
        Ok(ids.len())
    }

    /// Finds a partition and the document id it is stored under.
    ///
    /// The canonical id is tried first; partitions saved under another name
    /// are found by scanning.
    fn find(&self, partition_id: u32) -> Result<(String, Partition), PartitionError> {
        let canonical = document_id(partition_id);
        if let Some(partition) = self.load_valid(&canonical)? {
            if partition.partition_id == partition_id {
                return Ok((canonical, partition));
            }
        }

        for id in self.store.ids()? {
            if id == canonical {
                continue;
            }
            if let Ok(Some(partition)) = self.load_valid(&id) {
                if partition.partition_id == partition_id {
                    return Ok((id, partition));
                }
            }
        }

        Err(PartitionError::NotFound(partition_id))
    }

    fn load_valid(&self, id: &str) -> Result<Option<Partition>, PartitionError> {
        let value = match self.store.load(id) {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(None),
            Err(StorageError::MalformedDocument { source, .. }) => {
                return Err(PartitionError::Structural(StructuralError::Malformed {
                    document: self.store.locate(id),
                    message: source.to_string(),
                }))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Some(Partition::from_document(&self.store.locate(id), &value)?))
    }
}
