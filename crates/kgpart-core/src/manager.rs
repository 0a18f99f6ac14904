use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::{Config, ConfigError};
use crate::coverage::{
    CoverageValidator, FileScanner, PathExpander, ValidationError, ValidationReport,
};
use crate::data_source::{DataSource, DataSourceError};
use crate::ontology::{
    EntityElement, MasterOntology, MergeStats, OntologyError, OntologyKind, OntologyMerger,
    OntologyStore, RelationshipElement, SimilarityMatcher, SimilarityReport, Version,
};
use crate::partition::{Partition, PartitionError, PartitionStore, PartitionSummary};
use crate::storage::{DocumentStore, FileStore, StorageError};

/// Result of merging one partition into one master ontology.
#[derive(Debug, Clone, Serialize)]
pub struct MergeOutcome {
    pub partition_id: u32,
    pub kind: OntologyKind,
    pub stats: MergeStats,
    /// Version of the stored master after the call.
    pub version: Version,
    pub total_elements: usize,
    /// False when an unchanged master was left as is.
    pub saved: bool,
}

/// Drives the partition pipeline for one data source.
///
/// Provides a high-level API over validation, partition authoring,
/// similarity checks and master ontology merges, with persistence through
/// the configured document stores.
pub struct PipelineManager<S: DocumentStore = FileStore> {
    config: Config,
    data_source: DataSource,
    partitions_dir: PathBuf,
    partitions: PartitionStore<S>,
    ontologies: OntologyStore<S>,
    validator: CoverageValidator,
    scanner: FileScanner,
    matcher: SimilarityMatcher,
    merger: OntologyMerger,
    initial_version: Version,
    merge_lock: Mutex<()>,
}

impl PipelineManager<FileStore> {
    /// Opens the workspace at `root`, resolving the data source from the
    /// data directory.
    pub fn open(
        root: impl AsRef<Path>,
        config: Config,
        data_source: Option<&str>,
    ) -> Result<Self, ManagerError> {
        let root = root.as_ref();
        let data_source = DataSource::resolve(&config.workspace.data_path(root), data_source)?;

        let partitions_dir = config.workspace.partitions_path(root, &data_source.name);
        let ontologies_dir = config.workspace.ontologies_path(root, &data_source.name);

        Self::with_stores(
            config,
            data_source,
            partitions_dir.clone(),
            FileStore::new(partitions_dir),
            FileStore::new(ontologies_dir),
        )
    }
}

impl<S: DocumentStore> PipelineManager<S> {
    /// Creates a manager over explicit stores.
    ///
    /// `partitions_dir` only appears in diagnostics.
    pub fn with_stores(
        config: Config,
        data_source: DataSource,
        partitions_dir: PathBuf,
        partitions: S,
        ontologies: S,
    ) -> Result<Self, ManagerError> {
        config.validate()?;

        let scanner = FileScanner::new(&data_source.root_path)
            .with_vcs_dirs(config.workspace.vcs_dirs.clone());
        let validator = CoverageValidator::new(PathExpander::new(scanner.clone()));
        let matcher = SimilarityMatcher::new(&config.similarity);
        let merger = OntologyMerger::new(&config.merge)?;
        let initial_version: Version = config.merge.initial_version.parse()?;

        Ok(Self {
            config,
            data_source,
            partitions_dir,
            partitions: PartitionStore::new(partitions),
            ontologies: OntologyStore::new(ontologies),
            validator,
            scanner,
            matcher,
            merger,
            initial_version,
            merge_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data_source(&self) -> &DataSource {
        &self.data_source
    }

    /// Validates that the partitions cover the data source exactly once.
    pub fn validate(&self) -> Result<ValidationReport, ManagerError> {
        let actual_files = self.scanner.snapshot();
        if actual_files.is_empty() {
            return Err(ValidationError::NoDataFiles(self.data_source.root_path.clone()).into());
        }

        let documents = self.partitions.documents()?;
        if documents.is_empty() {
            return Err(ValidationError::NoPartitions(self.partitions_dir.clone()).into());
        }

        Ok(self
            .validator
            .validate(&self.data_source.name, &documents, &actual_files))
    }

    /// Validates and renders the outcome as agent feedback.
    ///
    /// Configuration problems come back as an invalid result carrying the
    /// error text rather than as an error.
    pub fn feedback(&self) -> (bool, String) {
        match self.validate() {
            Ok(report) => (
                report.is_valid(),
                report.feedback(self.config.validation.feedback_preview_limit),
            ),
            Err(e) => (false, e.to_string()),
        }
    }

    /// Checks a candidate type against the master ontology of `kind`.
    ///
    /// `threshold` overrides the configured inclusion threshold.
    pub fn check_similarity(
        &self,
        kind: OntologyKind,
        type_name: &str,
        description: &str,
        threshold: Option<f64>,
    ) -> Result<SimilarityReport, ManagerError> {
        let matcher = match threshold {
            Some(t) if !(0.0..=1.0).contains(&t) => {
                return Err(ConfigError::Invalid(format!(
                    "similarity threshold must be within [0, 1], got {}",
                    t
                ))
                .into())
            }
            Some(t) => self.matcher.clone().with_threshold(t),
            None => self.matcher.clone(),
        };

        match self.ontologies.load(kind)? {
            Some(master) => Ok(matcher.check(type_name, description, &master.elements)),
            None => {
                let mut report = matcher.check(type_name, description, &[]);
                report.message = format!(
                    "Master {} ontology not found at {}. Safe to create new element.",
                    kind,
                    self.ontologies.locate(kind)
                );
                Ok(report)
            }
        }
    }

    /// Merges one partition's ontology of `kind` into the master.
    ///
    /// Merges are serialized within this process.
    pub fn merge(
        &self,
        partition_id: u32,
        kind: OntologyKind,
    ) -> Result<MergeOutcome, ManagerError> {
        let _guard = self
            .merge_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let partition = self.partitions.get(partition_id)?;
        let existing = self.ontologies.load(kind)?;
        let previous_version = existing.as_ref().map(|m| m.version);

        let (master, stats) = match kind {
            OntologyKind::Entity => {
                self.merger
                    .merge(partition_id, &partition.entity_ontology, existing)?
            }
            OntologyKind::Relationship => {
                self.merger
                    .merge(partition_id, &partition.relationship_ontology, existing)?
            }
        };

        if let (false, false, Some(version)) =
            (stats.changed, self.config.merge.bump_unchanged, previous_version)
        {
            info!(partition_id, kind = %kind, "merge changed nothing; master left untouched");
            return Ok(MergeOutcome {
                partition_id,
                kind,
                stats,
                version,
                total_elements: master.len(),
                saved: false,
            });
        }

        self.ontologies.save(&master)?;

        Ok(MergeOutcome {
            partition_id,
            kind,
            stats,
            version: master.version,
            total_elements: master.len(),
            saved: true,
        })
    }

    /// Merges both ontology kinds of a partition, entities first.
    pub fn merge_both(&self, partition_id: u32) -> Result<Vec<MergeOutcome>, ManagerError> {
        OntologyKind::ALL
            .iter()
            .map(|kind| self.merge(partition_id, *kind))
            .collect()
    }

    /// Creates a new partition claiming `paths`.
    pub fn create_partition(
        &self,
        title: &str,
        description: &str,
        paths: &[String],
    ) -> Result<Partition, ManagerError> {
        Ok(self.partitions.create(title, description, paths)?)
    }

    /// Lists summaries of all well-formed partitions.
    pub fn list_partitions(&self) -> Result<Vec<PartitionSummary>, ManagerError> {
        Ok(self.partitions.summaries()?)
    }

    /// Adds an entity type to a partition. Returns the stored element and
    /// whether it was newly created.
    pub fn add_entity(
        &self,
        partition_id: u32,
        type_name: &str,
        description: &str,
        example_file: &str,
        example_in_file: &str,
    ) -> Result<(EntityElement, bool), ManagerError> {
        Ok(self.partitions.add_entity(
            partition_id,
            type_name,
            description,
            example_file,
            example_in_file,
        )?)
    }

    /// Adds a relationship type to a partition. Returns the stored element
    /// and whether it was newly created.
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
    ) -> Result<(RelationshipElement, bool), ManagerError> {
        Ok(self.partitions.add_relationship(
            partition_id,
            type_name,
            source_entity_type,
            target_entity_type,
            description,
            example_file,
            example_in_file,
        )?)
    }

    /// Writes empty master ontologies of both kinds, replacing existing ones.
    pub fn init_master_ontologies(&self) -> Result<Vec<MasterOntology>, ManagerError> {
        let _guard = self
            .merge_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(self.ontologies.init(self.initial_version)?)
    }

    /// Deletes all partition documents. Returns how many were removed.
    pub fn reset_partitions(&self) -> Result<usize, ManagerError> {
        let removed = self.partitions.reset()?;
        info!(data_source = %self.data_source.name, removed, "reset partitions");
        Ok(removed)
    }

    /// Deletes the master ontologies. Returns how many were removed.
    pub fn reset_ontologies(&self) -> Result<usize, ManagerError> {
        let _guard = self
            .merge_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let removed = self.ontologies.reset()?;
        info!(data_source = %self.data_source.name, removed, "reset master ontologies");
        Ok(removed)
    }
}

/// Errors that can occur in PipelineManager operations.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Partition(#[from] PartitionError),

    #[error(transparent)]
    Ontology(#[from] OntologyError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
