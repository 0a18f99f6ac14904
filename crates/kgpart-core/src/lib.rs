pub mod config;
pub mod coverage;
pub mod data_source;
pub mod manager;
pub mod ontology;
pub mod partition;
pub mod storage;

pub use config::{Config, ConfigError};
pub use coverage::{CoverageValidator, FileScanner, PathExpander, ValidationError, ValidationReport};
pub use data_source::{DataSource, DataSourceError};
pub use manager::{ManagerError, MergeOutcome, PipelineManager};
pub use ontology::{
    MasterElement, MasterOntology, MergeStats, OntologyKind, OntologyMerger, Recommendation,
    SimilarityMatcher, SimilarityReport, Version,
};
pub use partition::{Partition, PartitionDocument, PartitionStore, PathRef, StructuralError};
pub use storage::{DocumentStore, FileStore, StorageError};
