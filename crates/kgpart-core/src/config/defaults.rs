//! Default values for kgpart configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Workspace Defaults
// ============================================================================

/// Directory holding one subdirectory per data source.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Directory holding one partition subdirectory per data source.
pub const DEFAULT_PARTITIONS_DIR: &str = "partitions";

/// Directory holding one master ontology subdirectory per data source.
pub const DEFAULT_ONTOLOGIES_DIR: &str = "ontologies";

/// Version control metadata directories never counted as data.
pub const DEFAULT_VCS_DIRS: &[&str] = &[".git", ".svn", ".hg"];

/// File name prefix of partition documents (`file_subset_01.json`).
pub const PARTITION_FILE_PREFIX: &str = "file_subset_";

/// Master entity ontology document id.
pub const MASTER_ENTITY_ONTOLOGY: &str = "master_entity_ontology";

/// Master relationship ontology document id.
pub const MASTER_RELATIONSHIP_ONTOLOGY: &str = "master_relationship_ontology";

/// Local config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "kgpart.toml";

// ============================================================================
// Validation Defaults
// ============================================================================

/// Missing files listed in the agent feedback text before truncation.
pub const DEFAULT_FEEDBACK_PREVIEW_LIMIT: usize = 30;

/// Missing files listed in the human-readable summary before truncation.
pub const DEFAULT_SUMMARY_PREVIEW_LIMIT: usize = 20;

// ============================================================================
// Similarity Defaults
// ============================================================================

/// Minimum combined score for an existing type to be surfaced.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Combined score above which the best match is recommended outright.
pub const DEFAULT_STRONG_MATCH: f64 = 0.85;

/// Weight of the type-name score; the description gets the remainder.
pub const DEFAULT_TYPE_WEIGHT: f64 = 0.7;

/// Similar elements shown by the CLI.
pub const DEFAULT_SIMILAR_DISPLAY_LIMIT: usize = 5;

// ============================================================================
// Merge Defaults
// ============================================================================

/// Separator used when extending a master element's description.
pub const DEFAULT_DESCRIPTION_SEPARATOR: &str = " | ";

/// Version of a freshly initialized master ontology.
pub const DEFAULT_INITIAL_VERSION: &str = "0.1.0";
