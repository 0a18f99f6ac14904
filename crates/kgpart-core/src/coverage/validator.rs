use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use super::expand::PathExpander;
use super::report::{UnresolvedDirectory, ValidationReport};
use crate::partition::{PartitionDocument, StructuralError};

/// Checks that partitions cover a data source exactly once.
#[derive(Debug, Clone)]
pub struct CoverageValidator {
    expander: PathExpander,
}

impl CoverageValidator {
    pub fn new(expander: PathExpander) -> Self {
        Self { expander }
    }

    /// Validates partition documents against the files actually present.
    ///
    /// Documents with structural problems are reported and left out of the
    /// coverage accounting; the remaining ones are still checked.
    pub fn validate(
        &self,
        data_source: &str,
        documents: &[PartitionDocument],
        actual_files: &BTreeSet<String>,
    ) -> ValidationReport {
        let mut report = ValidationReport {
            data_source: data_source.to_string(),
            total_partitions: documents.len(),
            total_data_files: actual_files.len(),
            ..Default::default()
        };

        let mut seen_ids: BTreeMap<u32, String> = BTreeMap::new();
        let mut claims: BTreeMap<String, Vec<u32>> = BTreeMap::new();

        for document in documents {
            let partition = match document.parse() {
                Ok(partition) => partition,
                Err(e) => {
                    debug!(error = %e, "structural error");
                    report.errors.push(e);
                    continue;
                }
            };

            if let Some(first) = seen_ids.get(&partition.partition_id) {
                report.errors.push(StructuralError::DuplicateId {
                    document: document.source.clone(),
                    partition_id: partition.partition_id,
                    first: first.clone(),
                });
                continue;
            }
            seen_ids.insert(partition.partition_id, document.source.clone());

            let expansion = self.expander.expand(&partition.paths);
            for path in expansion.unresolved {
                report.unresolved_directories.push(UnresolvedDirectory {
                    partition_id: partition.partition_id,
                    path,
                });
            }

            for file in expansion.files {
                claims.entry(file).or_default().push(partition.partition_id);
            }
        }

        for (file, partitions) in claims {
            if partitions.len() > 1 {
                report.duplicate_files.insert(file.clone(), partitions);
            }
            if actual_files.contains(&file) {
                report.files_in_partitions.insert(file);
            } else {
                report.invalid_files.insert(file);
            }
        }

        report.missing_files = actual_files
            .difference(&report.files_in_partitions)
            .cloned()
            .collect();

        info!(
            data_source,
            partitions = report.total_partitions,
            data_files = report.total_data_files,
            duplicates = report.duplicate_files.len(),
            missing = report.missing_files.len(),
            invalid = report.invalid_files.len(),
            errors = report.errors.len(),
            valid = report.is_valid(),
            "validated partition coverage"
        );

        report
    }
}
