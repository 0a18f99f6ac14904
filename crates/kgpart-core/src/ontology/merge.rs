//! Folding partition ontology fragments into a master ontology.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use super::element::OntologyElement;
use super::master::{MasterElement, MasterOntology};
use super::version::Version;
use super::OntologyError;
use crate::config::MergeConfig;

/// Outcome counters of one merge call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Elements that created a new master type.
    pub added: usize,
    /// Elements that matched an existing master type.
    pub updated: usize,
    /// Whether any master element was observably modified.
    pub changed: bool,
}

/// Merges partition ontology elements into a master ontology.
///
/// Re-merging the same partition is safe: partition ids and example files
/// have set semantics and descriptions only grow with unseen text. The
/// version is bumped on every call regardless.
#[derive(Debug, Clone)]
pub struct OntologyMerger {
    separator: String,
    initial_version: Version,
}

impl Default for OntologyMerger {
    fn default() -> Self {
        let config = MergeConfig::default();
        Self {
            separator: config.description_separator,
            initial_version: Version::new(0, 1, 0),
        }
    }
}

impl OntologyMerger {
    /// Creates a merger from configuration.
    pub fn new(config: &MergeConfig) -> Result<Self, OntologyError> {
        Ok(Self {
            separator: config.description_separator.clone(),
            initial_version: config.initial_version.parse()?,
        })
    }

    /// Creates the empty master ontology a first merge starts from.
    pub fn initial<E: OntologyElement>(&self) -> MasterOntology {
        MasterOntology::new(E::kind(), self.initial_version)
    }

    /// Folds `elements` contributed by `partition_id` into `master`.
    ///
    /// An absent master is initialized first. Fails only if `master` holds
    /// the other ontology kind.
    pub fn merge<E: OntologyElement>(
        &self,
        partition_id: u32,
        elements: &[E],
        master: Option<MasterOntology>,
    ) -> Result<(MasterOntology, MergeStats), OntologyError> {
        let mut master = master.unwrap_or_else(|| self.initial::<E>());

        if master.ontology_type != E::kind() {
            return Err(OntologyError::KindMismatch {
                expected: E::kind(),
                actual: master.ontology_type,
            });
        }

        let mut stats = MergeStats::default();

        for element in elements {
            match master.find_mut(&element.key()) {
                Some(existing) => {
                    let mut changed = existing.add_source_partition(partition_id);
                    changed |= existing.add_example_file(element.example_file());
                    changed |= existing.extend_description(element.description(), &self.separator);

                    debug!(
                        type_name = element.type_name(),
                        partition_id, changed, "updated master element"
                    );
                    stats.updated += 1;
                    stats.changed |= changed;
                }
                None => {
                    debug!(type_name = element.type_name(), partition_id, "added master element");
                    master
                        .elements
                        .push(MasterElement::from_element(partition_id, element));
                    stats.added += 1;
                    stats.changed = true;
                }
            }
        }

        master.version = master.version.bump_patch();
        master.last_updated = Utc::now();

        info!(
            kind = %master.ontology_type,
            partition_id,
            added = stats.added,
            updated = stats.updated,
            version = %master.version,
            "merged partition into master ontology"
        );

        Ok((master, stats))
    }
}
