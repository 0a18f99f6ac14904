use tracing::info;

use super::element::OntologyKind;
use super::master::MasterOntology;
use super::version::Version;
use super::OntologyError;
use crate::storage::{DocumentStore, StorageError};

/// Persists the master ontologies of one data source.
///
/// ```text
/// ontologies/{data-source}/
///   master_entity_ontology.json
///   master_relationship_ontology.json
/// ```
pub struct OntologyStore<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> OntologyStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads the master ontology of a kind, `None` if not yet created.
    pub fn load(&self, kind: OntologyKind) -> Result<Option<MasterOntology>, OntologyError> {
        let master: Option<MasterOntology> = self.store.load_as(kind.master_document_id())?;

        if let Some(ref master) = master {
            if master.ontology_type != kind {
                return Err(OntologyError::KindMismatch {
                    expected: kind,
                    actual: master.ontology_type,
                });
            }
        }

        Ok(master)
    }

    /// Saves a master ontology under the id of its kind.
    pub fn save(&self, master: &MasterOntology) -> Result<(), OntologyError> {
        self.store
            .save_as(master.ontology_type.master_document_id(), master)?;
        Ok(())
    }

    /// Writes empty entity and relationship master ontologies, replacing
    /// existing ones.
    pub fn init(&self, version: Version) -> Result<Vec<MasterOntology>, OntologyError> {
        let mut created = Vec::new();
        for kind in OntologyKind::ALL {
            let master = MasterOntology::new(kind, version);
            self.save(&master)?;
            info!(kind = %kind, version = %version, "initialized master ontology");
            created.push(master);
        }
        Ok(created)
    }

    /// Deletes every stored ontology document. Returns how many were removed.
    pub fn reset(&self) -> Result<usize, StorageError> {
        let ids = self.store.ids()?;
        for id in &ids {
            self.store.remove(id)?;
        }
        Ok(ids.len())
    }

    /// Location of the master ontology of a kind, for messages.
    pub fn locate(&self, kind: OntologyKind) -> String {
        self.store.locate(kind.master_document_id())
    }
}
