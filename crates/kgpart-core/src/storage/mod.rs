mod error;
mod file;

pub use error::StorageError;
pub use file::FileStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Trait for JSON document storage backends.
///
/// Documents are addressed by a flat string id. The partition and ontology
/// stores are written against this trait so a backend can add locking or
/// swap in an embedded store without touching the validation and merge
/// logic.
pub trait DocumentStore {
    /// Loads a raw document, `None` if it does not exist.
    ///
    /// Unparsable content is reported as [`StorageError::MalformedDocument`].
    fn load(&self, id: &str) -> Result<Option<Value>, StorageError>;

    /// Saves a document, replacing any previous version.
    fn save(&self, id: &str, document: &Value) -> Result<(), StorageError>;

    /// Lists the ids of all stored documents, sorted.
    fn ids(&self) -> Result<Vec<String>, StorageError>;

    /// Removes a document. Removing a missing document is an error.
    fn remove(&self, id: &str) -> Result<(), StorageError>;

    /// Human-readable location of a document, used in diagnostics.
    fn locate(&self, id: &str) -> String;

    /// Loads and deserializes a typed document.
    fn load_as<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>, StorageError>
    where
        Self: Sized,
    {
        match self.load(id)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Serializes and saves a typed document.
    fn save_as<T: Serialize>(&self, id: &str, document: &T) -> Result<(), StorageError>
    where
        Self: Sized,
    {
        let value = serde_json::to_value(document)?;
        self.save(id, &value)
    }
}
