use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::error::StorageError;
use super::DocumentStore;

const DOCUMENT_EXTENSION: &str = "json";

/// File-based document store.
///
/// Every document is one indented JSON file inside a single directory:
/// ```text
/// partitions/{data-source}/
///   file_subset_01.json
///   file_subset_02.json
/// ```
///
/// Writes go to a hidden temporary file that is renamed over the target, so
/// a reader never observes a half-written document.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at the given directory.
    ///
    /// The directory is created lazily on the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of a document file.
    fn document_path(&self, id: &str) -> Result<PathBuf, StorageError> {
        if id.is_empty() || id.starts_with('.') || id.contains(|c| c == '/' || c == '\\') {
            return Err(StorageError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", id, DOCUMENT_EXTENSION)))
    }

    /// Returns the path of the temporary file used while saving a document.
    fn staging_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!(".{}.{}.tmp", id, DOCUMENT_EXTENSION))
    }

    /// Ensures the store directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        }
        Ok(())
    }
}

impl DocumentStore for FileStore {
    fn load(&self, id: &str) -> Result<Option<Value>, StorageError> {
        let path = self.document_path(id)?;
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).map_err(|e| StorageError::io(&path, e))?;
        let value = serde_json::from_str(&json).map_err(|source| {
            StorageError::MalformedDocument {
                id: path.display().to_string(),
                source,
            }
        })?;

        Ok(Some(value))
    }

    fn save(&self, id: &str, document: &Value) -> Result<(), StorageError> {
        let path = self.document_path(id)?;
        self.ensure_dir()?;

        let json = serde_json::to_string_pretty(document)?;
        let staging = self.staging_path(id);
        fs::write(&staging, json).map_err(|e| StorageError::io(&staging, e))?;
        fs::rename(&staging, &path).map_err(|e| StorageError::io(&path, e))?;

        debug!(path = %path.display(), "saved document");
        Ok(())
    }

    fn ids(&self) -> Result<Vec<String>, StorageError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let entries = fs::read_dir(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(&self.dir, e))?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    ids.push(stem.to_string());
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    fn remove(&self, id: &str) -> Result<(), StorageError> {
        let path = self.document_path(id)?;
        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }

        fs::remove_file(&path).map_err(|e| StorageError::io(&path, e))?;
        Ok(())
    }

    fn locate(&self, id: &str) -> String {
        self.dir
            .join(format!("{}.{}", id, DOCUMENT_EXTENSION))
            .display()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_save_creates_directory_and_leaves_no_staging_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("nested").join("store"));

        store.save("doc", &json!({"a": 1})).unwrap();

        let names: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["doc.json".to_string()]);
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        assert!(matches!(
            store.save("../escape", &json!({})),
            Err(StorageError::InvalidId(_))
        ));
        assert!(matches!(store.load(""), Err(StorageError::InvalidId(_))));
    }

    #[test]
    fn test_ids_ignore_non_json_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.save("b", &json!({})).unwrap();
        store.save("a", &json!({})).unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "x").unwrap();

        assert_eq!(store.ids().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }
}
