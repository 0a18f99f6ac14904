use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors resolving which data source to work on.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("Data directory does not exist: {}", .0.display())]
    DataDirMissing(PathBuf),

    #[error("No data source found in {}", .0.display())]
    NoDataSource(PathBuf),

    #[error(
        "Multiple data sources found in {}: {}; pick one explicitly",
        .dir.display(),
        .names.join(", ")
    )]
    Ambiguous { dir: PathBuf, names: Vec<String> },

    #[error("Data source '{name}' not found in {}", .dir.display())]
    NotFound { name: String, dir: PathBuf },

    #[error("Invalid data source name: {0:?}")]
    InvalidName(String),

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A named directory tree of raw documents under the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub name: String,
    pub root_path: PathBuf,
}

impl DataSource {
    /// Resolves a data source under `data_dir`.
    ///
    /// With a name, that subdirectory must exist. Without one, the data
    /// directory must contain exactly one subdirectory.
    pub fn resolve(data_dir: &Path, name: Option<&str>) -> Result<Self, DataSourceError> {
        if !data_dir.is_dir() {
            return Err(DataSourceError::DataDirMissing(data_dir.to_path_buf()));
        }

        match name {
            Some(name) => Self::named(data_dir, name),
            None => Self::discover(data_dir),
        }
    }

    fn named(data_dir: &Path, name: &str) -> Result<Self, DataSourceError> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name == "."
            || name == ".."
        {
            return Err(DataSourceError::InvalidName(name.to_string()));
        }

        let root_path = data_dir.join(name);
        if !root_path.is_dir() {
            return Err(DataSourceError::NotFound {
                name: name.to_string(),
                dir: data_dir.to_path_buf(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            root_path,
        })
    }

    fn discover(data_dir: &Path) -> Result<Self, DataSourceError> {
        let entries = fs::read_dir(data_dir).map_err(|source| DataSourceError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|name| !name.starts_with('.'))
            .collect();
        names.sort();

        match names.len() {
            0 => Err(DataSourceError::NoDataSource(data_dir.to_path_buf())),
            1 => {
                let name = names.remove(0);
                debug!(data_source = %name, "discovered data source");
                Ok(Self {
                    root_path: data_dir.join(&name),
                    name,
                })
            }
            _ => Err(DataSourceError::Ambiguous {
                dir: data_dir.to_path_buf(),
                names,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discovers_single_source() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("docs")).unwrap();
        fs::write(temp_dir.path().join("README"), "x").unwrap();

        let source = DataSource::resolve(temp_dir.path(), None).unwrap();
        assert_eq!(source.name, "docs");
        assert_eq!(source.root_path, temp_dir.path().join("docs"));
    }

    #[test]
    fn test_zero_or_many_sources_are_errors() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            DataSource::resolve(temp_dir.path(), None),
            Err(DataSourceError::NoDataSource(_))
        ));

        fs::create_dir_all(temp_dir.path().join("a")).unwrap();
        fs::create_dir_all(temp_dir.path().join("b")).unwrap();
        assert!(matches!(
            DataSource::resolve(temp_dir.path(), None),
            Err(DataSourceError::Ambiguous { .. })
        ));

        let named = DataSource::resolve(temp_dir.path(), Some("b")).unwrap();
        assert_eq!(named.name, "b");
    }

    #[test]
    fn test_missing_data_dir_and_source() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            DataSource::resolve(&temp_dir.path().join("nope"), None),
            Err(DataSourceError::DataDirMissing(_))
        ));
        assert!(matches!(
            DataSource::resolve(temp_dir.path(), Some("nope")),
            Err(DataSourceError::NotFound { .. })
        ));
        assert!(matches!(
            DataSource::resolve(temp_dir.path(), Some("../x")),
            Err(DataSourceError::InvalidName(_))
        ));
    }
}
