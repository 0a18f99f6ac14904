use std::collections::BTreeSet;

use super::scan::{normalize_relative, FileScanner};
use crate::partition::PathRef;

/// Files claimed by a partition's path list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub files: BTreeSet<String>,
    /// Directory references whose target does not exist.
    pub unresolved: Vec<String>,
}

/// Resolves partition path entries into concrete file paths.
#[derive(Debug, Clone)]
pub struct PathExpander {
    scanner: FileScanner,
}

impl PathExpander {
    pub fn new(scanner: FileScanner) -> Self {
        Self { scanner }
    }

    /// Expands directory references to the files below them and normalizes
    /// file references. File references are not checked for existence.
    pub fn expand(&self, paths: &[PathRef]) -> Expansion {
        let mut expansion = Expansion::default();

        for path in paths {
            match path {
                PathRef::Directory(dir) => match self.scanner.expand_directory(dir) {
                    Some(files) => expansion.files.extend(files),
                    None => expansion.unresolved.push(path.to_string()),
                },
                PathRef::File(file) => {
                    expansion.files.insert(normalize_relative(file));
                }
            }
        }

        expansion
    }
}
