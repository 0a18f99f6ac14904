use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use ignore::WalkBuilder;
use tracing::warn;

use crate::config::DEFAULT_VCS_DIRS;

/// Walks a data-source tree and reports files as root-relative paths.
///
/// Paths use `/` separators on every platform. Files inside version-control
/// metadata directories are never reported. Ignore files (`.gitignore` and
/// the like) are not honored: every file on disk counts.
#[derive(Debug, Clone)]
pub struct FileScanner {
    root: PathBuf,
    vcs_dirs: Vec<String>,
}

impl FileScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            vcs_dirs: DEFAULT_VCS_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replaces the skipped version-control directory names.
    pub fn with_vcs_dirs(mut self, vcs_dirs: Vec<String>) -> Self {
        self.vcs_dirs = vcs_dirs;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every regular file under the root.
    pub fn snapshot(&self) -> BTreeSet<String> {
        self.files_under(&self.root)
    }

    /// Every regular file under `dir` (relative to the root), or `None` if
    /// that directory does not exist or climbs out of the root with `..`.
    pub fn expand_directory(&self, dir: &str) -> Option<BTreeSet<String>> {
        if dir.split('/').any(|part| part == "..") {
            return None;
        }
        let normalized = normalize_relative(dir);
        let path = if normalized.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&normalized)
        };

        if !path.is_dir() {
            return None;
        }
        Some(self.files_under(&path))
    }

    fn files_under(&self, dir: &Path) -> BTreeSet<String> {
        let vcs_dirs = self.vcs_dirs.clone();
        let walker = WalkBuilder::new(dir)
            .standard_filters(false)
            .follow_links(false)
            .filter_entry(move |entry| {
                entry.depth() == 0
                    || !vcs_dirs
                        .iter()
                        .any(|d| entry.file_name().to_str() == Some(d.as_str()))
            })
            .build();

        let mut files = BTreeSet::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            if let Some(relative) = self.relative(path) {
                files.insert(relative);
            }
        }
        files
    }

    /// Root-relative `/`-joined path, `None` for paths outside the root or
    /// inside a version-control directory.
    fn relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_string_lossy();
                    if self.vcs_dirs.iter().any(|d| d.as_str() == part) {
                        return None;
                    }
                    parts.push(part.to_string());
                }
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(parts.join("/"))
    }
}

/// Lexically normalizes a root-relative path: empty and `.` segments are
/// dropped, as is a leading `/`.
pub fn normalize_relative(path: &str) -> String {
    path.split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_normalize_relative() {
        assert_eq!(normalize_relative("./docs//a.md"), "docs/a.md");
        assert_eq!(normalize_relative("/"), "");
        assert_eq!(normalize_relative("a/./b/"), "a/b");
    }

    #[test]
    fn test_snapshot_skips_vcs_dirs_but_not_ignored_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "a.md");
        touch(root, "docs/b.md");
        touch(root, ".git/config");
        touch(root, ".gitignore");
        fs::write(root.join(".gitignore"), "docs/\n").unwrap();

        let files = scanner_files(root);
        assert_eq!(
            files,
            vec![".gitignore".to_string(), "a.md".to_string(), "docs/b.md".to_string()]
        );
    }

    #[test]
    fn test_expand_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "docs/x/a.md");
        touch(root, "docs/b.md");
        touch(root, "other/c.md");

        let scanner = FileScanner::new(root);
        let docs: Vec<String> = scanner.expand_directory("docs").unwrap().into_iter().collect();
        assert_eq!(docs, vec!["docs/b.md".to_string(), "docs/x/a.md".to_string()]);

        assert_eq!(scanner.expand_directory("").unwrap().len(), 3);
        assert!(scanner.expand_directory("missing").is_none());
    }

    #[test]
    fn test_expand_directory_stays_inside_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("data").join("docs");
        touch(&root, "a.md");
        touch(&root, "guide/b.md");
        touch(temp_dir.path(), "secrets/key.pem");

        let scanner = FileScanner::new(&root);
        assert!(scanner.expand_directory("../").is_none());
        assert!(scanner.expand_directory("../../").is_none());
        assert!(scanner.expand_directory("guide/../..").is_none());
        assert_eq!(scanner.expand_directory("./guide/").unwrap().len(), 1);
    }

    fn scanner_files(root: &Path) -> Vec<String> {
        FileScanner::new(root).snapshot().into_iter().collect()
    }
}
