//! Coverage validation: every data-source file in exactly one partition.

mod expand;
mod report;
mod scan;
mod validator;

pub use expand::{Expansion, PathExpander};
pub use report::{UnresolvedDirectory, ValidationReport};
pub use scan::{normalize_relative, FileScanner};
pub use validator::CoverageValidator;

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::StorageError;

/// Configuration problems that prevent a validation run.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No data files found in {}", .0.display())]
    NoDataFiles(PathBuf),

    #[error("No partition files found in {}", .0.display())]
    NoPartitions(PathBuf),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
