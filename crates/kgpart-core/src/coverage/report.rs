use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use serde::Serialize;

use crate::partition::StructuralError;

/// A directory reference that did not resolve to a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedDirectory {
    pub partition_id: u32,
    pub path: String,
}

/// Outcome of checking a data source's partitions for exact coverage.
///
/// Every set is kept in full; only the text renderings truncate.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub data_source: String,
    /// Partition documents examined, including ones with structural errors.
    pub total_partitions: usize,
    pub total_data_files: usize,
    pub files_in_partitions: BTreeSet<String>,
    /// Files claimed by more than one partition, with every claimant.
    pub duplicate_files: BTreeMap<String, Vec<u32>>,
    /// Data files no partition claims.
    pub missing_files: BTreeSet<String>,
    /// Claimed files that do not exist in the data source.
    pub invalid_files: BTreeSet<String>,
    pub errors: Vec<StructuralError>,
    /// Informational; does not affect validity.
    pub unresolved_directories: Vec<UnresolvedDirectory>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
            && self.duplicate_files.is_empty()
            && self.missing_files.is_empty()
            && self.invalid_files.is_empty()
    }

    /// Itemized, actionable feedback for the partitioning agent.
    ///
    /// At most `missing_limit` missing files are listed.
    pub fn feedback(&self, missing_limit: usize) -> String {
        if self.is_valid() {
            return "All partitions valid".to_string();
        }

        let mut sections = Vec::new();

        if !self.errors.is_empty() {
            let mut s = String::from("SCHEMA/STRUCTURAL ERRORS:\n");
            for error in &self.errors {
                let _ = writeln!(s, "  - {}", error);
            }
            s.push_str("\nFix these documents so every required field is present and well-typed\n");
            sections.push(s);
        }

        if !self.duplicate_files.is_empty() {
            let mut s = String::from("DUPLICATE FILES (appearing in multiple partitions):\n");
            for (file, partitions) in &self.duplicate_files {
                let _ = writeln!(s, "  - {}", file);
                let _ = writeln!(s, "    Found in partitions: {}", join_ids(partitions));
            }
            s.push_str("\nPlease remove each of these files from all but ONE partition\n");
            sections.push(s);
        }

        if !self.missing_files.is_empty() {
            let mut s = String::from("MISSING FILES (in data source but not in any partition):\n");
            push_preview(&mut s, &self.missing_files, missing_limit);
            let _ = writeln!(
                s,
                "\nPlease add these {} files to appropriate partitions",
                self.missing_files.len()
            );
            sections.push(s);
        }

        if !self.invalid_files.is_empty() {
            let mut s = String::from(
                "INVALID FILES (referenced in partitions but not found in data source):\n",
            );
            for file in &self.invalid_files {
                let _ = writeln!(s, "  - {}", file);
            }
            let _ = writeln!(
                s,
                "\nPlease remove these {} invalid references from partitions",
                self.invalid_files.len()
            );
            sections.push(s);
        }

        if !self.unresolved_directories.is_empty() {
            let mut s = String::from(
                "UNRESOLVED DIRECTORIES (no such directory inside the data source):\n",
            );
            for dir in &self.unresolved_directories {
                let _ = writeln!(s, "  - partition {}: {}", dir.partition_id, dir.path);
            }
            s.push_str("\nCheck these directory paths; they currently cover no files\n");
            sections.push(s);
        }

        sections.join("\n")
    }

    /// Human-readable summary of the run.
    ///
    /// At most `missing_limit` missing files are listed.
    pub fn summary(&self, missing_limit: usize) -> String {
        let mut s = String::new();
        let rule = "=".repeat(60);

        let _ = writeln!(s, "{}", rule);
        let _ = writeln!(s, "PARTITION VALIDATION: {}", self.data_source);
        let _ = writeln!(s, "{}", rule);
        let _ = writeln!(s, "Partitions:            {}", self.total_partitions);
        let _ = writeln!(s, "Data files:            {}", self.total_data_files);
        let _ = writeln!(s, "Files in partitions:   {}", self.files_in_partitions.len());
        let _ = writeln!(s, "Duplicate files:       {}", self.duplicate_files.len());
        let _ = writeln!(s, "Missing files:         {}", self.missing_files.len());
        let _ = writeln!(s, "Invalid files:         {}", self.invalid_files.len());
        let _ = writeln!(s, "Structural errors:     {}", self.errors.len());

        if !self.errors.is_empty() {
            let _ = writeln!(s, "\nStructural errors:");
            for error in &self.errors {
                let _ = writeln!(s, "  - {}", error);
            }
        }

        if !self.duplicate_files.is_empty() {
            let _ = writeln!(s, "\nDuplicate files:");
            for (file, partitions) in &self.duplicate_files {
                let _ = writeln!(s, "  - {} (partitions {})", file, join_ids(partitions));
            }
        }

        if !self.missing_files.is_empty() {
            let _ = writeln!(s, "\nMissing files:");
            push_preview(&mut s, &self.missing_files, missing_limit);
        }

        if !self.invalid_files.is_empty() {
            let _ = writeln!(s, "\nInvalid files:");
            for file in &self.invalid_files {
                let _ = writeln!(s, "  - {}", file);
            }
        }

        if !self.unresolved_directories.is_empty() {
            let _ = writeln!(s, "\nUnresolved directories:");
            for dir in &self.unresolved_directories {
                let _ = writeln!(s, "  - partition {}: {}", dir.partition_id, dir.path);
            }
        }

        let _ = writeln!(s, "\n{}", rule);
        let verdict = if self.is_valid() { "VALID" } else { "INVALID" };
        let _ = writeln!(s, "Result: {}", verdict);
        let _ = write!(s, "{}", rule);
        s
    }
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter().map(u32::to_string).collect::<Vec<_>>().join(", ")
}

fn push_preview(s: &mut String, files: &BTreeSet<String>, limit: usize) {
    for file in files.iter().take(limit) {
        let _ = writeln!(s, "  - {}", file);
    }
    if files.len() > limit {
        let _ = writeln!(s, "  ... and {} more files", files.len() - limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with_missing(count: usize) -> ValidationReport {
        ValidationReport {
            data_source: "docs".to_string(),
            missing_files: (0..count).map(|i| format!("f{:03}.md", i)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_feedback() {
        let report = ValidationReport::default();
        assert!(report.is_valid());
        assert_eq!(report.feedback(30), "All partitions valid");
    }

    #[test]
    fn test_feedback_truncates_missing_files() {
        let report = report_with_missing(35);
        let feedback = report.feedback(30);

        assert!(feedback.starts_with("MISSING FILES"));
        assert!(feedback.contains("f029.md"));
        assert!(!feedback.contains("f030.md"));
        assert!(feedback.contains("... and 5 more files"));
        assert!(feedback.contains("Please add these 35 files"));
        // Truncation affects only the rendering.
        assert_eq!(report.missing_files.len(), 35);
    }

    #[test]
    fn test_unresolved_directories_do_not_invalidate() {
        let report = ValidationReport {
            unresolved_directories: vec![UnresolvedDirectory {
                partition_id: 1,
                path: "gone/".to_string(),
            }],
            ..Default::default()
        };
        assert!(report.is_valid());
    }

    #[test]
    fn test_summary_reports_verdict() {
        let report = report_with_missing(25);
        let summary = report.summary(20);

        assert!(summary.contains("PARTITION VALIDATION: docs"));
        assert!(summary.contains("... and 5 more files"));
        assert!(summary.contains("Result: INVALID"));
    }

    #[test]
    fn test_duplicate_section_lists_claimants() {
        let mut report = ValidationReport::default();
        report.duplicate_files.insert("b/c.md".to_string(), vec![1, 2]);

        let feedback = report.feedback(30);
        assert!(feedback.contains("DUPLICATE FILES"));
        assert!(feedback.contains("Found in partitions: 1, 2"));
    }
}
