use crate::domain::model::TransformedRecord;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// One reason a document failed the lottery schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    /// JSON pointer to the offending value, empty for the document root.
    pub instance_path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Raw bytes of one input file, or the error hit while reading it.
#[derive(Debug)]
pub struct SourceDocument {
    pub file_name: String,
    pub contents: Result<Vec<u8>>,
}

#[derive(Debug)]
pub struct Extraction {
    pub started_at: DateTime<Utc>,
    pub documents: Vec<SourceDocument>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Transformed(TransformedRecord),
    Rejected(Vec<SchemaViolation>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFile {
    pub file_name: String,
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub started_at: DateTime<Utc>,
    pub processed: Vec<ProcessedFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Transformed { output_file: String, prizes: usize },
    /// Dry run: the file is valid and would have been written.
    Checked { prizes: usize },
    Invalid { violations: Vec<SchemaViolation> },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub file_name: String,
    #[serde(flatten)]
    pub status: FileStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn transformed_count(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Transformed { .. } | FileStatus::Checked { .. }))
    }

    pub fn invalid_count(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Invalid { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed { .. }))
    }

    /// One-line tally, e.g. "3 files: 2 transformed, 1 invalid, 0 failed".
    pub fn summary(&self) -> String {
        format!(
            "{} files{}: {} transformed, {} invalid, {} failed",
            self.total(),
            if self.dry_run { " (dry run)" } else { "" },
            self.transformed_count(),
            self.invalid_count(),
            self.failed_count()
        )
    }

    fn count(&self, predicate: impl Fn(&FileStatus) -> bool) -> usize {
        self.files.iter().filter(|f| predicate(&f.status)).count()
    }
}
