use serde::Serialize;

use crate::Comparison;

/// The final outcome of a review run
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReviewOutcome {
    /// The diff between the branches is empty
    NoChanges { comparison: Comparison },
    /// Every changed file was ignored or failed before it reached the document
    NothingToReview {
        comparison: Comparison,
        ignored: Vec<String>,
        warnings: Vec<String>,
    },
    /// Document assembled but no reviewer was configured
    DryRun {
        comparison: Comparison,
        files: Vec<String>,
        ignored: Vec<String>,
        warnings: Vec<String>,
        document: String,
    },
    /// The reviewer answered
    Reviewed {
        comparison: Comparison,
        files: Vec<String>,
        ignored: Vec<String>,
        warnings: Vec<String>,
        model: String,
        review: String,
        duration_secs: f64,
    },
}

impl ReviewOutcome {
    pub fn comparison(&self) -> &Comparison {
        match self {
            Self::NoChanges { comparison } => comparison,
            Self::NothingToReview { comparison, .. } => comparison,
            Self::DryRun { comparison, .. } => comparison,
            Self::Reviewed { comparison, .. } => comparison,
        }
    }

    /// Per-file problems that did not stop the run
    pub fn warnings(&self) -> &[String] {
        match self {
            Self::NoChanges { .. } => &[],
            Self::NothingToReview { warnings, .. } => warnings,
            Self::DryRun { warnings, .. } => warnings,
            Self::Reviewed { warnings, .. } => warnings,
        }
    }

    pub fn is_reviewed(&self) -> bool {
        matches!(self, Self::Reviewed { .. })
    }

    /// Process exit code; every outcome is a successful run
    pub fn exit_code(&self) -> i32 {
        0
    }
}
