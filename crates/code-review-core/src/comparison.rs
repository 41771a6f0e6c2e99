use serde::Serialize;

use code_review_git::{BranchPair, ChangedFile, CommitRef};

/// What a run compares: resolved once, before any document is built
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub branches: BranchPair,
    pub merge_base: CommitRef,
    /// The base is the default branch because no upstream was configured
    pub base_is_fallback: bool,
    pub changed_files: Vec<ChangedFile>,
    #[serde(skip)]
    pub raw_diff: String,
}

impl Comparison {
    pub fn has_changes(&self) -> bool {
        !self.raw_diff.trim().is_empty()
    }
}
