use std::fmt;
use thiserror::Error;

use code_review_git::GitError;
use code_review_gpt::ReviewError;

/// Step of resolving what to compare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonStage {
    CurrentBranch,
    MergeBase,
    ChangedFiles,
    Diff,
}

impl fmt::Display for ComparisonStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonStage::CurrentBranch => write!(f, "get current branch"),
            ComparisonStage::MergeBase => write!(f, "find branch point"),
            ComparisonStage::ChangedFiles => write!(f, "get list of changed files"),
            ComparisonStage::Diff => write!(f, "execute git diff"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Failed to {stage}: {source}")]
    Comparison {
        stage: ComparisonStage,
        #[source]
        source: GitError,
    },

    #[error("Review error: {0}")]
    Review(#[from] ReviewError),
}

impl RunError {
    pub(crate) fn at(stage: ComparisonStage) -> impl FnOnce(GitError) -> RunError {
        move |source| RunError::Comparison { stage, source }
    }
}
