use async_trait::async_trait;

use crate::{BaseBranch, ChangedFile, CommitRef, FileContentSnapshot, GitError};

/// The version-control operations the review pipeline needs.
///
/// Implementations may shell out, wrap a library, or be test fakes.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Name of the checked-out branch
    async fn current_branch(&self) -> Result<CommitRef, GitError>;

    /// Upstream of the current branch, or the default base branch when there is none
    async fn base_branch(&self) -> BaseBranch;

    /// Nearest common ancestor of two refs
    async fn merge_base(&self, a: &str, b: &str) -> Result<CommitRef, GitError>;

    /// Paths changed between two refs, in tool order
    async fn changed_files(&self, base: &str, head: &str) -> Result<Vec<ChangedFile>, GitError>;

    /// Full multi-file diff between two refs
    async fn raw_diff(&self, base: &str, head: &str) -> Result<String, GitError>;

    /// Content of `path` as of `at`
    async fn file_content_at(
        &self,
        path: &str,
        at: &CommitRef,
    ) -> Result<FileContentSnapshot, GitError>;
}
