//! # code-review-git
//!
//! Git gateway for code-review.
//!
//! This crate answers the questions the review pipeline asks of version
//! control: which branch is checked out, what it is compared against, where
//! the two diverged, what changed, and what a file looked like before.
//!
//! ## Key Types
//!
//! - [`VersionControl`] - The operations the pipeline depends on
//! - [`GitClient`] - Implementation backed by the `git` executable
//! - [`CommandRunner`] / [`ProcessRunner`] - The single process boundary
//! - [`FileContentSnapshot`] - A file at the comparison base, or the new-file sentinel
//!
//! ## Usage
//!
//! ```rust,ignore
//! use code_review_git::{GitClient, VersionControl};
//!
//! let git = GitClient::in_dir(repo_dir, Some(Duration::from_secs(30)));
//! let current = git.current_branch().await?;
//! let base = git.base_branch().await;
//! let merge_base = git.merge_base(current.as_str(), &base.name).await?;
//! let diff = git.raw_diff(merge_base.as_str(), current.as_str()).await?;
//! ```

mod client;
mod error;
mod gateway;
mod runner;
mod types;

pub use client::{GitClient, DEFAULT_BASE_BRANCH, PREVIOUS_BRANCH};
pub use error::GitError;
pub use gateway::VersionControl;
pub use runner::{CommandRunner, ProcessRunner};
pub use types::{BaseBranch, BranchPair, ChangedFile, CommitRef, FileContentSnapshot};
