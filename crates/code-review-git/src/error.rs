use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to the version-control executable
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("No common history between {0} and {1}")]
    NoMergeBase(String, String),

    #[error("Invalid file path: {0:?}")]
    InvalidPath(String),
}

impl GitError {
    /// Whether git rejected an object spec because it does not exist.
    ///
    /// A path missing at `<ref>` is how a newly added file shows up in
    /// `git cat-file -e <ref>:<path>`. Depending on the git version and on
    /// whether the file is in the worktree, that reads as
    /// `path 'x' does not exist in 'ref'`, `path 'x' exists on disk, but not in 'ref'`
    /// or `Not a valid object name ref:x`.
    pub fn is_unknown_object(&self) -> bool {
        const MARKERS: [&str; 4] = [
            "not a valid object name",
            "invalid object name",
            "does not exist in '",
            "exists on disk, but not in '",
        ];

        match self {
            GitError::CommandFailed { stderr, .. } => {
                let stderr = stderr.to_lowercase();
                MARKERS.iter().any(|marker| stderr.contains(marker))
            }
            _ => false,
        }
    }
}
