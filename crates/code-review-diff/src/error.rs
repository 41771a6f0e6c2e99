use code_review_git::GitError;
use thiserror::Error;

/// A problem with a single file while assembling the document.
///
/// These never abort the build; the affected file is skipped or included
/// with a placeholder.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("Malformed diff segment, no file path in header: {preview:?}")]
    MalformedSegment { preview: String },

    #[error("Failed to find branch point for {path}: {source}")]
    MergeBase {
        path: String,
        #[source]
        source: GitError,
    },

    #[error("Failed to get original content for {path}: {source}")]
    OriginalContent {
        path: String,
        #[source]
        source: GitError,
    },
}

impl FileError {
    pub fn path(&self) -> Option<&str> {
        match self {
            FileError::MalformedSegment { .. } => None,
            FileError::MergeBase { path, .. } | FileError::OriginalContent { path, .. } => {
                Some(path)
            }
        }
    }
}
