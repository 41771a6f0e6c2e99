use tracing::{debug, warn};

use code_review_git::{VersionControl, PREVIOUS_BRANCH};

use crate::document::{DiffDocument, FileEntry, OriginalContent};
use crate::segment::{extract_path, preview, split_segments};
use crate::{FileError, IgnoreMatcher};

/// Result of assembling a review document
#[derive(Debug, Default)]
pub struct BuildOutput {
    pub document: DiffDocument,
    /// Per-file problems, in diff order
    pub errors: Vec<FileError>,
    /// Paths left out by the ignore patterns, in diff order
    pub ignored: Vec<String>,
}

/// Turns raw `git diff` output into a [`DiffDocument`].
///
/// Every file is handled on its own: a file that cannot be read is reported
/// and the rest of the changeset is still assembled.
pub struct DiffDocumentBuilder<'a> {
    vcs: &'a dyn VersionControl,
    ignore: IgnoreMatcher,
    head_ref: String,
    base_ref: String,
}

impl<'a> DiffDocumentBuilder<'a> {
    /// Original content is looked up at the merge base of `HEAD` and the
    /// previously checked-out branch unless [`with_base_refs`](Self::with_base_refs) says otherwise.
    pub fn new(vcs: &'a dyn VersionControl, ignore: IgnoreMatcher) -> Self {
        Self {
            vcs,
            ignore,
            head_ref: "HEAD".to_string(),
            base_ref: PREVIOUS_BRANCH.to_string(),
        }
    }

    pub fn with_base_refs(mut self, head: impl Into<String>, base: impl Into<String>) -> Self {
        self.head_ref = head.into();
        self.base_ref = base.into();
        self
    }

    pub async fn build(&self, raw_diff: &str) -> BuildOutput {
        let mut output = BuildOutput::default();

        for segment in split_segments(raw_diff) {
            let Some(path) = extract_path(segment) else {
                let error = FileError::MalformedSegment {
                    preview: preview(segment),
                };
                warn!(error = %error, "Skipping diff segment");
                output.errors.push(error);
                continue;
            };

            if self.ignore.matches(&path) {
                debug!(path = %path, "Ignoring file");
                output.ignored.push(path);
                continue;
            }

            let merge_base = match self.vcs.merge_base(&self.head_ref, &self.base_ref).await {
                Ok(base) => base,
                Err(source) => {
                    warn!(path = %path, error = %source, "Failed to find branch point");
                    output.errors.push(FileError::MergeBase { path, source });
                    continue;
                }
            };

            let original = match self.vcs.file_content_at(&path, &merge_base).await {
                Ok(snapshot) => OriginalContent::Snapshot(snapshot),
                Err(source) => {
                    warn!(path = %path, error = %source, "Failed to get original content");
                    output.errors.push(FileError::OriginalContent {
                        path: path.clone(),
                        source,
                    });
                    OriginalContent::Unavailable
                }
            };

            output.document.push(FileEntry {
                path,
                original,
                changes: segment.to_string(),
            });
        }

        debug!(
            entries = output.document.len(),
            ignored = output.ignored.len(),
            errors = output.errors.len(),
            "Built diff document"
        );

        output
    }
}
