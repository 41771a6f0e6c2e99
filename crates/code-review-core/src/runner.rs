use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use code_review_diff::{BuildOutput, DiffDocumentBuilder, IgnoreMatcher};
use code_review_git::{BranchPair, VersionControl};
use code_review_gpt::Reviewer;
use code_review_logging::{LogEvent, Logger};

use crate::error::{ComparisonStage, RunError};
use crate::{Comparison, ReviewOutcome};

/// What to review
#[derive(Debug, Clone, Default)]
pub struct ReviewRequest {
    pub working_dir: PathBuf,
    pub ignore: IgnoreMatcher,
}

impl ReviewRequest {
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            ignore: IgnoreMatcher::default(),
        }
    }

    pub fn with_ignore(mut self, ignore: IgnoreMatcher) -> Self {
        self.ignore = ignore;
        self
    }
}

/// Orchestrates one review: resolve the comparison, build the document,
/// hand it to the reviewer.
pub struct ReviewRunner<'a> {
    vcs: &'a dyn VersionControl,
    reviewer: Option<&'a dyn Reviewer>,
    logger: Arc<Logger>,
}

impl<'a> ReviewRunner<'a> {
    /// A runner without a reviewer stops after building the document
    pub fn new(vcs: &'a dyn VersionControl, logger: Arc<Logger>) -> Self {
        Self {
            vcs,
            reviewer: None,
            logger,
        }
    }

    pub fn with_reviewer(mut self, reviewer: &'a dyn Reviewer) -> Self {
        self.reviewer = Some(reviewer);
        self
    }

    pub async fn run(&self, request: ReviewRequest) -> Result<ReviewOutcome, RunError> {
        self.logger.log(&LogEvent::RunStarted {
            working_dir: request.working_dir.clone(),
            ignore_patterns: request.ignore.patterns().map(String::from).collect(),
        });

        let comparison = self.resolve_comparison().await?;

        self.logger.log(&LogEvent::ComparisonResolved {
            current: comparison.branches.current.clone(),
            base: comparison.branches.base.clone(),
            merge_base: comparison.merge_base.to_string(),
            base_is_fallback: comparison.base_is_fallback,
            files_changed: comparison.changed_files.len(),
        });

        if !comparison.has_changes() {
            self.logger.log(&LogEvent::NothingToReview {
                reason: "No changes detected in the current branch.".to_string(),
            });
            return Ok(ReviewOutcome::NoChanges { comparison });
        }

        let builder = DiffDocumentBuilder::new(self.vcs, request.ignore).with_base_refs(
            comparison.branches.current.clone(),
            comparison.branches.base.clone(),
        );
        let BuildOutput {
            document,
            errors,
            ignored,
        } = builder.build(&comparison.raw_diff).await;

        for path in &ignored {
            self.logger.log(&LogEvent::FileIgnored { path: path.clone() });
        }
        for error in &errors {
            self.logger.log(&LogEvent::FileFailed {
                path: error.path().map(String::from),
                error: error.to_string(),
            });
        }

        let rendered = document.render();
        self.logger.log(&LogEvent::DocumentBuilt {
            files: document.len(),
            ignored: ignored.len(),
            errors: errors.len(),
            chars: rendered.chars().count(),
        });

        let warnings: Vec<String> = errors.iter().map(ToString::to_string).collect();
        let files: Vec<String> = document.paths().map(String::from).collect();

        if document.is_empty() {
            self.logger.log(&LogEvent::NothingToReview {
                reason: "Every changed file was ignored or could not be processed.".to_string(),
            });
            return Ok(ReviewOutcome::NothingToReview {
                comparison,
                ignored,
                warnings,
            });
        }

        let Some(reviewer) = self.reviewer else {
            debug!(files = files.len(), "No reviewer configured, returning document");
            return Ok(ReviewOutcome::DryRun {
                comparison,
                files,
                ignored,
                warnings,
                document: rendered,
            });
        };

        let model = reviewer.model().to_string();
        self.logger.log(&LogEvent::ReviewRequested {
            model: model.clone(),
            chars: rendered.chars().count(),
        });

        let started = Instant::now();
        let review = reviewer.review(&rendered).await.map_err(|e| {
            warn!(error = %e, model = %model, "Review request failed");
            RunError::Review(e)
        })?;
        let duration_secs = started.elapsed().as_secs_f64();

        self.logger.log(&LogEvent::ReviewCompleted {
            model: model.clone(),
            duration_secs,
            review_chars: review.chars().count(),
        });
        info!(model = %model, files = files.len(), "Review completed");

        Ok(ReviewOutcome::Reviewed {
            comparison,
            files,
            ignored,
            warnings,
            model,
            review,
            duration_secs,
        })
    }

    /// Work out the branches, their branch point, and the diff between them.
    /// Any failure here aborts the run.
    async fn resolve_comparison(&self) -> Result<Comparison, RunError> {
        let current = self
            .vcs
            .current_branch()
            .await
            .map_err(RunError::at(ComparisonStage::CurrentBranch))?;
        let base = self.vcs.base_branch().await;

        let merge_base = self
            .vcs
            .merge_base(current.as_str(), &base.name)
            .await
            .map_err(RunError::at(ComparisonStage::MergeBase))?;

        let changed_files = self
            .vcs
            .changed_files(merge_base.as_str(), current.as_str())
            .await
            .map_err(RunError::at(ComparisonStage::ChangedFiles))?;

        let raw_diff = self
            .vcs
            .raw_diff(merge_base.as_str(), current.as_str())
            .await
            .map_err(RunError::at(ComparisonStage::Diff))?;

        debug!(
            current = %current,
            base = %base.name,
            merge_base = %merge_base.short(),
            files = changed_files.len(),
            "Resolved comparison"
        );

        Ok(Comparison {
            branches: BranchPair {
                current: current.to_string(),
                base: base.name,
            },
            merge_base,
            base_is_fallback: base.is_fallback,
            changed_files,
            raw_diff,
        })
    }
}
