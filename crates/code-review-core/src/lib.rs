//! # code-review-core
//!
//! Runs a review from start to finish.
//!
//! ## Key Types
//!
//! - [`ReviewRunner`] - Resolves the comparison, builds the document, asks the reviewer
//! - [`ReviewRequest`] - Working directory and ignore patterns for one run
//! - [`Comparison`] - Branches, branch point, and raw diff being reviewed
//! - [`ReviewOutcome`] - How the run ended
//!
//! ## Failure handling
//!
//! Problems resolving the comparison and reviewer failures abort the run with
//! [`RunError`]. Problems with a single file become warnings on the outcome.

mod comparison;
mod error;
mod outcome;
mod runner;

pub use comparison::Comparison;
pub use error::{ComparisonStage, RunError};
pub use outcome::ReviewOutcome;
pub use runner::{ReviewRequest, ReviewRunner};
