//! # code-review-diff
//!
//! Assembles the document a reviewer reads.
//!
//! The raw output of `git diff` is split into one segment per file. Each file
//! that survives the ignore patterns is paired with its content at the
//! comparison base, and the whole set is rendered as XML with every body
//! wrapped so that source text cannot break the markup.
//!
//! ## Key Types
//!
//! - [`IgnoreMatcher`] - Glob patterns that exclude files from review
//! - [`DiffDocumentBuilder`] - Splits, filters, and enriches the raw diff
//! - [`DiffDocument`] - The rendered result
//! - [`FileError`] - A per-file problem that did not stop the build

mod builder;
mod document;
mod error;
mod ignore;
mod segment;

pub use builder::{BuildOutput, DiffDocumentBuilder};
pub use document::{
    cdata, escape_attribute, xml_safe, DiffDocument, FileEntry, OriginalContent,
    UNABLE_TO_RETRIEVE,
};
pub use error::FileError;
pub use ignore::{split_patterns, IgnoreMatcher};
pub use segment::{extract_path, split_segments, FILE_HEADER_MARKER};
