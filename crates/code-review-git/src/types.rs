use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved point in history: a commit hash or a symbolic name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitRef(String);

impl CommitRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display (first 7 characters)
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for CommitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CommitRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CommitRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The base branch a comparison runs against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseBranch {
    pub name: String,
    /// True when no upstream was configured and the default name was used
    pub is_fallback: bool,
}

/// The branch being reviewed and the branch it is compared against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPair {
    pub current: String,
    pub base: String,
}

/// A path reported by `git diff --name-only`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
}

impl ChangedFile {
    /// One entry per output line. Duplicates are kept as reported.
    pub fn parse_list(output: &str) -> Vec<ChangedFile> {
        if output.is_empty() {
            return Vec::new();
        }
        output
            .split('\n')
            .map(|line| ChangedFile {
                path: line.to_string(),
            })
            .collect()
    }
}

/// Content of a file at the comparison base
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContentSnapshot {
    Existing(String),
    /// The file did not exist at that point
    NewFile,
}

impl FileContentSnapshot {
    pub fn is_new(&self) -> bool {
        matches!(self, FileContentSnapshot::NewFile)
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            FileContentSnapshot::Existing(content) => Some(content),
            FileContentSnapshot::NewFile => None,
        }
    }
}
