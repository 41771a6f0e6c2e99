use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

/// One user-supplied pattern, compiled once
#[derive(Debug, Clone)]
struct IgnorePattern {
    raw: String,
    /// None when the glob failed to compile; such a pattern never matches
    matcher: Option<GlobMatcher>,
    /// Patterns without a `/` are also tried against the file name alone
    match_basename: bool,
}

impl IgnorePattern {
    fn compile(raw: String) -> Self {
        let matcher = GlobBuilder::new(&raw)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map(|glob| glob.compile_matcher())
            .map_err(|e| debug!(pattern = %raw, error = %e, "Ignoring malformed glob"))
            .ok();
        let match_basename = !raw.contains('/');
        Self {
            raw,
            matcher,
            match_basename,
        }
    }

    fn matches(&self, path: &str) -> bool {
        let Some(ref matcher) = self.matcher else {
            return false;
        };
        if matcher.is_match(path) {
            return true;
        }
        self.match_basename && matcher.is_match(basename(path))
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Split a comma-separated pattern list, trimming each entry.
///
/// An empty input still yields one empty pattern.
pub fn split_patterns(list: &str) -> Vec<String> {
    list.split(',').map(|p| p.trim().to_string()).collect()
}

/// Decides which changed files are left out of the review.
///
/// A path is ignored when any pattern glob-matches the full relative path, or,
/// for patterns without a `/`, the final path segment. `*` and `?` never cross
/// a `/`, so `*.json` ignores JSON files in any directory while `docs/*.md`
/// only applies directly under `docs/`.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    patterns: Vec<IgnorePattern>,
}

impl IgnoreMatcher {
    /// Build from the comma-separated form accepted on the command line
    pub fn parse(list: &str) -> Self {
        Self::from_patterns(split_patterns(list))
    }

    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| IgnorePattern::compile(p.into()))
                .collect(),
        }
    }

    /// The patterns as given, in order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.raw.as_str())
    }

    /// True when no pattern can match a real path
    pub fn is_empty_set(&self) -> bool {
        self.patterns.iter().all(|p| p.raw.is_empty())
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}

impl Default for IgnoreMatcher {
    fn default() -> Self {
        Self::parse("")
    }
}
