use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    BaseBranch, ChangedFile, CommandRunner, CommitRef, FileContentSnapshot, GitError,
    ProcessRunner, VersionControl,
};

/// Branch compared against when the current branch has no upstream
pub const DEFAULT_BASE_BRANCH: &str = "develop";

/// Git's notation for the previously checked-out branch
pub const PREVIOUS_BRANCH: &str = "@{-1}";

/// `VersionControl` backed by the `git` executable
pub struct GitClient<R = ProcessRunner> {
    runner: R,
}

impl GitClient<ProcessRunner> {
    /// Run git inside `working_dir`, optionally bounding each call
    pub fn in_dir(working_dir: PathBuf, timeout: Option<Duration>) -> Self {
        let mut runner = ProcessRunner::new().with_working_dir(working_dir);
        if let Some(timeout) = timeout {
            runner = runner.with_timeout(timeout);
        }
        Self::with_runner(runner)
    }
}

impl<R: CommandRunner> GitClient<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    async fn git(&self, args: &[&str]) -> Result<String, GitError> {
        self.runner.exec("git", args).await
    }
}

/// The path used to look a file up at a ref.
///
/// Rename notation such as `old/path.go -> new/path.go` is reduced to its first
/// token; renames are not otherwise followed.
fn lookup_path(path: &str) -> Option<&str> {
    path.split_whitespace().next()
}

#[async_trait]
impl<R: CommandRunner> VersionControl for GitClient<R> {
    async fn current_branch(&self) -> Result<CommitRef, GitError> {
        let branch = self.git(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        Ok(CommitRef::new(branch))
    }

    async fn base_branch(&self) -> BaseBranch {
        match self
            .git(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"])
            .await
        {
            Ok(upstream) if !upstream.is_empty() => BaseBranch {
                name: upstream,
                is_fallback: false,
            },
            Ok(_) => {
                warn!(
                    fallback = DEFAULT_BASE_BRANCH,
                    "Upstream branch is empty, using default base branch"
                );
                BaseBranch {
                    name: DEFAULT_BASE_BRANCH.to_string(),
                    is_fallback: true,
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = DEFAULT_BASE_BRANCH,
                    "No upstream branch configured, using default base branch"
                );
                BaseBranch {
                    name: DEFAULT_BASE_BRANCH.to_string(),
                    is_fallback: true,
                }
            }
        }
    }

    async fn merge_base(&self, a: &str, b: &str) -> Result<CommitRef, GitError> {
        let base = self.git(&["merge-base", a, b]).await?;
        if base.is_empty() {
            return Err(GitError::NoMergeBase(a.to_string(), b.to_string()));
        }
        debug!(a, b, merge_base = %base, "Resolved merge base");
        Ok(CommitRef::new(base))
    }

    async fn changed_files(&self, base: &str, head: &str) -> Result<Vec<ChangedFile>, GitError> {
        let output = self.git(&["diff", "--name-only", base, head]).await?;
        Ok(ChangedFile::parse_list(&output))
    }

    async fn raw_diff(&self, base: &str, head: &str) -> Result<String, GitError> {
        self.git(&["diff", base, head]).await
    }

    async fn file_content_at(
        &self,
        path: &str,
        at: &CommitRef,
    ) -> Result<FileContentSnapshot, GitError> {
        let lookup = lookup_path(path).ok_or_else(|| GitError::InvalidPath(path.to_string()))?;
        let object = format!("{}:{}", at, lookup);

        match self.git(&["cat-file", "-e", &object]).await {
            Ok(_) => {}
            Err(e) if e.is_unknown_object() => {
                debug!(path = lookup, at = %at, "File absent at base, treating as new");
                return Ok(FileContentSnapshot::NewFile);
            }
            Err(e) => return Err(e),
        }

        let content = self.git(&["show", &object]).await?;
        Ok(FileContentSnapshot::Existing(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::render_command;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers commands from a table keyed by the full command line
    #[derive(Default)]
    struct ScriptedRunner {
        responses: HashMap<String, Result<String, String>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn ok(mut self, command: &str, stdout: &str) -> Self {
            self.responses
                .insert(command.to_string(), Ok(stdout.to_string()));
            self
        }

        fn fail(mut self, command: &str, stderr: &str) -> Self {
            self.responses
                .insert(command.to_string(), Err(stderr.to_string()));
            self
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn exec(&self, program: &str, args: &[&str]) -> Result<String, GitError> {
            let command = render_command(program, args);
            self.calls.lock().unwrap().push(command.clone());
            match self.responses.get(&command) {
                Some(Ok(stdout)) => Ok(stdout.clone()),
                Some(Err(stderr)) => Err(GitError::CommandFailed {
                    command,
                    status: "exit status: 128".into(),
                    stderr: stderr.clone(),
                }),
                None => Err(GitError::CommandFailed {
                    command: command.clone(),
                    status: "exit status: 1".into(),
                    stderr: format!("unscripted command: {command}"),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_current_branch() {
        let client = GitClient::with_runner(
            ScriptedRunner::default().ok("git rev-parse --abbrev-ref HEAD", "feature/login"),
        );
        assert_eq!(client.current_branch().await.unwrap().as_str(), "feature/login");
    }

    #[tokio::test]
    async fn test_current_branch_failure() {
        let client = GitClient::with_runner(
            ScriptedRunner::default()
                .fail("git rev-parse --abbrev-ref HEAD", "fatal: not a git repository"),
        );
        let err = client.current_branch().await.unwrap_err();
        assert!(err.to_string().contains("not a git repository"));
    }

    #[tokio::test]
    async fn test_base_branch_from_upstream() {
        let client = GitClient::with_runner(ScriptedRunner::default().ok(
            "git rev-parse --abbrev-ref --symbolic-full-name @{u}",
            "origin/main",
        ));
        let base = client.base_branch().await;
        assert_eq!(base.name, "origin/main");
        assert!(!base.is_fallback);
    }

    #[tokio::test]
    async fn test_base_branch_falls_back_without_upstream() {
        let client = GitClient::with_runner(ScriptedRunner::default().fail(
            "git rev-parse --abbrev-ref --symbolic-full-name @{u}",
            "fatal: no upstream configured for branch 'feature/login'",
        ));
        let base = client.base_branch().await;
        assert_eq!(base.name, DEFAULT_BASE_BRANCH);
        assert!(base.is_fallback);
    }

    #[tokio::test]
    async fn test_merge_base_without_common_history() {
        let client = GitClient::with_runner(
            ScriptedRunner::default().fail("git merge-base feature develop", ""),
        );
        assert!(client.merge_base("feature", "develop").await.is_err());

        let client =
            GitClient::with_runner(ScriptedRunner::default().ok("git merge-base a b", ""));
        assert!(matches!(
            client.merge_base("a", "b").await,
            Err(GitError::NoMergeBase(_, _))
        ));
    }

    #[tokio::test]
    async fn test_changed_files_and_diff() {
        let client = GitClient::with_runner(
            ScriptedRunner::default()
                .ok("git diff --name-only abc123 feature", "src/a.rs\ndocs/b.md")
                .ok("git diff abc123 feature", "diff --git a/src/a.rs b/src/a.rs"),
        );
        let files = client.changed_files("abc123", "feature").await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].path, "docs/b.md");
        let diff = client.raw_diff("abc123", "feature").await.unwrap();
        assert!(diff.starts_with("diff --git"));
    }

    #[tokio::test]
    async fn test_file_content_existing() {
        let client = GitClient::with_runner(
            ScriptedRunner::default()
                .ok("git cat-file -e abc123:src/lib.rs", "")
                .ok("git show abc123:src/lib.rs", "fn main() {}"),
        );
        let snapshot = client
            .file_content_at("src/lib.rs", &CommitRef::from("abc123"))
            .await
            .unwrap();
        assert_eq!(snapshot.content(), Some("fn main() {}"));
    }

    #[tokio::test]
    async fn test_file_content_new_file_sentinel() {
        let client = GitClient::with_runner(ScriptedRunner::default().fail(
            "git cat-file -e abc123:src/new.rs",
            "fatal: path 'src/new.rs' does not exist in 'abc123'",
        ));
        let snapshot = client
            .file_content_at("src/new.rs", &CommitRef::from("abc123"))
            .await
            .unwrap();
        assert!(snapshot.is_new());
    }

    #[tokio::test]
    async fn test_file_content_probe_failure_is_error() {
        let client = GitClient::with_runner(ScriptedRunner::default().fail(
            "git cat-file -e abc123:src/lib.rs",
            "fatal: unable to read tree",
        ));
        let result = client
            .file_content_at("src/lib.rs", &CommitRef::from("abc123"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_file_content_uses_first_token_of_rename() {
        let runner = ScriptedRunner::default()
            .ok("git cat-file -e abc123:old/path.go", "")
            .ok("git show abc123:old/path.go", "package old");
        let client = GitClient::with_runner(runner);
        let snapshot = client
            .file_content_at("old/path.go -> new/path.go", &CommitRef::from("abc123"))
            .await
            .unwrap();
        assert_eq!(snapshot.content(), Some("package old"));

        let calls = client.runner.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                "git cat-file -e abc123:old/path.go".to_string(),
                "git show abc123:old/path.go".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_file_content_blank_path() {
        let client = GitClient::with_runner(ScriptedRunner::default());
        let result = client.file_content_at("   ", &CommitRef::from("abc")).await;
        assert!(matches!(result, Err(GitError::InvalidPath(_))));
    }
}
