//! Git repository operations.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// A git repository handle that provides common operations.
#[derive(Debug, Clone)]
pub struct Git {
    root: PathBuf,
}

/// One entry of `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Index status (`X`).
    pub staged: char,
    /// Working tree status (`Y`).
    pub unstaged: char,
    pub path: String,
}

impl StatusEntry {
    /// Both sides unmerged, or added/deleted by both.
    pub fn is_conflicted(&self) -> bool {
        self.staged == 'U'
            || self.unstaged == 'U'
            || (self.staged == 'A' && self.unstaged == 'A')
            || (self.staged == 'D' && self.unstaged == 'D')
    }

    pub fn is_staged(&self) -> bool {
        self.staged != ' ' && self.staged != '?'
    }
}

impl Git {
    /// Find the git repository root starting from the given directory.
    pub fn discover(start_dir: &Path) -> Result<Self, Error> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(start_dir)
            .output()
            .map_err(|e| Error::Exec(format!("git rev-parse: {e}")))?;

        if !output.status.success() {
            return Err(Error::NotARepo(start_dir.display().to_string()));
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Self {
            root: PathBuf::from(root),
        })
    }

    /// Get the repository root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a revision to a full commit id.
    pub fn rev_parse(&self, rev: &str) -> Result<String, Error> {
        let spec = format!("{rev}^{{commit}}");
        let output = self.run_output(&["rev-parse", "--verify", "--quiet", &spec])?;
        Ok(output.trim().to_string())
    }

    /// Resolve the tree id of a revision.
    pub fn tree_of(&self, rev: &str) -> Result<String, Error> {
        let spec = format!("{rev}^{{tree}}");
        let output = self.run_output(&["rev-parse", "--verify", "--quiet", &spec])?;
        Ok(output.trim().to_string())
    }

    /// Commits reachable from `tip` through first parents only, `tip` included.
    pub fn first_parent_chain(&self, tip: &str) -> Result<Vec<String>, Error> {
        let output = self.run_output(&["rev-list", "--first-parent", tip])?;
        Ok(output.split_whitespace().map(str::to_string).collect())
    }

    /// Name of the checked-out branch, or `None` on a detached HEAD.
    pub fn current_branch(&self) -> Result<Option<String>, Error> {
        let output = self.run_output(&["branch", "--show-current"])?;
        let name = output.trim();
        Ok((!name.is_empty()).then(|| name.to_string()))
    }

    /// Create a branch pointing at `start` without checking it out.
    pub fn create_branch(&self, name: &str, start: &str) -> Result<(), Error> {
        self.run(&["branch", name, start])
    }

    /// Resolve a path inside the git directory (`git rev-parse --git-path`).
    pub fn git_path(&self, name: &str) -> Result<PathBuf, Error> {
        let output = self.run_output(&["rev-parse", "--git-path", name])?;
        Ok(self.root.join(output.trim()))
    }

    /// Working tree status, including untracked files.
    pub fn status(&self) -> Result<Vec<StatusEntry>, Error> {
        let output = self.run_raw(&["status", "--porcelain", "-z"])?;
        Ok(parse_porcelain(&output.stdout))
    }

    /// Commits in `from..to` along the first-parent chain, oldest first.
    pub fn rev_list(&self, from: &str, to: &str) -> Result<Vec<String>, Error> {
        let range = format!("{from}..{to}");
        let output = self.run_output(&["rev-list", "--reverse", "--first-parent", &range])?;
        Ok(output.split_whitespace().map(str::to_string).collect())
    }

    /// Render a single commit with a `git log` pretty format.
    pub fn show_format(&self, rev: &str, format: &str) -> Result<String, Error> {
        let format = format!("--format={format}");
        self.run_output(&["log", "-1", "--date=raw", &format, rev, "--"])
    }

    /// Paths changed by `rev` relative to `parent`, or to the empty tree
    /// when there is no parent.
    pub fn changed_paths(&self, rev: &str, parent: Option<&str>) -> Result<Vec<String>, Error> {
        let output = match parent {
            Some(parent) => {
                self.run_raw(&["diff", "--name-only", "--no-renames", "-z", parent, rev, "--"])?
            }
            None => self.run_raw(&[
                "diff-tree",
                "--root",
                "--no-commit-id",
                "--name-only",
                "--no-renames",
                "-r",
                "-z",
                rev,
            ])?,
        };
        Ok(split_nul(&output.stdout))
    }

    /// Move HEAD to `rev`, keeping index and working tree.
    pub fn reset_soft(&self, rev: &str) -> Result<(), Error> {
        self.run(&["reset", "-q", "--soft", rev])
    }

    /// Move HEAD to `rev` and discard all changes.
    pub fn reset_hard(&self, rev: &str) -> Result<(), Error> {
        self.run(&["reset", "-q", "--hard", rev])
    }

    /// Stage all changes.
    pub fn add_all(&self) -> Result<(), Error> {
        self.run(&["add", "-A"])
    }

    /// Stage a single path, including deletions.
    pub fn add_path(&self, path: &str, force: bool) -> Result<(), Error> {
        if force {
            self.run(&["add", "-A", "--force", "--", path])
        } else {
            self.run(&["add", "-A", "--", path])
        }
    }

    /// Remove a path from the index, keeping the working tree copy.
    pub fn unstage(&self, path: &str) -> Result<(), Error> {
        self.run(&["reset", "-q", "HEAD", "--", path])
    }

    /// Paths with staged changes.
    pub fn staged_paths(&self) -> Result<Vec<String>, Error> {
        let output = self.run_raw(&["diff", "--cached", "--name-only", "--no-renames", "-z"])?;
        Ok(split_nul(&output.stdout))
    }

    /// Commit the index with an explicit author identity and author date.
    pub fn commit_as(&self, message: &str, author: &str, date: &str) -> Result<(), Error> {
        let author = format!("--author={author}");
        let date = format!("--date={date}");
        self.run(&["commit", "-q", "-m", message, &author, &date])
    }

    /// Start an interactive rebase onto `base` whose todo list is produced by
    /// `sequence_editor`. Returns whether git exited successfully; a rebase
    /// that stops at an `edit` line or a conflict leaves state behind either way.
    pub fn rebase_interactive(&self, base: &str, sequence_editor: &str) -> Result<bool, Error> {
        let output = self
            .rebase_command(sequence_editor)
            .args(["rebase", "-i", "--no-autosquash", base])
            .output()
            .map_err(|e| Error::Exec(format!("git rebase: {e}")))?;
        log_output("rebase -i", &output);
        Ok(output.status.success())
    }

    /// Continue a stopped rebase. Returns whether git exited successfully.
    pub fn rebase_continue(&self) -> Result<bool, Error> {
        let output = self
            .rebase_command("true")
            .args(["rebase", "--continue"])
            .output()
            .map_err(|e| Error::Exec(format!("git rebase: {e}")))?;
        log_output("rebase --continue", &output);
        Ok(output.status.success())
    }

    /// Abort the rebase in progress, restoring the original branch.
    pub fn rebase_abort(&self) -> Result<(), Error> {
        self.run(&["rebase", "--abort"])
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    fn rebase_command(&self, sequence_editor: &str) -> Command {
        let mut command = Command::new("git");
        command
            .current_dir(&self.root)
            .env("GIT_SEQUENCE_EDITOR", sequence_editor)
            .env("GIT_EDITOR", "true");
        command
    }

    /// Run a git command that produces no output we care about.
    fn run(&self, args: &[&str]) -> Result<(), Error> {
        self.run_raw(args).map(|_| ())
    }

    /// Run a git command and capture its stdout.
    fn run_output(&self, args: &[&str]) -> Result<String, Error> {
        let output = self.run_raw(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_raw(&self, args: &[&str]) -> Result<Output, Error> {
        tracing::trace!(args = ?args, "git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::Exec(format!("git {}: {e}", args.first().unwrap_or(&""))))?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(Error::Failed {
                command: format!("git {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

fn log_output(what: &str, output: &Output) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    tracing::debug!(
        status = %output.status,
        stdout = %stdout.trim(),
        stderr = %stderr.trim(),
        "git {what}"
    );
}

fn split_nul(bytes: &[u8]) -> Vec<String> {
    bytes
        .split(|&b| b == 0)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| String::from_utf8_lossy(chunk).to_string())
        .collect()
}

/// Parse `git status --porcelain -z` output.
///
/// Renames and copies carry their original path as an extra NUL-terminated
/// field, which is skipped.
pub fn parse_porcelain(bytes: &[u8]) -> Vec<StatusEntry> {
    let mut entries = Vec::new();
    let mut fields = bytes.split(|&b| b == 0).filter(|f| !f.is_empty());

    while let Some(field) = fields.next() {
        let line = String::from_utf8_lossy(field);
        let mut chars = line.chars();
        let (Some(staged), Some(unstaged)) = (chars.next(), chars.next()) else {
            continue;
        };
        let path = line.get(3..).unwrap_or_default().to_string();
        if matches!(staged, 'R' | 'C') {
            fields.next();
        }
        entries.push(StatusEntry {
            staged,
            unstaged,
            path,
        });
    }

    entries
}

/// Errors from git operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to execute: {0}")]
    Exec(String),

    #[error("not a git repository (searched from '{0}')")]
    NotARepo(String),

    #[error("`{command}` failed: {stderr}")]
    Failed { command: String, stderr: String },
}
