//! Re-partition a paused commit into a retained half and an extracted half.

use std::fmt;

use thiserror::Error;

use crate::analyze::ChangeRecord;
use crate::git::{self, Git};
use crate::message::generate_split_messages;
use crate::target::TargetSpec;

/// The steps of a split, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStep {
    VerifyPause,
    ReleaseCommit,
    StageAll,
    ReadStaged,
    CommitRetained,
    CommitExtracted,
}

impl fmt::Display for SplitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::VerifyPause => "verify the paused commit",
            Self::ReleaseCommit => "reset the paused commit",
            Self::StageAll => "stage files",
            Self::ReadStaged => "read staged files",
            Self::CommitRetained => "create first split commit",
            Self::CommitExtracted => "create second split commit",
        };
        f.write_str(text)
    }
}

/// Splits the commit a rewrite session is paused at.
pub struct ChangeSetSplitter<'a> {
    git: &'a Git,
    targets: &'a TargetSpec,
    debug: bool,
}

impl<'a> ChangeSetSplitter<'a> {
    pub fn new(git: &'a Git, targets: &'a TargetSpec, debug: bool) -> Self {
        Self {
            git,
            targets,
            debug,
        }
    }

    /// Replace HEAD, which must be the replayed form of `record`, with two
    /// commits: non-target paths first, target paths second. Both keep the
    /// original author and author date.
    pub fn split(&self, record: &ChangeRecord) -> Result<(), Error> {
        tracing::debug!(commit = %record.short_id(), "starting to split commit");

        let expected = self
            .git
            .tree_of(&record.id)
            .map_err(step(SplitStep::VerifyPause))?;
        let found = self
            .git
            .tree_of("HEAD")
            .map_err(step(SplitStep::VerifyPause))?;
        if expected != found {
            return Err(Error::UnexpectedCommit {
                expected: record.short_id().to_string(),
            });
        }

        self.git
            .reset_soft("HEAD^")
            .map_err(step(SplitStep::ReleaseCommit))?;
        self.debug_status("after resetting commit");

        self.git.add_all().map_err(step(SplitStep::StageAll))?;
        let pending = self.git.staged_paths().map_err(step(SplitStep::ReadStaged))?;
        let (_, extracted) = self.targets.partition(&pending);

        for path in &extracted {
            if let Err(e) = self.git.unstage(path) {
                // The path may not be in the index; the second commit picks up whatever is left.
                tracing::debug!(path = %path, error = %e, "unstage failed");
            }
        }
        self.debug_status("after unstaging target files");

        let messages = generate_split_messages(&record.message, self.targets);
        let author = record.author.to_string();
        tracing::debug!(author = %author, message = ?messages.retained, "creating first commit");
        self.git
            .commit_as(&messages.retained, &author, &record.author.date)
            .map_err(step(SplitStep::CommitRetained))?;
        self.debug_status("after first commit");

        let mut added = 0;
        for path in &extracted {
            if self.stage_target(path) {
                added += 1;
            }
        }
        tracing::debug!(added, "restaged target files");
        if added == 0 {
            return Err(Error::NothingStaged);
        }
        let staged = self.git.staged_paths().map_err(step(SplitStep::ReadStaged))?;
        if staged.is_empty() {
            return Err(Error::NothingStaged);
        }

        tracing::debug!(author = %author, message = ?messages.extracted, "creating second commit");
        self.git
            .commit_as(&messages.extracted, &author, &record.author.date)
            .map_err(step(SplitStep::CommitExtracted))?;
        self.debug_status("after second commit");

        tracing::info!(
            commit = %record.short_id(),
            retained = pending.len() - extracted.len(),
            extracted = extracted.len(),
            "split commit"
        );
        Ok(())
    }

    /// Stage a target path, retrying with `--force` for ignored files.
    fn stage_target(&self, path: &str) -> bool {
        match self.git.add_path(path, false) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "add failed, retrying with --force");
                match self.git.add_path(path, true) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::debug!(path = %path, error = %e, "force add failed");
                        false
                    }
                }
            }
        }
    }

    fn debug_status(&self, label: &str) {
        if !self.debug {
            return;
        }

        match self.git.status() {
            Ok(entries) if entries.is_empty() => {
                tracing::debug!("git status {label}: working directory clean");
            }
            Ok(entries) => {
                for entry in entries {
                    tracing::debug!(
                        "git status {label}: {}{} {}",
                        entry.staged,
                        entry.unstaged,
                        entry.path
                    );
                }
            }
            Err(e) => tracing::debug!(error = %e, "failed to get git status {label}"),
        }

        match self.git.staged_paths() {
            Ok(staged) if staged.is_empty() => tracing::debug!("no staged changes"),
            Ok(staged) => tracing::debug!(staged = ?staged, "staged changes"),
            Err(e) => tracing::debug!(error = %e, "failed to get staged changes"),
        }
    }
}

fn step(step: SplitStep) -> impl Fn(git::Error) -> Error {
    move |source| Error::Step { step, source }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to {step}")]
    Step {
        step: SplitStep,
        #[source]
        source: git::Error,
    },

    #[error("no target files were successfully staged for second commit")]
    NothingStaged,

    #[error("rebase paused at a commit whose content differs from {expected}")]
    UnexpectedCommit { expected: String },
}
