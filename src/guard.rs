//! Inspect the state a rebase leaves behind.

use crate::git::{self, Git, StatusEntry};

/// What the working area looks like after the rewrite mechanism returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// No rebase in progress.
    NotInSession,
    /// Stopped with a clean tree, ready for editing.
    PausedClean,
    /// Stopped on unmerged paths.
    PausedWithConflicts(Vec<String>),
    /// Stopped with changes staged but not committed.
    PausedWithStaged(Vec<String>),
}

impl SessionStatus {
    /// Classify the working tree status of an in-progress session.
    pub fn from_entries(entries: &[StatusEntry]) -> Self {
        let conflicts: Vec<String> = entries
            .iter()
            .filter(|e| e.is_conflicted())
            .map(|e| e.path.clone())
            .collect();
        if !conflicts.is_empty() {
            return Self::PausedWithConflicts(conflicts);
        }

        let staged: Vec<String> = entries
            .iter()
            .filter(|e| e.is_staged())
            .map(|e| e.path.clone())
            .collect();
        if !staged.is_empty() {
            return Self::PausedWithStaged(staged);
        }

        Self::PausedClean
    }

    pub fn describe(&self) -> String {
        match self {
            Self::NotInSession => "No rebase in progress".to_string(),
            Self::PausedClean => "Rebase in progress - ready for editing".to_string(),
            Self::PausedWithConflicts(paths) => {
                format!("Merge conflicts in: {}", paths.join(", "))
            }
            Self::PausedWithStaged(paths) => {
                format!("Changes ready to commit: {}", paths.join(", "))
            }
        }
    }
}

/// Reads the rebase state of a repository.
pub struct ConflictGuard<'a> {
    git: &'a Git,
}

impl<'a> ConflictGuard<'a> {
    pub fn new(git: &'a Git) -> Self {
        Self { git }
    }

    /// Whether git's own rebase state directory exists.
    pub fn in_session(&self) -> Result<bool, git::Error> {
        for dir in ["rebase-merge", "rebase-apply"] {
            if self.git.git_path(dir)?.is_dir() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn inspect(&self) -> Result<SessionStatus, git::Error> {
        if !self.in_session()? {
            return Ok(SessionStatus::NotInSession);
        }

        let status = SessionStatus::from_entries(&self.git.status()?);
        tracing::debug!(status = %status.describe(), "inspected rebase state");
        Ok(status)
    }
}
