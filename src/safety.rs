//! Backup and recovery around a history rewrite.
//!
//! Nothing is mutated until the working tree is known to be clean and the
//! recovery command for the original tip has been printed.

use crate::git::{self, Git};
use crate::guard::ConflictGuard;

/// Where the branch pointed before the rewrite started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryAnchor {
    /// Full id of HEAD before any mutation.
    pub tip: String,
    /// Checked-out branch, `None` on a detached HEAD.
    pub branch: Option<String>,
    /// Backup branch, once created.
    pub backup: Option<String>,
}

impl RecoveryAnchor {
    pub fn recovery_command(&self) -> String {
        format!("git reset --hard {}", self.tip)
    }

    /// `<branch>-backup-<run_id>`, or `detached-backup-<run_id>` without a branch.
    pub fn backup_name(&self, run_id: &str) -> String {
        let branch = self.branch.as_deref().unwrap_or("detached");
        format!("{branch}-backup-{run_id}")
    }
}

pub struct SafetyNet<'a> {
    git: &'a Git,
    run_id: &'a str,
}

impl<'a> SafetyNet<'a> {
    pub fn new(git: &'a Git, run_id: &'a str) -> Self {
        Self { git, run_id }
    }

    /// Check that no rebase is in progress and the working tree is clean,
    /// capture HEAD and print the recovery command.
    pub fn arm(&self) -> Result<RecoveryAnchor, Error> {
        if ConflictGuard::new(self.git).in_session()? {
            return Err(Error::RebaseInProgress);
        }

        let dirty: Vec<String> = self.git.status()?.into_iter().map(|e| e.path).collect();
        if !dirty.is_empty() {
            return Err(Error::Dirty { paths: dirty });
        }

        let anchor = RecoveryAnchor {
            tip: self.git.rev_parse("HEAD")?,
            branch: self.git.current_branch()?,
            backup: None,
        };
        println!("To recover the repository state: {}", anchor.recovery_command());
        Ok(anchor)
    }

    /// Create the backup branch at the captured tip.
    pub fn create_backup(&self, anchor: &mut RecoveryAnchor) -> Result<(), Error> {
        let name = anchor.backup_name(self.run_id);
        self.git.create_branch(&name, &anchor.tip)?;
        tracing::debug!(backup = %name, tip = %anchor.tip, "created backup branch");
        println!("Created backup branch: {name}");
        anchor.backup = Some(name);
        Ok(())
    }

    /// Put HEAD back on the captured tip if an aborted session left it elsewhere.
    pub fn restore(&self, anchor: &RecoveryAnchor) -> Result<(), Error> {
        let head = self.git.rev_parse("HEAD")?;
        if head != anchor.tip {
            tracing::warn!(head = %head, tip = %anchor.tip, "HEAD moved, resetting to original tip");
            self.git.reset_hard(&anchor.tip)?;
        }
        Ok(())
    }

    pub fn report_success(&self, anchor: &RecoveryAnchor) {
        println!("\n✅ Successfully split commits. If you need to revert:");
        println!("  {}", anchor.recovery_command());
    }

    pub fn report_failure(&self, anchor: &RecoveryAnchor) {
        println!("\n🚨 Rebase failed. To recover:");
        println!("  {}", anchor.recovery_command());
        if let Some(backup) = &anchor.backup {
            println!("  (the original history is also kept on branch {backup})");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "working directory is not clean. Please commit or stash changes first:\n{}",
        .paths.join("\n")
    )]
    Dirty { paths: Vec<String> },

    #[error("a rebase is already in progress; finish it or run `git rebase --abort` first")]
    RebaseInProgress,

    #[error(transparent)]
    Git(#[from] git::Error),
}
