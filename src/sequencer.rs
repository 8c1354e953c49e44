//! Drive a rewrite session through its pause points.
//!
//! The session runs once over the whole range. It stops at every
//! [`Action::PauseForEdit`](crate::plan::Action::PauseForEdit) instruction,
//! hands control to a split callback, and resumes until the plan is
//! exhausted or the mechanism stops on something that is not ours.

use thiserror::Error;

use crate::git;
use crate::guard::SessionStatus;
use crate::plan::{Instruction, RewritePlan};
use crate::split;

/// The capability to replay a range of commits onto a base, stopping at
/// designated points.
///
/// Each call reports the [`SessionStatus`] observed once the mechanism has
/// returned control.
pub trait RewriteMechanism {
    /// Start a session following `plan`.
    fn begin(&mut self, plan: &RewritePlan) -> Result<SessionStatus, git::Error>;

    /// Observe the current state without advancing.
    fn status(&self) -> Result<SessionStatus, git::Error>;

    /// Advance past the current pause point.
    fn resume(&mut self) -> Result<SessionStatus, git::Error>;

    /// Abandon the session and restore the state it started from.
    fn abort(&mut self) -> Result<(), git::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Running,
    /// Stopped at the flagged commit with this original id.
    PausedForEdit(String),
    Completed,
    /// Stopped on paths that need manual resolution.
    Blocked(Vec<String>),
    Aborted,
}

pub struct RewriteSequencer<'p, M> {
    mechanism: M,
    plan: &'p RewritePlan,
    state: SessionState,
}

impl<'p, M: RewriteMechanism> RewriteSequencer<'p, M> {
    pub fn new(mechanism: M, plan: &'p RewritePlan) -> Self {
        Self {
            mechanism,
            plan,
            state: SessionState::NotStarted,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run the session to completion, calling `split` at every pause point.
    ///
    /// A failing callback aborts the session before the error is returned.
    /// Conflicts leave the session in place for the operator.
    pub fn run<F>(&mut self, mut split: F) -> Result<(), Error>
    where
        F: FnMut(&Instruction) -> Result<(), split::Error>,
    {
        let plan = self.plan;
        let mut pauses = plan.pause_points();

        let existing = self.mechanism.status()?;
        if existing != SessionStatus::NotInSession {
            return Err(Error::AlreadyInProgress(existing.describe()));
        }

        self.state = SessionState::Running;
        let mut status = self.mechanism.begin(plan)?;

        loop {
            match status {
                SessionStatus::NotInSession => {
                    let remaining: Vec<String> = pauses.by_ref().map(|i| i.id.clone()).collect();
                    if !remaining.is_empty() {
                        self.state = SessionState::Aborted;
                        return Err(Error::EndedEarly { remaining });
                    }
                    self.state = SessionState::Completed;
                    return Ok(());
                }
                SessionStatus::PausedClean => {
                    let Some(instruction) = pauses.next() else {
                        self.abort();
                        return Err(Error::UnexpectedStop);
                    };

                    self.state = SessionState::PausedForEdit(instruction.id.clone());
                    tracing::debug!(commit = %instruction.id, "paused for split");

                    if let Err(source) = split(instruction) {
                        self.abort();
                        return Err(Error::Split {
                            id: instruction.id.clone(),
                            source,
                        });
                    }

                    self.state = SessionState::Running;
                    status = self.mechanism.resume()?;
                }
                SessionStatus::PausedWithConflicts(paths)
                | SessionStatus::PausedWithStaged(paths) => {
                    self.state = SessionState::Blocked(paths.clone());
                    return Err(Error::Blocked { paths });
                }
            }
        }
    }

    fn abort(&mut self) {
        if let Err(e) = self.mechanism.abort() {
            tracing::warn!(error = %e, "failed to abort rewrite session");
        }
        self.state = SessionState::Aborted;
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("rewrite mechanism failed")]
    Mechanism(#[from] git::Error),

    #[error("a rebase is already in progress ({0}); finish or abort it first")]
    AlreadyInProgress(String),

    #[error(
        "rebase stopped due to conflicts:\nMerge conflicts in: {}\n\nTo resolve:\n\
         1. Manually resolve conflicts in the affected files\n\
         2. Run: git add <resolved-files>\n\
         3. Run: git rebase --continue\n\
         4. Or run: git rebase --abort to cancel",
        .paths.join(", ")
    )]
    Blocked { paths: Vec<String> },

    #[error("failed to split commit {id}")]
    Split {
        id: String,
        #[source]
        source: split::Error,
    },

    #[error("rebase finished without stopping at: {}", .remaining.join(", "))]
    EndedEarly { remaining: Vec<String> },

    #[error("rebase stopped after every planned split was done")]
    UnexpectedStop,
}
