//! `git rebase -i` as a [`RewriteMechanism`].
//!
//! The plan is written as a todo list and handed to git through
//! `GIT_SEQUENCE_EDITOR`, so the rebase never waits for a human editor.

use std::io::Write;
use std::path::Path;

use crate::git::{self, Git};
use crate::guard::{ConflictGuard, SessionStatus};
use crate::plan::{Action, RewritePlan};
use crate::sequencer::RewriteMechanism;

pub struct GitRebase<'a> {
    git: &'a Git,
}

impl<'a> GitRebase<'a> {
    pub fn new(git: &'a Git) -> Self {
        Self { git }
    }

    /// Classify the state git left behind. A failed invocation that left no
    /// session behind is a hard error rather than a stop.
    fn observe(&self, command: &str, succeeded: bool) -> Result<SessionStatus, git::Error> {
        let status = ConflictGuard::new(self.git).inspect()?;
        if !succeeded && status == SessionStatus::NotInSession {
            return Err(git::Error::Failed {
                command: format!("git {command}"),
                stderr: "rebase exited with an error and left no session behind".to_string(),
            });
        }
        Ok(status)
    }
}

impl RewriteMechanism for GitRebase<'_> {
    fn begin(&mut self, plan: &RewritePlan) -> Result<SessionStatus, git::Error> {
        let todo = render_todo(plan);
        tracing::debug!(base = %plan.base(), todo = %todo, "starting rebase");

        let mut file = tempfile::Builder::new()
            .prefix("extract-file-todo-")
            .tempfile()
            .map_err(|e| git::Error::Exec(format!("failed to create todo list: {e}")))?;
        file.write_all(todo.as_bytes())
            .map_err(|e| git::Error::Exec(format!("failed to write todo list: {e}")))?;

        let editor = format!("cp {}", shell_quote(file.path()));
        let succeeded = self.git.rebase_interactive(plan.base(), &editor)?;
        self.observe("rebase -i", succeeded)
    }

    fn status(&self) -> Result<SessionStatus, git::Error> {
        ConflictGuard::new(self.git).inspect()
    }

    fn resume(&mut self) -> Result<SessionStatus, git::Error> {
        let succeeded = self.git.rebase_continue()?;
        self.observe("rebase --continue", succeeded)
    }

    fn abort(&mut self) -> Result<(), git::Error> {
        self.git.rebase_abort()
    }
}

/// Render the plan in git's todo-list syntax.
///
/// Merges cannot be picked directly; they are replayed with
/// `cherry-pick -m 1`, which applies their change against the first parent,
/// and a `break` stands in for `edit` when they need splitting.
pub fn render_todo(plan: &RewritePlan) -> String {
    let mut todo = String::new();
    for instruction in plan.instructions() {
        let id = &instruction.id;
        match (instruction.merge, instruction.action) {
            (false, Action::Replay) => todo.push_str(&format!("pick {id}\n")),
            (false, Action::PauseForEdit) => todo.push_str(&format!("edit {id}\n")),
            (true, action) => {
                todo.push_str(&format!("exec git cherry-pick --allow-empty -m 1 {id}\n"));
                if action == Action::PauseForEdit {
                    todo.push_str("break\n");
                }
            }
        }
    }
    todo
}

fn shell_quote(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', r"'\''"))
}
