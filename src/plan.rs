//! The fixed instruction list a rewrite session follows.

use crate::analyze::ChangeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Reapply the commit as-is.
    Replay,
    /// Reapply the commit, then stop so it can be split.
    PauseForEdit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub action: Action,
    pub id: String,
    /// Merges are replayed as their net change against the first parent.
    pub merge: bool,
}

/// One instruction per commit of the range, oldest first.
///
/// Built once from the analyzed records before the session starts and never
/// rebuilt; the ids are those of the original history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewritePlan {
    base: String,
    instructions: Vec<Instruction>,
}

impl RewritePlan {
    pub fn new(base: &str, records: &[ChangeRecord]) -> Self {
        let instructions = records
            .iter()
            .map(|record| Instruction {
                action: if record.needs_split {
                    Action::PauseForEdit
                } else {
                    Action::Replay
                },
                id: record.id.clone(),
                merge: record.is_merge(),
            })
            .collect();

        Self {
            base: base.to_string(),
            instructions,
        }
    }

    /// The exclusive lower bound the range is replayed onto.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Instructions that stop the session, in order.
    pub fn pause_points(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions
            .iter()
            .filter(|i| i.action == Action::PauseForEdit)
    }
}
