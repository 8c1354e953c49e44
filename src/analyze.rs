//! Classify the commits of a range against a [`TargetSpec`].

use std::fmt;

use thiserror::Error;

use crate::git::{self, Git};
use crate::target::TargetSpec;

/// The author identity of a commit. Kept separate from the committer, which
/// is whatever the environment assigns when the commit is rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
    /// Author date in git's raw `<seconds> <offset>` form.
    pub date: String,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Read-only snapshot of one commit in the range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub id: String,
    pub parents: Vec<String>,
    pub message: String,
    pub author: Author,
    /// Changed paths; merges are diffed against their first parent.
    pub paths: Vec<String>,
    /// True when the commit touches both target and non-target paths.
    pub needs_split: bool,
}

impl ChangeRecord {
    /// Build a record and derive `needs_split` from `paths`.
    pub fn new(
        id: String,
        parents: Vec<String>,
        message: String,
        author: Author,
        paths: Vec<String>,
        targets: &TargetSpec,
    ) -> Self {
        let needs_split = needs_split(&paths, targets);
        Self {
            id,
            parents,
            message,
            author,
            paths,
            needs_split,
        }
    }

    pub fn short_id(&self) -> &str {
        &self.id[..7.min(self.id.len())]
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// A commit needs splitting only if it mixes target and non-target paths.
pub fn needs_split(paths: &[String], targets: &TargetSpec) -> bool {
    let has_target = paths.iter().any(|p| targets.matches(p));
    let has_other = paths.iter().any(|p| !targets.matches(p));
    has_target && has_other
}

/// Walks a commit range and classifies each commit.
pub struct RangeAnalyzer<'a> {
    git: &'a Git,
    targets: &'a TargetSpec,
}

impl<'a> RangeAnalyzer<'a> {
    pub fn new(git: &'a Git, targets: &'a TargetSpec) -> Self {
        Self { git, targets }
    }

    /// Analyze `from..to` (exclusive, inclusive), oldest first.
    pub fn analyze_range(&self, from: &str, to: &str) -> Result<Vec<ChangeRecord>, Error> {
        let ids = self.git.rev_list(from, to).map_err(|source| Error::Retrieval {
            rev: format!("{from}..{to}"),
            source,
        })?;

        let records = ids
            .into_iter()
            .map(|id| self.analyze_commit(id))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            from,
            to,
            commits = records.len(),
            flagged = records.iter().filter(|r| r.needs_split).count(),
            "analyzed range"
        );
        Ok(records)
    }

    fn analyze_commit(&self, id: String) -> Result<ChangeRecord, Error> {
        let retrieval = |source| Error::Retrieval {
            rev: id.clone(),
            source,
        };

        let raw = self
            .git
            .show_format(&id, "%P%x00%an%x00%ae%x00%ad%x00%B")
            .map_err(retrieval)?;
        let mut fields = raw.splitn(5, '\0');
        let mut next = || fields.next().unwrap_or_default();

        let parents: Vec<String> = next().split_whitespace().map(str::to_string).collect();
        let author = Author {
            name: next().to_string(),
            email: next().to_string(),
            date: next().to_string(),
        };
        let message = next().trim_end().to_string();

        let paths = self
            .git
            .changed_paths(&id, parents.first().map(String::as_str))
            .map_err(retrieval)?;

        Ok(ChangeRecord::new(id, parents, message, author, paths, self.targets))
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read history for '{rev}'")]
    Retrieval {
        rev: String,
        #[source]
        source: git::Error,
    },
}
