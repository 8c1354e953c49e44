//! Run the extraction: analyze, back up, rewrite.

use std::collections::HashMap;

use thiserror::Error;

use crate::advisor;
use crate::analyze::{self, ChangeRecord, RangeAnalyzer};
use crate::git::{self, Git};
use crate::plan::RewritePlan;
use crate::rebase::GitRebase;
use crate::report::DryRunReporter;
use crate::safety::{self, RecoveryAnchor, SafetyNet};
use crate::sequencer::{self, RewriteSequencer};
use crate::split::{self, ChangeSetSplitter};
use crate::target::TargetSpec;

/// Settings for one run, passed in explicitly rather than read from
/// process-wide state.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Distinguishes this run's backup branch from other runs'.
    pub run_id: String,
    /// Log working tree status after every split step.
    pub debug: bool,
}

/// Splits the commits of a range that mix target and non-target changes.
pub struct Extractor {
    git: Git,
    targets: TargetSpec,
    config: ExtractConfig,
}

impl Extractor {
    pub fn new(git: Git, targets: TargetSpec, config: ExtractConfig) -> Self {
        Self {
            git,
            targets,
            config,
        }
    }

    /// Describe what [`Extractor::extract`] would do for `from..to`.
    pub fn dry_run(&self, from: &str, to: &str) -> Result<String, Error> {
        Ok(DryRunReporter::new(&self.git, &self.targets).preview(from, to)?)
    }

    /// Rewrite `from..HEAD`, splitting every commit that needs it.
    ///
    /// The recovery command is printed before anything is mutated and again
    /// at the end, whether the run succeeded or not.
    pub fn extract(&self, from: &str) -> Result<(), Error> {
        tracing::info!(
            root = %self.git.root().display(),
            targets = %self.targets,
            from,
            "extracting target changes"
        );

        let safety = SafetyNet::new(&self.git, &self.config.run_id);
        let mut anchor = safety.arm()?;

        let result = self.extract_armed(&safety, &mut anchor, from);
        if result.is_err() {
            safety.report_failure(&anchor);
        }
        result
    }

    fn extract_armed(
        &self,
        safety: &SafetyNet<'_>,
        anchor: &mut RecoveryAnchor,
        from: &str,
    ) -> Result<(), Error> {
        let base = self
            .git
            .rev_parse(from)
            .map_err(|source| analyze::Error::Retrieval {
                rev: from.to_string(),
                source,
            })?;
        // Reachable only through a merge's second parent is not enough: the
        // range is walked along first parents.
        if !self.git.first_parent_chain(&anchor.tip)?.contains(&base) {
            return Err(Error::NotAncestor(from.to_string()));
        }

        let records =
            RangeAnalyzer::new(&self.git, &self.targets).analyze_range(from, &anchor.tip)?;
        if !records.iter().any(|r| r.needs_split) {
            println!("No commits need splitting");
            return Ok(());
        }

        advisor::print_warnings(&advisor::find_potential_conflicts(&records));

        safety.create_backup(anchor)?;

        if let Err(e) = self.rewrite(from, &records) {
            if matches!(
                e,
                sequencer::Error::Split { .. }
                    | sequencer::Error::UnexpectedStop
                    | sequencer::Error::EndedEarly { .. }
            ) {
                if let Err(restore) = safety.restore(anchor) {
                    tracing::warn!(error = %restore, "failed to restore original tip");
                }
            }
            return Err(Error::Rewrite(e));
        }

        safety.report_success(anchor);
        Ok(())
    }

    fn rewrite(&self, from: &str, records: &[ChangeRecord]) -> Result<(), sequencer::Error> {
        let plan = RewritePlan::new(from, records);
        let by_id: HashMap<&str, &ChangeRecord> =
            records.iter().map(|r| (r.id.as_str(), r)).collect();
        let splitter = ChangeSetSplitter::new(&self.git, &self.targets, self.config.debug);

        let mut sequencer = RewriteSequencer::new(GitRebase::new(&self.git), &plan);
        let result = sequencer.run(|instruction| {
            let record = by_id
                .get(instruction.id.as_str())
                .ok_or_else(|| split::Error::UnexpectedCommit {
                    expected: instruction.id.clone(),
                })?;
            splitter.split(record)
        });
        tracing::debug!(state = ?sequencer.state(), "rewrite session finished");
        result
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Safety(#[from] safety::Error),

    #[error("failed to analyze commits")]
    Analyze(#[from] analyze::Error),

    #[error("'{0}' is not on the first-parent history of HEAD")]
    NotAncestor(String),

    #[error(transparent)]
    Git(#[from] git::Error),

    #[error("rebase failed")]
    Rewrite(#[source] sequencer::Error),
}
