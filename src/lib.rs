//! extract-file: split commits so changes to chosen files live in their own commits.
//!
//! Every commit in a range that touches both the target paths and other paths
//! is replaced by two commits: one with everything except the targets, one
//! with only the targets. Authorship and content are preserved; commits that
//! touch only one side are replayed unchanged.
//!
//! # Architecture
//!
//! - **Target**: which paths are extracted (exact paths and directory prefixes)
//! - **Analyze**: classify each commit of a range
//! - **Message**: derive the messages of the two halves
//! - **Sequencer**: drive a single `git rebase -i` session through its pause points
//! - **Split**: re-partition the commit a session is paused at
//! - **Guard**: tell our own pauses apart from conflicts
//! - **Safety**: backup branch and recovery command
//! - **Report**: dry-run preview

mod advisor;
mod analyze;
mod extract;
mod git;
mod guard;
mod message;
mod plan;
mod rebase;
mod report;
mod safety;
mod sequencer;
mod split;
mod target;

pub use advisor::find_potential_conflicts;
pub use analyze::{Author, ChangeRecord, RangeAnalyzer};
pub use extract::{Error, ExtractConfig, Extractor};
pub use git::Git;
pub use guard::{ConflictGuard, SessionStatus};
pub use message::{SplitMessages, generate_split_messages};
pub use plan::{Action, Instruction, RewritePlan};
pub use rebase::GitRebase;
pub use report::DryRunReporter;
pub use safety::{Error as SafetyError, RecoveryAnchor, SafetyNet};
pub use sequencer::{Error as RewriteError, RewriteMechanism, RewriteSequencer, SessionState};
pub use split::{ChangeSetSplitter, Error as SplitError, SplitStep};
pub use target::TargetSpec;
