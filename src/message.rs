//! Commit messages for the two halves of a split.

use crate::target::TargetSpec;

/// The messages for the commits that replace a split commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMessages {
    /// Message for the commit keeping everything except the targets.
    pub retained: String,
    /// Message for the commit holding only the targets.
    pub extracted: String,
}

/// Derive both messages from the original. The original text is kept
/// verbatim, including its body.
#[must_use]
pub fn generate_split_messages(original: &str, targets: &TargetSpec) -> SplitMessages {
    match targets.single() {
        Some(path) => SplitMessages {
            retained: format!("{original}\n\nChanges to {path} split into a separate commit"),
            extracted: format!("{path}: {original}"),
        },
        None => SplitMessages {
            retained: format!("{original}\n\nChanges to target files split into a separate commit"),
            extracted: format!("target files: {original}"),
        },
    }
}
