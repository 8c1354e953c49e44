//! Dry-run preview of what a rewrite would do.

use crate::analyze::{self, ChangeRecord, RangeAnalyzer};
use crate::git::Git;
use crate::message::generate_split_messages;
use crate::target::TargetSpec;

pub struct DryRunReporter<'a> {
    git: &'a Git,
    targets: &'a TargetSpec,
}

impl<'a> DryRunReporter<'a> {
    pub fn new(git: &'a Git, targets: &'a TargetSpec) -> Self {
        Self { git, targets }
    }

    /// Analyze `from..to` and render the preview. Read only.
    pub fn preview(&self, from: &str, to: &str) -> Result<String, analyze::Error> {
        let records = RangeAnalyzer::new(self.git, self.targets).analyze_range(from, to)?;
        Ok(render_preview(&records, self.targets))
    }
}

/// Render the preview for already analyzed records.
pub fn render_preview(records: &[ChangeRecord], targets: &TargetSpec) -> String {
    let flagged: Vec<&ChangeRecord> = records.iter().filter(|r| r.needs_split).collect();

    let mut output = format!(
        "Would split {} out of {} commits:\n\n",
        flagged.len(),
        records.len()
    );

    for record in flagged {
        let messages = generate_split_messages(&record.message, targets);
        output.push_str(&format!("Commit {}: \"{}\"\n", record.short_id(), record.message));
        output.push_str(&format!("├─ Split into: \"{}\"\n", messages.retained));
        output.push_str(&format!("└─ Split into: \"{}\"\n\n", messages.extracted));
    }

    output
}
