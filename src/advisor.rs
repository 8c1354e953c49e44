//! Advisory pre-flight check for paths likely to conflict during the rewrite.

use std::collections::BTreeMap;

use crate::analyze::ChangeRecord;

/// Paths changed by more than one commit in the range, sorted.
///
/// Every path counts, not only targets. The result is a hint printed before
/// rewriting; it never stops the run.
pub fn find_potential_conflicts(records: &[ChangeRecord]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        for path in &record.paths {
            *counts.entry(path.as_str()).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(path, _)| path.to_string())
        .collect()
}

/// Print the advisory warning block, if there is anything to warn about.
pub fn print_warnings(conflicts: &[String]) {
    if conflicts.is_empty() {
        return;
    }

    println!("⚠️  Warning: Potential conflicts detected in:");
    for path in conflicts {
        println!("  - {path}");
    }
    println!("\nThese files have been modified in multiple commits and may cause conflicts.");
    println!("Consider resolving manually if the rebase fails.\n");
}
