//! Per-node rule driver.
//!
//! Walks the structure tree with an explicit worklist and calls
//! [`Rule::validate`] once for every node that has a kind.

use crate::rule::{Rule, Violation};
use crate::source::SourceFile;

/// Violations of `rule` in `file`, ordered by position.
pub fn lint_file<R: Rule + ?Sized>(file: &SourceFile, rule: &R) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut pending = vec![file.structure()];
    while let Some(node) = pending.pop() {
        if let Some(kind) = &node.kind {
            violations.extend(rule.validate(file, kind, node));
        }
        pending.extend(node.substructure.iter().rev());
    }
    violations.sort_by_key(|v| v.location.offset);
    violations.dedup();
    violations
}
