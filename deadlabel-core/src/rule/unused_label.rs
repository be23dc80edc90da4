//! `unused_control_flow_label`: labels on `if`/loops/`switch` that no
//! `break`/`continue` inside the statement refers to.

use crate::correct::correct_ranges;
use crate::source::structure::{NodeKind, StatementNode};
use crate::source::SourceFile;

use super::collect::{unused_label_range, unused_label_ranges};
use super::{CorrectableRule, Correction, Rule, RuleDescription, RuleKind, Severity, Violation};

pub static DESCRIPTION: RuleDescription = RuleDescription {
    identifier: "unused_control_flow_label",
    name: "Unused Control Flow Label",
    description: "Unused control flow label should be removed",
    kind: RuleKind::Lint,
    non_triggering_examples: &[
        "loop: while true { break loop }",
        "loop: while true { continue loop }",
        "loop:\n    while true { break loop }",
        "while true { break }",
        "loop: for x in array { break loop }",
        "label: switch number {\ncase 1: print(\"1\")\ncase 2: print(\"2\")\ndefault: break label\n}",
        "loop: repeat {\n    if x == 10 {\n        break loop\n    }\n} while true",
        "check: if x == 10 {\n    if y { break check }\n    print(x)\n}",
        "outer: for x in xs {\n    inner: while true {\n        if x == 1 { continue outer }\n        break inner\n    }\n}",
    ],
    triggering_examples: &[
        "↓loop: while true { break }",
        "↓loop: while true { break loop1 }",
        "↓loop: while true { break outerLoop }",
        "↓loop: for x in array { break }",
        "↓label: switch number {\ncase 1: print(\"1\")\ncase 2: print(\"2\")\ndefault: break\n}",
        "↓loop: repeat {\n    if x == 10 {\n        break\n    }\n} while true",
        "↓check: if x == 10 {\n    print(x)\n}",
        "if foo {\n    ↓myLabel: for x in array {\n        break\n    }\n}",
        "outer: for x in xs {\n    ↓inner: while true {\n        break outer\n    }\n}",
    ],
    corrections: &[
        ("↓loop: while true { break }", "while true { break }"),
        ("↓loop: while true { break loop1 }", "while true { break loop1 }"),
        ("↓loop: while true { break outerLoop }", "while true { break outerLoop }"),
        ("↓loop: for x in array { break }", "for x in array { break }"),
        (
            "↓label: switch number {\ncase 1: print(\"1\")\ncase 2: print(\"2\")\ndefault: break\n}",
            "switch number {\ncase 1: print(\"1\")\ncase 2: print(\"2\")\ndefault: break\n}",
        ),
        (
            "↓loop: repeat {\n    if x == 10 {\n        break\n    }\n} while true",
            "repeat {\n    if x == 10 {\n        break\n    }\n} while true",
        ),
        (
            "↓check: if x == 10 {\n    print(x)\n}",
            "if x == 10 {\n    print(x)\n}",
        ),
        (
            "if foo {\n    ↓myLabel: for x in array {\n        break\n    }\n}",
            "if foo {\n    for x in array {\n        break\n    }\n}",
        ),
    ],
};

/// Message reported for the unused label `name`.
pub fn reason(name: &str) -> String {
    format!("Unused control flow label `{}` should be removed", name)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnusedControlFlowLabelRule {
    severity: Severity,
}

impl UnusedControlFlowLabelRule {
    pub fn new(severity: Severity) -> Self {
        Self { severity }
    }
}

impl Rule for UnusedControlFlowLabelRule {
    fn description(&self) -> &'static RuleDescription {
        &DESCRIPTION
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn validate(&self, file: &SourceFile, kind: &NodeKind, node: &StatementNode) -> Vec<Violation> {
        let Some(range) = unused_label_range(file, kind, node) else {
            return Vec::new();
        };
        let Some(location) = file.location(range.start) else {
            return Vec::new();
        };
        let name = file.contents().get(range.start..range.end).unwrap_or_default();
        vec![Violation {
            rule_id: DESCRIPTION.identifier.to_string(),
            severity: self.severity,
            location,
            reason: reason(name),
        }]
    }
}

impl CorrectableRule for UnusedControlFlowLabelRule {
    fn correct(&self, file: &mut SourceFile) -> Vec<Correction> {
        let ranges = unused_label_ranges(file);
        correct_ranges(file, &ranges, DESCRIPTION.description)
    }
}
