//! Whole-tree collection of unused label ranges.

use crate::source::offsets::ByteRange;
use crate::source::structure::{NodeKind, StatementNode};
use crate::source::SourceFile;

use super::label::detect_label;
use super::usage::is_label_used;

/// Unused label range of a single node, if any.
pub fn unused_label_range(file: &SourceFile, kind: &NodeKind, node: &StatementNode) -> Option<ByteRange> {
    let label = detect_label(file, kind, node)?;
    let statement = node.byte_range()?;
    if is_label_used(file, &label.name, statement) {
        None
    } else {
        Some(label.range)
    }
}

fn collect(file: &SourceFile, node: &StatementNode) -> Vec<ByteRange> {
    let mut ranges: Vec<ByteRange> = node
        .substructure
        .iter()
        .flat_map(|child| collect(file, child))
        .collect();
    if let Some(kind) = &node.kind {
        ranges.extend(unused_label_range(file, kind, node));
    }
    ranges
}

/// Every unused label range in the file, deduplicated and sorted by
/// descending start so removals can run from the end of the file backwards.
pub fn unused_label_ranges(file: &SourceFile) -> Vec<ByteRange> {
    let mut ranges = collect(file, file.structure());
    ranges.sort_unstable_by(|a, b| b.cmp(a));
    ranges.dedup();
    ranges
}
