//! In-memory removal of unused labels.
//!
//! Each label range is widened up to the next token (the colon and the
//! whitespace after it go with the label), then all widened ranges are cut
//! out of the original text in a single pass.

use tracing::{debug, warn};

use crate::error::DeadlabelError;
use crate::rule::Correction;
use crate::source::offsets::{byte_range_to_char_range, ByteRange};
use crate::source::SourceFile;

/// Range removed for `label`: the label up to the start of the next token.
///
/// With no following token, only the label and its colon are removed.
/// Returns `None` when the widened range does not fall on character
/// boundaries.
pub fn removal_range(file: &SourceFile, label: ByteRange) -> Option<ByteRange> {
    let text = file.contents();
    let end = match file.first_token_after(label.start) {
        Some(next) if next.offset >= label.end => next.offset,
        Some(next) => {
            debug!(label = %label, next = next.offset, "next token overlaps label, skipped");
            return None;
        }
        None => {
            debug!(
                error = %DeadlabelError::NoMatchingToken { offset: label.start },
                "falling back to label and colon"
            );
            colon_end(text, label.end)?
        }
    };
    let range = ByteRange::new(label.start, end);
    let Some(chars) = byte_range_to_char_range(text, range) else {
        debug!(range = %range, "removal range not on character boundaries, skipped");
        return None;
    };
    debug!(bytes = %range, chars = %chars, "removal planned");
    Some(range)
}

/// End of `label:` when nothing follows the label in the token stream.
fn colon_end(text: &str, label_end: usize) -> Option<usize> {
    let rest = text.get(label_end..)?;
    let skipped = rest.len() - rest.trim_start().len();
    if rest[skipped..].starts_with(':') {
        Some(label_end + skipped + 1)
    } else {
        Some(label_end)
    }
}

/// Removes every range in `labels` from `file`.
///
/// `labels` is expected in descending start order (as produced by
/// [`crate::rule::collect::unused_label_ranges`]); corrections come back in
/// that same order. Ranges whose location or removal range cannot be
/// computed are skipped. An empty input leaves the file untouched.
pub fn correct_ranges(file: &mut SourceFile, labels: &[ByteRange], description: &str) -> Vec<Correction> {
    if labels.is_empty() {
        return Vec::new();
    }

    let mut planned: Vec<(ByteRange, Correction)> = labels
        .iter()
        .filter_map(|&label| {
            let location = file.location(label.start)?;
            let removal = removal_range(file, label)?;
            Some((
                removal,
                Correction {
                    description: description.to_string(),
                    location,
                },
            ))
        })
        .collect();

    planned.sort_by_key(|(removal, _)| removal.start);
    let mut accepted: Vec<(ByteRange, Correction)> = Vec::with_capacity(planned.len());
    for (removal, correction) in planned {
        if let Some((prev, _)) = accepted.last() {
            if prev.overlaps(&removal) {
                warn!(range = %removal, "overlapping removal dropped");
                continue;
            }
        }
        accepted.push((removal, correction));
    }

    let deletions: Vec<ByteRange> = accepted.iter().map(|(r, _)| *r).collect();
    if let Err(e) = file.apply_deletions(&deletions) {
        warn!(error = %e, "corrections not applied");
        return Vec::new();
    }

    accepted.into_iter().rev().map(|(_, c)| c).collect()
}
