//! Removal ranges and the offset-rewriting pass
//!
//! Every directive line that must disappear from the final output is recorded
//! as a half-open `[start, end)` byte range over the original blob. At output
//! time the merged ranges are deleted from the text in descending start
//! order; that ordering is the correctness invariant of the whole engine.
//! While a range is being deleted, every not-yet-processed range and every
//! node offset below it still lives in a valid offset space, because deleting
//! at a higher offset never moves anything at a lower one. Nodes overlapping
//! a deleted range are marked dead and dropped afterwards; survivors are
//! shifted, sorted, and de-duplicated.

use serde::Serialize;

use crate::nodes::{sort_and_dedupe, Node};

/// A `[start, end)` span of the original text that must not survive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Removal {
    pub start: usize,
    pub end: usize,
}

impl Removal {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "invalid removal {}..{}", start, end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// Merge ranges into a canonical set: sorted ascending, non-overlapping
///
/// Ranges that touch (`start <= merged.end`) coalesce, so adjacent directive
/// lines collapse into one deletion.
pub fn merge_ranges(mut ranges: Vec<Removal>) -> Vec<Removal> {
    ranges.sort_by_key(|r| r.start);

    let mut merged: Vec<Removal> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Whether an offset falls inside any of a set of ranges
pub fn in_any_range(ranges: &[Removal], offset: usize) -> bool {
    ranges.iter().any(|r| r.contains(offset))
}

/// Delete the ranges from the code and rewrite node offsets to match
///
/// Takes ownership of the node list and returns the surviving nodes with
/// final offsets, sorted and de-duplicated. Nodes overlapping a removed range
/// do not survive.
pub fn apply_removals(
    code: &str,
    ranges: &[Removal],
    nodes: Vec<Node>,
) -> (String, Vec<Node>) {
    let merged = merge_ranges(ranges.to_vec());

    let mut out = code.to_string();
    let mut nodes = nodes;
    let mut alive = vec![true; nodes.len()];

    // Descending start order: deletions at higher offsets leave every lower
    // offset untouched, so each iteration sees a valid offset space
    for range in merged.iter().rev() {
        out.replace_range(range.start..range.end, "");

        for (node, alive) in nodes.iter_mut().zip(alive.iter_mut()) {
            if !*alive {
                continue;
            }
            let start = node.start();
            if start + node.length() <= range.start {
                // Entirely before the deletion
            } else if start < range.end {
                *alive = false;
            } else {
                node.set_start(start - range.len());
            }
        }
    }

    let survivors: Vec<Node> = nodes
        .into_iter()
        .zip(alive)
        .filter_map(|(node, alive)| alive.then_some(node))
        .collect();

    debug_assert!(survivors
        .iter()
        .all(|n| n.start() + n.length() <= out.len()));

    (out, sort_and_dedupe(survivors))
}
