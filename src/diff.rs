//! Positional frame diff.
//!
//! Line identity is "line N of the region", never content: a one-character
//! edit yields a single [`DiffOp::Update`] at that index, and there is no
//! reordering detection. The op list always covers
//! `max(prev.len(), curr.len())` indices, so indices past the shorter frame
//! classify as inserts (current frame longer) or deletes (previous longer).

use smallvec::SmallVec;

/// One positional edit for a single region line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOp {
    /// The line is unchanged.
    NoChange,
    /// The line exists in both frames with different content.
    Update(String),
    /// The line exists only in the current frame.
    Insert(String),
    /// The line exists only in the previous frame.
    Delete,
}

/// Type alias for diff op runs. Regions are typically a handful of lines.
pub type DiffOps = SmallVec<[DiffOp; 8]>;

/// Compute the positional edit script between two frames.
///
/// The result has exactly `max(prev.len(), curr.len())` entries, one per
/// line index from the top of the region.
///
/// # Example
///
/// ```
/// use liveregion::diff::{diff, DiffOp};
///
/// let prev = ["a".to_string(), "b".to_string()];
/// let curr = ["a".to_string(), "c".to_string(), "d".to_string()];
/// let ops = diff(&prev, &curr);
/// assert_eq!(ops[0], DiffOp::NoChange);
/// assert_eq!(ops[1], DiffOp::Update("c".into()));
/// assert_eq!(ops[2], DiffOp::Insert("d".into()));
/// ```
pub fn diff(prev: &[String], curr: &[String]) -> DiffOps {
    let len = prev.len().max(curr.len());
    let mut ops = DiffOps::with_capacity(len);
    for i in 0..len {
        let op = match (prev.get(i), curr.get(i)) {
            (Some(p), Some(c)) if p == c => DiffOp::NoChange,
            (Some(_), Some(c)) => DiffOp::Update(c.clone()),
            (None, Some(c)) => DiffOp::Insert(c.clone()),
            (Some(_), None) => DiffOp::Delete,
            (None, None) => unreachable!("index bounded by max(prev, curr)"),
        };
        ops.push(op);
    }
    ops
}
