//! Merge engine
//!
//! Pure, in-memory building blocks shared by the worker and the coordinator:
//!
//! - [`merge`]: stable two-way merge of ordered sequences
//! - [`local_sort`]: top-down merge sort built on [`merge`]
//! - [`merge_all`]: k-way merge of ordered runs (see [`kway`])
//!
//! None of these can fail.

pub mod kway;

pub use kway::merge_all;

/// Merge two ordered sequences into one
///
/// Ties are taken from `left` first, so the merge is stable. Runs in
/// O(|left| + |right|).
pub fn merge<T: Ord>(left: Vec<T>, right: Vec<T>) -> Vec<T> {
    let mut out = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => l <= r,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        out.extend(next);
    }

    out
}

/// Sort a sequence with recursive merge sort
///
/// Splits at the midpoint, sorts both halves, and merges them. Sequences of
/// length 0 or 1 come back unchanged.
pub fn local_sort<T: Ord>(mut seq: Vec<T>) -> Vec<T> {
    if seq.len() <= 1 {
        return seq;
    }

    let right = seq.split_off(seq.len() / 2);
    merge(local_sort(seq), local_sort(right))
}
