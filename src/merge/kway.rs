//! K-way merge of sorted runs
//!
//! Combines the sorted chunks returned by workers in one pass using a min-heap
//! keyed on `(value, run index)`. Equal values leave in run order, so the result
//! is identical to folding [`super::merge`] left to right over the runs, at
//! O(n log k) instead of O(n * k).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Merge already-sorted runs, given in their original order
pub fn merge_all<T: Ord>(runs: Vec<Vec<T>>) -> Vec<T> {
    if runs.len() <= 1 {
        return runs.into_iter().next().unwrap_or_default();
    }

    let total = runs.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(total);

    let mut sources: Vec<_> = runs.into_iter().map(Vec::into_iter).collect();
    let mut heap = BinaryHeap::with_capacity(sources.len());

    for (idx, source) in sources.iter_mut().enumerate() {
        if let Some(head) = source.next() {
            heap.push(Reverse((head, idx)));
        }
    }

    while let Some(Reverse((value, idx))) = heap.pop() {
        out.push(value);
        if let Some(next) = sources[idx].next() {
            heap.push(Reverse((next, idx)));
        }
    }

    out
}
