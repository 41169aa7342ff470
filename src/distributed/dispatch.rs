//! Partitioning and chunk dispatch types
//!
//! A distributed sort splits its input into contiguous [`Partition`]s, one per
//! active worker. Each partition comes back as a [`PartitionResult`], sorted
//! either by its worker or locally after that worker failed.

use crate::config::WorkerDescriptor;
use crate::error::PeerError;
use crate::merge::local_sort;
use crate::sequence::Number;
use async_trait::async_trait;

/// Capability: have a worker sort one chunk
///
/// Implementations report failures as [`PeerError`]; the coordinator never
/// propagates them and sorts the chunk locally instead. The coordinator bounds
/// every call with the configured dispatch timeout.
#[async_trait]
pub trait ChunkDispatcher: Send + Sync {
    async fn sort_chunk(
        &self,
        worker: &WorkerDescriptor,
        chunk: &[Number],
    ) -> Result<Vec<Number>, PeerError>;
}

/// Contiguous slice of the input and its position among its siblings
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub index: usize,
    pub data: Vec<Number>,
}

/// Where a partition was sorted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOrigin {
    Remote { worker_id: u32 },
    LocalFallback,
}

/// Sorted form of a partition
#[derive(Debug, Clone)]
pub struct PartitionResult {
    pub index: usize,
    pub sorted: Vec<Number>,
    pub origin: ChunkOrigin,
}

impl PartitionResult {
    pub fn is_fallback(&self) -> bool {
        self.origin == ChunkOrigin::LocalFallback
    }
}

/// Split `seq` into exactly `parts` contiguous partitions
///
/// Every partition holds `len / parts` elements except the last, which also
/// absorbs the remainder. `parts` of zero is treated as one.
pub fn partition(seq: Vec<Number>, parts: usize) -> Vec<Partition> {
    let parts = parts.max(1);
    let chunk_size = seq.len() / parts;

    let mut rest = seq;
    let mut out = Vec::with_capacity(parts);

    // Peel chunks off the back so no element is copied
    for index in (1..parts).rev() {
        let data = rest.split_off(index * chunk_size);
        out.push(Partition { index, data });
    }
    out.push(Partition { index: 0, data: rest });

    out.reverse();
    out
}

/// Check a worker's reply before trusting it
///
/// A reply must contain as many elements as the chunk sent and be in order;
/// anything else is treated like any other worker failure. Workers are trusted
/// to return the same values they were sent: release builds do not compare
/// contents, debug builds re-sort the chunk and require an exact match.
pub fn verify_reply(
    worker: &WorkerDescriptor,
    chunk: &[Number],
    sorted: &[Number],
) -> Result<(), PeerError> {
    if sorted.len() != chunk.len() {
        return Err(PeerError::Malformed {
            worker_id: worker.id,
            reason: format!("sent {} elements back for a chunk of {}", sorted.len(), chunk.len()),
        });
    }

    if !crate::sequence::is_sorted(sorted) {
        return Err(PeerError::Malformed {
            worker_id: worker.id,
            reason: "returned chunk is not in order".to_string(),
        });
    }

    if cfg!(debug_assertions) && local_sort(chunk.to_vec()) != sorted {
        return Err(PeerError::Malformed {
            worker_id: worker.id,
            reason: "returned values differ from the chunk sent".to_string(),
        });
    }

    Ok(())
}
