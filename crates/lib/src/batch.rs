//! # Batch Builder
//!
//! Splits an ordered list into fixed-size batches. The iterator is lazy and
//! borrows the input, so no item is copied until a caller asks for it.

use crate::errors::BatchError;
use std::slice::Chunks;

/// A contiguous, order-preserving slice of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a, T> {
    /// Zero-based position of this batch in the sequence.
    pub index: usize,
    /// Offset of the first item of this batch in the full input.
    pub offset: usize,
    pub items: &'a [T],
}

impl<'a, T> Batch<'a, T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The exclusive end offset of this batch in the full input.
    pub fn end(&self) -> usize {
        self.offset + self.items.len()
    }
}

/// Lazy sequence of [`Batch`]es covering an input slice without gaps or overlaps.
#[derive(Debug, Clone)]
pub struct Batches<'a, T> {
    chunks: Chunks<'a, T>,
    size: usize,
    next_index: usize,
}

impl<'a, T> Iterator for Batches<'a, T> {
    type Item = Batch<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let items = self.chunks.next()?;
        let index = self.next_index;
        self.next_index += 1;
        Some(Batch {
            index,
            offset: index * self.size,
            items,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl<T> ExactSizeIterator for Batches<'_, T> {}

/// Partitions `items` into batches of `size`; the last batch holds the remainder.
///
/// Returns [`BatchError::InvalidBatchSize`] when `size` is zero.
pub fn batches<T>(items: &[T], size: usize) -> Result<Batches<'_, T>, BatchError> {
    if size == 0 {
        return Err(BatchError::InvalidBatchSize);
    }
    Ok(Batches {
        chunks: items.chunks(size),
        size,
        next_index: 0,
    })
}
