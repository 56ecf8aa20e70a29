//! Splits an ordered list of texts into contiguous fixed-size batches.

use std::num::NonZeroUsize;

/// A contiguous slice of the input, tagged with its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    /// Zero-based batch number in submission order.
    pub index: usize,
    /// Position of `texts[0]` in the original input.
    pub offset: usize,
    pub texts: &'a [String],
}

impl Batch<'_> {
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Lazy, single-pass iterator over the batches of an input.
///
/// Every batch holds `batch_size` texts except possibly the last. An empty
/// input yields no batches.
#[derive(Debug)]
pub struct Batches<'a> {
    chunks: std::slice::Chunks<'a, String>,
    batch_size: usize,
    next_index: usize,
}

/// Partition `texts` into batches of at most `batch_size`.
pub fn batches(texts: &[String], batch_size: NonZeroUsize) -> Batches<'_> {
    Batches {
        chunks: texts.chunks(batch_size.get()),
        batch_size: batch_size.get(),
        next_index: 0,
    }
}

impl<'a> Iterator for Batches<'a> {
    type Item = Batch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let texts = self.chunks.next()?;
        let index = self.next_index;
        self.next_index += 1;
        Some(Batch {
            index,
            offset: index * self.batch_size,
            texts,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Batches<'_> {}
