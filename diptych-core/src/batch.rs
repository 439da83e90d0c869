//! Batch planning
//!
//! Splits one frame into contiguous DMA submissions of at most
//! `max_batch_pixels`. All batches but the last are full size; the last
//! one carries the remainder and is never empty.

use core::ops::Range;

/// One contiguous submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Batch {
    /// Offset of the first pixel in the frame buffer
    pub offset: usize,
    /// Number of pixels
    pub len: usize,
    /// Last batch of the frame
    pub is_final: bool,
}

impl Batch {
    /// Pixel range inside the frame buffer
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }

    /// Whether the pump suspends for the pacing interval after this batch
    ///
    /// The final batch is only followed by the busy poll.
    pub fn is_paced(&self) -> bool {
        !self.is_final
    }
}

/// Progress through one frame transfer
#[derive(Debug, Clone)]
pub struct BatchCursor {
    offset: usize,
    remaining: usize,
    max_batch: usize,
}

impl BatchCursor {
    /// Start a transfer of `total_pixels` in batches of at most `max_batch`
    ///
    /// A zero `max_batch` yields no batches; configuration validation
    /// rejects it before a pump is built.
    pub fn new(total_pixels: usize, max_batch: usize) -> Self {
        Self {
            offset: 0,
            remaining: if max_batch == 0 { 0 } else { total_pixels },
            max_batch,
        }
    }

    /// Pixels not yet submitted
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Offset of the next batch
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Iterator for BatchCursor {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.remaining == 0 {
            return None;
        }

        let len = self.remaining.min(self.max_batch);
        let batch = Batch {
            offset: self.offset,
            len,
            is_final: len == self.remaining,
        };
        self.offset += len;
        self.remaining -= len;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = if self.max_batch == 0 {
            0
        } else {
            self.remaining.div_ceil(self.max_batch)
        };
        (n, Some(n))
    }
}

impl ExactSizeIterator for BatchCursor {}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;
    use proptest::prelude::*;

    fn lengths(total: usize, max: usize) -> Vec<usize, 64> {
        BatchCursor::new(total, max).map(|b| b.len).collect()
    }

    #[test]
    fn test_short_final_batch() {
        assert_eq!(lengths(4, 3).as_slice(), &[3, 1]);

        let batches: Vec<Batch, 4> = BatchCursor::new(4, 3).collect();
        assert_eq!(batches[0].range(), 0..3);
        assert!(batches[0].is_paced());
        assert_eq!(batches[1].range(), 3..4);
        assert!(batches[1].is_final);
        assert!(!batches[1].is_paced());
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        assert_eq!(lengths(6, 3).as_slice(), &[3, 3]);
    }

    #[test]
    fn test_frame_smaller_than_batch() {
        let batches: Vec<Batch, 4> = BatchCursor::new(2, 16).collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len, 2);
        assert!(batches[0].is_final);
    }

    #[test]
    fn test_empty_and_zero_batch() {
        assert!(lengths(0, 3).is_empty());
        assert!(lengths(10, 0).is_empty());
    }

    #[test]
    fn test_cursor_progress() {
        let mut cursor = BatchCursor::new(10, 4);
        assert_eq!(cursor.len(), 3);
        cursor.next();
        assert_eq!(cursor.offset(), 4);
        assert_eq!(cursor.remaining(), 6);
        assert_eq!(cursor.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_batches_cover_frame(total in 1usize..5000, max in 1usize..600) {
            let batches: std::vec::Vec<Batch> = BatchCursor::new(total, max).collect();

            prop_assert_eq!(batches.len(), total.div_ceil(max));
            prop_assert_eq!(batches.iter().map(|b| b.len).sum::<usize>(), total);

            let (last, full) = batches.split_last().unwrap();
            prop_assert!(last.is_final);
            prop_assert!(last.len >= 1 && last.len <= max);
            let mut expected_offset = 0;
            for batch in full {
                prop_assert_eq!(batch.len, max);
                prop_assert_eq!(batch.offset, expected_offset);
                prop_assert!(!batch.is_final);
                expected_offset += batch.len;
            }
            prop_assert_eq!(last.offset, expected_offset);
        }
    }
}
