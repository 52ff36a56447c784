//! Fixed-size grouping of recipients.

use std::iter::Fuse;

use gcast_core::{BroadcastError, Result};

/// Lazy iterator over consecutive groups of at most `size` items.
///
/// Every group is non-empty; all groups but the last hold exactly `size` items.
#[derive(Debug)]
pub struct Batched<I: Iterator> {
    iter: Fuse<I>,
    size: usize,
}

/// Split `items` into groups of `size`, preserving order.
///
/// Empty input yields no groups. A `size` of zero is a configuration error.
pub fn batched<I: IntoIterator>(items: I, size: usize) -> Result<Batched<I::IntoIter>> {
    if size == 0 {
        return Err(BroadcastError::InvalidArgument(
            "batch size must be at least 1".to_string(),
        ));
    }
    Ok(Batched {
        iter: items.into_iter().fuse(),
        size,
    })
}

impl<I: Iterator> Iterator for Batched<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch: Vec<I::Item> = self.iter.by_ref().take(self.size).collect();
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lo, hi) = self.iter.size_hint();
        (lo.div_ceil(self.size), hi.map(|h| h.div_ceil(self.size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_batches() {
        let groups: Vec<Vec<i64>> = batched(Vec::<i64>::new(), 20).unwrap().collect();
        assert!(groups.is_empty());
    }

    #[test]
    fn zero_size_fails_fast() {
        let err = batched(vec![1, 2, 3], 0).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn partitions_exactly_for_many_shapes() {
        for len in 0..=45usize {
            for size in [1usize, 2, 3, 7, 20, 50] {
                let input: Vec<usize> = (0..len).collect();
                let groups: Vec<Vec<usize>> = batched(input.clone(), size).unwrap().collect();

                assert_eq!(groups.len(), len.div_ceil(size), "len={len} size={size}");
                if let Some((last, full)) = groups.split_last() {
                    assert!(full.iter().all(|g| g.len() == size));
                    assert!(!last.is_empty() && last.len() <= size);
                }
                let flat: Vec<usize> = groups.into_iter().flatten().collect();
                assert_eq!(flat, input);
            }
        }
    }

    #[test]
    fn default_size_splits_45_into_20_20_5() {
        let sizes: Vec<usize> = batched(0..45, 20).unwrap().map(|g| g.len()).collect();
        assert_eq!(sizes, vec![20, 20, 5]);
    }

    #[test]
    fn size_hint_counts_groups() {
        let it = batched(vec![0; 41], 20).unwrap();
        assert_eq!(it.size_hint(), (3, Some(3)));
    }

    #[test]
    fn is_lazy_over_infinite_input() {
        let first: Vec<u32> = batched(0u32.., 4).unwrap().next().unwrap();
        assert_eq!(first, vec![0, 1, 2, 3]);
    }
}
