//! Fixed-size batching of table rows.

use std::num::NonZeroUsize;
use std::slice::Chunks;

/// Split `rows` into batches of at most `size` rows.
///
/// The returned iterator is lazy and single-pass. Batches preserve source
/// order; every batch but the last holds exactly `size` rows.
pub fn chunk<T>(rows: &[T], size: NonZeroUsize) -> Chunks<'_, T> {
    rows.chunks(size.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_chunk_counts_and_sizes() {
        for n in 0..40usize {
            for s in 1..12usize {
                let rows: Vec<usize> = (0..n).collect();
                let batches: Vec<&[usize]> = chunk(&rows, size(s)).collect();

                assert_eq!(batches.len(), n.div_ceil(s), "n={n} s={s}");
                if let Some((last, full)) = batches.split_last() {
                    assert!(full.iter().all(|b| b.len() == s));
                    assert!(!last.is_empty() && last.len() <= s);
                }

                let rejoined: Vec<usize> = batches.concat();
                assert_eq!(rejoined, rows);
            }
        }
    }

    #[test]
    fn test_chunk_empty_input() {
        let rows: Vec<u8> = Vec::new();
        assert_eq!(chunk(&rows, size(100)).count(), 0);
    }

    #[test]
    fn test_chunk_last_batch_smaller() {
        let rows = vec!["a", "b", "c", "d", "e"];
        let batches: Vec<_> = chunk(&rows, size(2)).collect();
        assert_eq!(batches, vec![&["a", "b"][..], &["c", "d"][..], &["e"][..]]);
    }
}
