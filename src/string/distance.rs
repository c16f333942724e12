//! Damerau-Levenshtein edit distance
//!
//! Restricted (optimal string alignment) distance: insertions, deletions
//! and substitutions cost 1, and so does transposing two adjacent bytes.
//! Three rolling rows of `min(len) + 1` entries are kept; small rows live
//! on the call stack, larger ones come from the default allocator and are
//! released before returning.

use super::flex_str::FlexStr;

/// Row length that still fits on the call stack.
const STACK_ROW: usize = 1024 + 1;

fn distance_rows(long: &[u8], short: &[u8], rows: &mut [u32]) -> usize {
    let cols = short.len() + 1;
    debug_assert!(rows.len() >= 3 * cols);
    let (prev_prev, rest) = rows.split_at_mut(cols);
    let (prev, curr) = rest.split_at_mut(cols);

    for (j, cell) in prev.iter_mut().enumerate() {
        *cell = j as u32;
    }

    for i in 1..=long.len() {
        curr[0] = i as u32;
        for j in 1..=short.len() {
            let cost = (long[i - 1] != short[j - 1]) as u32;
            let mut d = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);

            if i > 1 && j > 1 && long[i - 1] == short[j - 2] && long[i - 2] == short[j - 1] {
                d = d.min(prev_prev[j - 2] + 1);
            }
            curr[j] = d;
        }

        // rotate: prev -> prev_prev, curr -> prev
        prev_prev.copy_from_slice(prev);
        prev.copy_from_slice(curr);
    }

    prev[short.len()] as usize
}

/// Damerau-Levenshtein distance between two byte strings.
pub fn edit_distance(a: &[u8], b: &[u8]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return long.len();
    }

    let cols = short.len() + 1;
    if cols <= STACK_ROW {
        let mut rows = [0u32; 3 * STACK_ROW];
        distance_rows(long, short, &mut rows[..3 * cols])
    } else {
        let mut rows = vec![0u32; 3 * cols];
        distance_rows(long, short, &mut rows)
    }
}

impl FlexStr<'_> {
    /// Damerau-Levenshtein distance to `other`.
    #[inline]
    pub fn distance(&self, other: &FlexStr<'_>) -> usize {
        edit_distance(self.as_bytes(), other.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_is_zero() {
        assert_eq!(edit_distance(b"kitten", b"kitten"), 0);
        assert_eq!(edit_distance(b"", b""), 0);
    }

    #[test]
    fn test_empty_vs_nonempty() {
        assert_eq!(edit_distance(b"", b"abc"), 3);
        assert_eq!(edit_distance(b"abc", b""), 3);
    }

    #[test]
    fn test_classic_pairs() {
        assert_eq!(edit_distance(b"kitten", b"sitting"), 3);
        assert_eq!(edit_distance(b"flaw", b"lawn"), 2);
        assert_eq!(edit_distance(b"saturday", b"sunday"), 3);
    }

    #[test]
    fn test_single_edits() {
        assert_eq!(edit_distance(b"abc", b"abcd"), 1); // insert
        assert_eq!(edit_distance(b"abcd", b"abc"), 1); // delete
        assert_eq!(edit_distance(b"abc", b"abd"), 1); // substitute
    }

    #[test]
    fn test_transposition_costs_one() {
        assert_eq!(edit_distance(b"ab", b"ba"), 1);
        assert_eq!(edit_distance(b"abcdef", b"abdcef"), 1);
        // plain Levenshtein would give 2 for both
    }

    #[test]
    fn test_symmetry() {
        let pairs: [(&[u8], &[u8]); 3] =
            [(b"kitten", b"sitting"), (b"ca", b"abc"), (b"", b"xyz")];
        for (a, b) in pairs {
            assert_eq!(edit_distance(a, b), edit_distance(b, a));
        }
    }

    #[test]
    fn test_large_inputs_use_heap_rows() {
        let a = vec![b'a'; 1500];
        let mut b = a.clone();
        b[700] = b'b';
        b.push(b'c');
        assert_eq!(edit_distance(&a, &b), 2);
    }

    #[test]
    fn test_method_on_strings() {
        let a = FlexStr::new("distance").unwrap();
        let b = FlexStr::wrap(b"instance");
        assert_eq!(a.distance(&b), 2);
    }
}
