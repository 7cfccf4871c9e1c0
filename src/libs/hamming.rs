//! Gap-aware Hamming distance between aligned sequences.
//!
//! Used to find the reference taxa closest to a query, which anchor the
//! extracted subtree.

use crate::libs::fasta::ReferenceSet;
use rayon::prelude::*;

/// Gap and missing-data symbols. Such columns carry no evidence.
pub fn is_gap(b: u8) -> bool {
    matches!(b, b'-' | b'.' | b'?')
}

/// Count of aligned columns where `query` and `reference` disagree.
///
/// Columns that are a gap in the reference are skipped. With `fragment` set,
/// columns that are a gap in the query are skipped too, so a fragmentary
/// query is compared on its observed columns only. Comparison is case
/// insensitive.
///
/// ```
/// use subplace::libs::hamming::distance;
/// assert_eq!(distance(b"AC-T", b"ACGT", true), 0);
/// assert_eq!(distance(b"AC-T", b"ACGT", false), 1);
/// assert_eq!(distance(b"acgt", b"A-GA", false), 1);
/// ```
pub fn distance(query: &[u8], reference: &[u8], fragment: bool) -> usize {
    query
        .iter()
        .zip(reference.iter())
        .filter(|(&q, &r)| {
            if is_gap(r) || (fragment && is_gap(q)) {
                return false;
            }
            !q.eq_ignore_ascii_case(&r)
        })
        .count()
}

/// The `k` references closest to `query`, ascending by distance.
///
/// Ties keep the iteration order of `refs`. Distances are computed in parallel
/// but collected in reference order before a stable sort.
pub fn closest(query: &[u8], refs: &ReferenceSet, k: usize, fragment: bool) -> Vec<(String, usize)> {
    if k == 0 {
        return Vec::new();
    }

    let entries: Vec<(&String, &Vec<u8>)> = refs.iter().collect();
    let mut scored: Vec<(usize, usize)> = entries
        .par_iter()
        .enumerate()
        .map(|(i, (_, seq))| (i, distance(query, seq, fragment)))
        .collect();

    scored.sort_by_key(|&(_, d)| d);
    scored.truncate(k);

    scored
        .into_iter()
        .map(|(i, d)| (entries[i].0.clone(), d))
        .collect()
}
