//! Disorder and multiset-diff metrics over benchmark lists.
//!
//! Disorder metrics count how unsorted a sequence is; multiset metrics count
//! how unfaithful a model's list is to the original one. Comparison failures
//! (mixed incomparable types) surface as errors that the table builder treats
//! like a parse failure.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::Result;
use crate::value::{Key, Scalar};

/// Count index pairs `i < j` where element `i` is greater than element `j`.
///
/// O(n²), which is fine for the bounded benchmark sizes (≤ 1024).
pub fn count_unordered_pairs(items: &[Scalar]) -> Result<u64> {
    let mut count = 0;
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            if items[i].try_cmp(&items[j])? == Ordering::Greater {
                count += 1;
            }
        }
    }
    Ok(count)
}

/// Count adjacent positions where element `i` is greater than element `i + 1`.
pub fn count_unordered_neighbors(items: &[Scalar]) -> Result<u64> {
    let mut count = 0;
    for pair in items.windows(2) {
        if pair[0].try_cmp(&pair[1])? == Ordering::Greater {
            count += 1;
        }
    }
    Ok(count)
}

/// Total multiplicity present in `original` but unmatched in `candidate`.
pub fn count_missing_items(original: &[Scalar], candidate: &[Scalar]) -> u64 {
    multiset_deficit(&multiset(original), &multiset(candidate))
}

/// Total multiplicity present in `candidate` but unmatched in `original`.
pub fn count_additional_items(original: &[Scalar], candidate: &[Scalar]) -> u64 {
    multiset_deficit(&multiset(candidate), &multiset(original))
}

fn multiset(items: &[Scalar]) -> HashMap<Key, u64> {
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(item.key()).or_insert(0) += 1;
    }
    counts
}

fn multiset_deficit(have: &HashMap<Key, u64>, other: &HashMap<Key, u64>) -> u64 {
    have.iter()
        .map(|(key, &count)| count.saturating_sub(other.get(key).copied().unwrap_or(0)))
        .sum()
}
