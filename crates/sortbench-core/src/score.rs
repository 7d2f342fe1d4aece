//! Normalization and score aggregation for one evaluated response.
//!
//! Raw counts become percentages of the configured list size, provenance
//! flags become a discrete validity grade, and the sub-scores combine into a
//! single benchmark score in [0, 1].

/// Provenance flags describing how a response was parsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseFlags {
    pub parsed: bool,
    pub cropped: bool,
    pub is_list: bool,
    pub has_ellipsis: bool,
}

/// Raw metric counts for one parsed response.
#[derive(Debug, Clone, Copy)]
pub struct RawCounts {
    pub unordered_pairs_before: u64,
    pub unordered_pairs_after: u64,
    pub unordered_neighbors_before: u64,
    pub unordered_neighbors_after: u64,
    pub missing_items: u64,
    pub additional_items: u64,
    /// Signed `len(original) - len(parsed)`.
    pub length_difference: i64,
}

/// Counts normalized to rates against the configured list size.
#[derive(Debug, Clone, Copy)]
pub struct Rates {
    pub unordered_pairs: f64,
    pub unordered_neighbors: f64,
    pub missing_items: f64,
    pub additional_items: f64,
    pub abs_length_difference: f64,
}

/// Normalize raw counts against the configured list size `n`.
///
/// Pairs are normalized by the pair count n(n-1)/2; item counts by n, clipped
/// to 1. Shipped sizes are always ≥ 2; for a degenerate n < 2 the pair rate
/// is 0 when the count is 0 and 1 otherwise.
pub fn normalize_counts(counts: &RawCounts, n: u64) -> Rates {
    let n = n.max(1) as f64;
    let pair_count = n * (n - 1.0) / 2.0;
    let unordered_pairs = if pair_count > 0.0 {
        counts.unordered_pairs_after as f64 / pair_count
    } else if counts.unordered_pairs_after == 0 {
        0.0
    } else {
        1.0
    };
    Rates {
        unordered_pairs,
        unordered_neighbors: counts.unordered_neighbors_after as f64 / n,
        missing_items: (counts.missing_items as f64 / n).min(1.0),
        additional_items: (counts.additional_items as f64 / n).min(1.0),
        abs_length_difference: (counts.length_difference as f64 / n).abs(),
    }
}

/// Discrete validity grade in {0, 0.5, 0.75, 1} derived from the flags.
///
/// Rules are evaluated in order; a later match overrides an earlier one.
pub fn validity_score(flags: &ResponseFlags) -> f64 {
    let mut score = 0.0;
    if flags.parsed && flags.cropped {
        score = 0.5;
    }
    if flags.parsed && !flags.cropped && !flags.is_list {
        score = 0.75;
    }
    if flags.parsed && !flags.cropped && flags.has_ellipsis {
        score = 0.75;
    }
    if flags.parsed && !flags.cropped && flags.is_list && !flags.has_ellipsis {
        score = 1.0;
    }
    score
}

/// How well sorted the response is: 1 minus the mean disorder rate.
pub fn sorting_score(rates: &Rates) -> f64 {
    1.0 - (rates.unordered_pairs + rates.unordered_neighbors) / 2.0
}

/// How faithful the response is to the original items.
pub fn faithfulness_score(rates: &Rates) -> f64 {
    1.0 - (rates.missing_items + rates.additional_items) / 2.0
}

/// Final per-response score: validity times the mean of the sub-scores.
pub fn combined_score(validity: f64, sorting: f64, faithfulness: f64) -> f64 {
    validity * (sorting + faithfulness) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(parsed: bool, cropped: bool, is_list: bool, has_ellipsis: bool) -> ResponseFlags {
        ResponseFlags {
            parsed,
            cropped,
            is_list,
            has_ellipsis,
        }
    }

    #[test]
    fn validity_extremes_are_exact() {
        // 1.0 only for the fully clean combination.
        assert_eq!(validity_score(&flags(true, false, true, false)), 1.0);
        // 0.0 only when the parse failed, regardless of the other flags.
        for &(c, l, e) in &[
            (false, false, false),
            (true, true, true),
            (false, true, false),
        ] {
            assert_eq!(validity_score(&flags(false, c, l, e)), 0.0);
        }
    }

    #[test]
    fn cropped_beats_other_flags() {
        assert_eq!(validity_score(&flags(true, true, true, false)), 0.5);
        assert_eq!(validity_score(&flags(true, true, false, true)), 0.5);
    }

    #[test]
    fn not_a_list_or_ellipsis_grade() {
        assert_eq!(validity_score(&flags(true, false, false, false)), 0.75);
        assert_eq!(validity_score(&flags(true, false, true, true)), 0.75);
    }

    #[test]
    fn perfect_response_scores_one() {
        let counts = RawCounts {
            unordered_pairs_before: 10,
            unordered_pairs_after: 0,
            unordered_neighbors_before: 4,
            unordered_neighbors_after: 0,
            missing_items: 0,
            additional_items: 0,
            length_difference: 0,
        };
        let rates = normalize_counts(&counts, 8);
        let v = validity_score(&flags(true, false, true, false));
        let score = combined_score(v, sorting_score(&rates), faithfulness_score(&rates));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn rates_are_clipped_and_normalized() {
        let counts = RawCounts {
            unordered_pairs_before: 0,
            unordered_pairs_after: 6,
            unordered_neighbors_before: 0,
            unordered_neighbors_after: 2,
            missing_items: 9,
            additional_items: 1,
            length_difference: -2,
        };
        let rates = normalize_counts(&counts, 4);
        assert_eq!(rates.unordered_pairs, 1.0); // 6 of 6 pairs
        assert_eq!(rates.unordered_neighbors, 0.5);
        assert_eq!(rates.missing_items, 1.0); // clipped from 2.25
        assert_eq!(rates.additional_items, 0.25);
        assert_eq!(rates.abs_length_difference, 0.5);
    }

    #[test]
    fn degenerate_sizes_have_defined_pair_rates() {
        let mut counts = RawCounts {
            unordered_pairs_before: 0,
            unordered_pairs_after: 0,
            unordered_neighbors_before: 0,
            unordered_neighbors_after: 0,
            missing_items: 0,
            additional_items: 0,
            length_difference: 0,
        };
        // With n < 2 there are no pairs to normalize by: rate is 0 for a
        // zero count and 1 otherwise, and n = 0 behaves like n = 1.
        for n in [0, 1] {
            let rates = normalize_counts(&counts, n);
            assert_eq!(rates.unordered_pairs, 0.0);
            assert_eq!(rates.unordered_neighbors, 0.0);
        }
        counts.unordered_pairs_after = 3;
        for n in [0, 1] {
            assert_eq!(normalize_counts(&counts, n).unordered_pairs, 1.0);
        }
    }

    #[test]
    fn combined_score_stays_in_unit_interval() {
        let worst = Rates {
            unordered_pairs: 1.0,
            unordered_neighbors: 1.0,
            missing_items: 1.0,
            additional_items: 1.0,
            abs_length_difference: 1.0,
        };
        for validity in [0.0, 0.5, 0.75, 1.0] {
            let s = combined_score(validity, sorting_score(&worst), faithfulness_score(&worst));
            assert!((0.0..=1.0).contains(&s));
        }
    }
}
