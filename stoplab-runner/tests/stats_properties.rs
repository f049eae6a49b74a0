//! Property tests for the reporting layer.
//!
//! Uses proptest to verify:
//! 1. Histogram conservation: every in-range value lands in exactly one bin
//! 2. Range resolution: the data extent is always covered
//! 3. Summary ordering: box-plot quartiles are ordered and outliers lie beyond the fences

use proptest::prelude::*;
use stoplab_runner::plot::{histogram_counts, resolve_hist_range};
use stoplab_runner::{box_summary, StdDevConvention, SummaryStats};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1000.0..1000.0_f64, 1..200)
}

// ── 1. Histogram conservation ────────────────────────────────────────

proptest! {
    /// Binning over the data extent counts every value once.
    #[test]
    fn histogram_counts_every_value(values in arb_values(), bins in 1usize..50) {
        let (min, max) = resolve_hist_range(&values, None, None).unwrap();
        let counts = histogram_counts(&values, min, max, bins);
        prop_assert_eq!(counts.len(), bins);
        prop_assert_eq!(counts.iter().sum::<usize>(), values.len());
    }

    /// A fixed range drops exactly the values outside it.
    #[test]
    fn fixed_range_ignores_outside_values(values in arb_values(), bins in 1usize..20) {
        let counts = histogram_counts(&values, -10.0, 10.0, bins);
        let inside = values.iter().filter(|v| (-10.0..=10.0).contains(*v)).count();
        prop_assert_eq!(counts.iter().sum::<usize>(), inside);
    }
}

// ── 2. Range resolution ──────────────────────────────────────────────

proptest! {
    #[test]
    fn resolved_range_covers_data(values in arb_values()) {
        let (min, max) = resolve_hist_range(&values, None, None).unwrap();
        prop_assert!(min < max);
        for v in &values {
            prop_assert!(min <= *v && *v <= max);
        }
    }
}

// ── 3. Summary ordering ──────────────────────────────────────────────

proptest! {
    #[test]
    fn box_quartiles_are_ordered(values in arb_values()) {
        let (q, outliers) = box_summary(&values).unwrap();
        let [lo_fence, q1, median, q3, hi_fence] = q.values();
        prop_assert!(lo_fence <= q1 + 1e-3);
        prop_assert!(q1 <= median + 1e-3);
        prop_assert!(median <= q3 + 1e-3);
        prop_assert!(q3 <= hi_fence + 1e-3);
        prop_assert!(outliers.len() <= values.len());
        for o in &outliers {
            let o = *o as f32;
            prop_assert!(o < lo_fence || o > hi_fence);
        }
    }

    #[test]
    fn summary_is_bounded_by_data(values in arb_values()) {
        let s = SummaryStats::from_values(&values, StdDevConvention::Sample).unwrap();
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(s.count, values.len());
        prop_assert!(lo - 1e-9 <= s.mean && s.mean <= hi + 1e-9);
        prop_assert!(lo <= s.median && s.median <= hi);
        prop_assert!(s.std_dev >= 0.0);
    }
}
