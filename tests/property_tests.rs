//! Property-based tests for change scoring and fault classification.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated daily consumption curves.

use chrono::NaiveDate;
use greenwave::changepoint::{change_scores, ChangeFinder, ChangeFinderConfig};
use greenwave::config::AnalysisConfig;
use greenwave::core::DailySignal;
use greenwave::detection::{classify, ClassifierConfig, FaultStatus, ThresholdBand};
use greenwave::pipeline::analyze_signal;
use proptest::prelude::*;

fn make_signal(values: &[f64]) -> DailySignal {
    let start = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
    DailySignal::from_values("Dishwasher", start, values.to_vec()).unwrap()
}

/// Strategy for daily average consumption in kW.
fn daily_values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| prop::collection::vec(0.01..50.0_f64, len))
}

/// Strategy for small but valid estimator configurations.
fn estimator_strategy() -> impl Strategy<Value = ChangeFinderConfig> {
    (0.001..0.5_f64, 1usize..4, 1usize..12, 0.01..1.0_f64).prop_map(|(r, order, smooth, var)| {
        ChangeFinderConfig::default()
            .r(r)
            .order(order)
            .smooth(smooth)
            .initial_variance(var)
    })
}

// =============================================================================
// Property: one score per input, zeros during warm-up, finite afterwards
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn score_length_matches_signal(
        values in daily_values_strategy(1, 120),
        config in estimator_strategy()
    ) {
        let scores = change_scores(&values, &config).unwrap();
        prop_assert_eq!(scores.len(), values.len());
    }

    #[test]
    fn warmup_scores_are_zero_and_rest_finite(
        values in daily_values_strategy(1, 120),
        config in estimator_strategy()
    ) {
        let scores = change_scores(&values, &config).unwrap();
        let warmup = config.warmup_len().min(scores.len());

        prop_assert!(scores[..warmup].iter().all(|&s| s == 0.0));
        prop_assert!(scores.iter().all(|s| s.is_finite()));
    }
}

// =============================================================================
// Property: scoring is deterministic and causal
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn scoring_is_deterministic(
        values in daily_values_strategy(5, 80),
        config in estimator_strategy()
    ) {
        let first = change_scores(&values, &config).unwrap();
        let second = change_scores(&values, &config).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn scores_do_not_depend_on_future_points(
        values in daily_values_strategy(5, 80),
        cut in 1usize..80,
        config in estimator_strategy()
    ) {
        let cut = cut.min(values.len());
        let full = change_scores(&values, &config).unwrap();
        let prefix = change_scores(&values[..cut], &config).unwrap();
        prop_assert_eq!(&full[..cut], &prefix[..]);
    }

    #[test]
    fn incremental_scoring_matches_batch(
        values in daily_values_strategy(5, 80),
        split in 1usize..80
    ) {
        let split = split.min(values.len() - 1);
        let config = ChangeFinderConfig::default();
        let batch = change_scores(&values, &config).unwrap();

        let mut finder = ChangeFinder::new(config).unwrap();
        let mut online: Vec<f64> = values[..split].iter().map(|&v| finder.update(v)).collect();
        online.extend(values[split..].iter().map(|&v| finder.update(v)));

        prop_assert_eq!(batch, online);
    }
}

// =============================================================================
// Property: threshold band is well formed
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn band_is_ordered_and_brackets_the_quartiles(
        scores in prop::collection::vec(-100.0..100.0_f64, 4..60),
        multiplier in 0.0..10.0_f64
    ) {
        let band = ThresholdBand::from_scores(&scores, multiplier).unwrap();
        prop_assert!(band.q1 <= band.q3);
        prop_assert!(band.lower <= band.q1);
        prop_assert!(band.upper >= band.q3);
        prop_assert!(band.iqr >= 0.0);
    }

    #[test]
    fn quartiles_are_never_out_of_band(
        scores in prop::collection::vec(-100.0..100.0_f64, 4..60)
    ) {
        let band = ThresholdBand::from_scores(&scores, 3.0).unwrap();
        let outliers = band.out_of_band(&scores);
        prop_assert!(outliers.len() < scores.len());
        for &i in &outliers {
            prop_assert!(!band.contains(scores[i]));
        }
    }
}

// =============================================================================
// Property: classification rules
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn classification_is_idempotent(values in daily_values_strategy(4, 60)) {
        let config = AnalysisConfig::default();
        let first = analyze_signal(&make_signal(&values), &config).unwrap();
        let second = analyze_signal(&make_signal(&values), &config).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn in_band_scores_always_mean_normal(
        values in daily_values_strategy(4, 60),
        scale in 0.0..1.0_f64
    ) {
        // Two-valued scores put one value at each quartile, so none can leave the band.
        let scores: Vec<f64> = (0..values.len()).map(|i| scale * (i % 2) as f64).collect();
        let config = ClassifierConfig::default();
        let verdict = classify(&make_signal(&values), &scores, &config).unwrap();

        prop_assert!(verdict.out_of_band.is_empty());
        prop_assert_eq!(verdict.status, FaultStatus::Normal);
        prop_assert!(!verdict.anomalous_unclassified);
    }

    #[test]
    fn dead_zone_is_normal_even_when_out_of_band(
        base in 1.0..20.0_f64,
        ratio in 0.55..1.45_f64,
        len in 8usize..40
    ) {
        // Flat history then a last value whose power ratio sits between the two thresholds.
        let mut values = vec![base; len - 1];
        let last = base * ratio;
        values.push(last);
        let signal = make_signal(&values);
        let ratio_to_mean = last / signal.mean();
        prop_assume!(ratio_to_mean > 0.5 && ratio_to_mean < 1.5);

        let mut scores = vec![0.0; len];
        scores[len - 1] = 100.0;
        let verdict = classify(&signal, &scores, &ClassifierConfig::default()).unwrap();

        prop_assert_eq!(verdict.out_of_band, vec![len - 1]);
        prop_assert_eq!(verdict.status, FaultStatus::Normal);
        prop_assert!(verdict.anomalous_unclassified);
    }

    #[test]
    fn fault_requires_an_out_of_band_score(values in daily_values_strategy(4, 60)) {
        let verdict = analyze_signal(&make_signal(&values), &AnalysisConfig::default()).unwrap();
        if verdict.status.is_fault() {
            prop_assert!(!verdict.out_of_band.is_empty());
        }
        prop_assert_eq!(verdict.scores.len(), values.len());
    }
}
