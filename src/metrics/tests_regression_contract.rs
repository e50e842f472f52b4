use super::*;

#[test]
fn test_mae_perfect_predictions() {
    let y = [1.0, 2.0, 3.0];
    assert_eq!(mae(&y, &y), 0.0);
    assert_eq!(rmse(&y, &y), 0.0);
}

#[test]
fn test_rmse_dominates_mae() {
    let y_true = [1.0, 2.0, 3.0, 4.0];
    let y_pred = [1.0, 2.0, 3.0, 8.0];
    assert!((mae(&y_pred, &y_true) - 1.0).abs() < 1e-12);
    assert!((rmse(&y_pred, &y_true) - 2.0).abs() < 1e-12);
}

#[test]
#[should_panic(expected = "same length")]
fn test_length_mismatch_panics() {
    let _ = mae(&[1.0], &[1.0, 2.0]);
}

#[test]
fn test_running_stats_start_empty() {
    let stats = RunningStats::new();
    assert_eq!(stats.test_count(), 0);
    assert_eq!(stats.train_count(), 0);
    assert_eq!(stats.mae(), None);
    assert_eq!(stats.rmse(), None);
}

#[test]
fn test_running_stats_scored_values() {
    let mut stats = RunningStats::new();

    let first = stats.record_test(3.0, 1.0);
    assert_eq!(first.error, 2.0);
    assert_eq!(first.mae, 2.0);
    assert_eq!(first.rmse, 2.0);

    let second = stats.record_test(1.0, 1.0);
    assert_eq!(second.error, 0.0);
    assert_eq!(second.mae, 1.0);
    assert!((second.rmse - 2.0_f64.sqrt()).abs() < 1e-12);

    assert_eq!(stats.sum_abs_error(), 2.0);
    assert_eq!(stats.sum_sq_error(), 4.0);
}

#[test]
fn test_train_counter_is_independent() {
    let mut stats = RunningStats::new();
    stats.record_train();
    stats.record_train();
    assert_eq!(stats.train_count(), 2);
    assert_eq!(stats.test_count(), 0);
    assert_eq!(stats.mae(), None);
}

mod recomputation_proptest {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Running values agree with a batch recomputation after every step.
        #[test]
        fn prop_running_matches_batch(
            pairs in prop::collection::vec((-1e3..1e3f64, -1e3..1e3f64), 1..60),
        ) {
            let mut stats = RunningStats::new();
            let mut predicted = Vec::new();
            let mut actual = Vec::new();

            for (p, a) in pairs {
                let scored = stats.record_test(p, a);
                predicted.push(p);
                actual.push(a);

                let batch_mae = mae(&predicted, &actual);
                let batch_rmse = rmse(&predicted, &actual);
                prop_assert!((scored.mae - batch_mae).abs() <= 1e-9 * batch_mae.max(1.0));
                prop_assert!((scored.rmse - batch_rmse).abs() <= 1e-9 * batch_rmse.max(1.0));
            }
            prop_assert_eq!(stats.test_count() as usize, actual.len());
        }

        #[test]
        fn prop_rmse_at_least_mae(
            pairs in prop::collection::vec((-50.0..50.0f64, -50.0..50.0f64), 1..40),
        ) {
            let mut stats = RunningStats::new();
            for (p, a) in pairs {
                let scored = stats.record_test(p, a);
                prop_assert!(scored.rmse + 1e-9 >= scored.mae);
            }
        }
    }
}
