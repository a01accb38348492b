//! Progress aggregation over a result set.

use pulse_core::{EndpointTestResult, TestProgress, TestStatus};

/// Recompute progress counters from scratch.
pub fn aggregate(results: &[EndpointTestResult]) -> TestProgress {
    let total = results.len();
    let mut success = 0;
    let mut error = 0;
    for r in results {
        match r.status {
            TestStatus::Success => success += 1,
            TestStatus::Error => error += 1,
            TestStatus::Pending => {}
        }
    }

    let completed = success + error;
    TestProgress {
        total,
        completed,
        success,
        error,
        pending: total - completed,
        percentage: percentage(completed, total),
    }
}

fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (100.0 * completed as f64 / total as f64).round() as u8
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use pulse_core::EndpointDescriptor;

    use super::*;

    fn results_with(statuses: &[TestStatus]) -> Vec<EndpointTestResult> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let mut r = EndpointTestResult::pending(&EndpointDescriptor::get(
                    &format!("/api/{i}"),
                    "Core",
                ));
                r.resolve(*status, "done", Some(1));
                r
            })
            .collect()
    }

    #[test]
    fn empty_set_is_zero() {
        assert_eq!(aggregate(&[]), TestProgress::default());
    }

    #[test]
    fn all_pending() {
        let p = aggregate(&results_with(&[TestStatus::Pending; 4]));
        assert_eq!(p.total, 4);
        assert_eq!(p.pending, 4);
        assert_eq!(p.completed, 0);
        assert_eq!(p.percentage, 0);
    }

    #[test]
    fn mixed_set_rounds_percentage() {
        let p = aggregate(&results_with(&[
            TestStatus::Success,
            TestStatus::Error,
            TestStatus::Pending,
        ]));
        assert_eq!(
            p,
            TestProgress {
                total: 3,
                completed: 2,
                success: 1,
                error: 1,
                pending: 1,
                percentage: 67,
            }
        );
    }

    fn status_strategy() -> impl Strategy<Value = TestStatus> {
        prop_oneof![
            Just(TestStatus::Pending),
            Just(TestStatus::Success),
            Just(TestStatus::Error),
        ]
    }

    proptest! {
        #[test]
        fn counters_are_consistent(statuses in prop::collection::vec(status_strategy(), 0..64)) {
            let results = results_with(&statuses);
            let p = aggregate(&results);

            prop_assert_eq!(p.completed, p.success + p.error);
            prop_assert_eq!(p.completed + p.pending, p.total);
            prop_assert_eq!(p.total, statuses.len());
            prop_assert!(p.percentage <= 100);
            prop_assert_eq!(aggregate(&results), p);
        }
    }
}
