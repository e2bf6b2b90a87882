//! Performance roll-up for objectives.
//!
//! An objective's performance is the plain arithmetic mean of the
//! contributions of every task and activity reachable through its expected
//! outcomes. Nothing is weighted by category or priority and nothing is
//! clamped: stored percentages are used as-is. With nothing to average the
//! result is 0, never undefined.

use crate::types::TaskStatus;

/// One item's share of an objective's performance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contribution {
    Task { status: TaskStatus, completion: f64 },
    Activity { progress: f64 },
}

impl Contribution {
    pub fn value(&self) -> f64 {
        match *self {
            Contribution::Task { status, completion } => task_contribution(status, completion),
            Contribution::Activity { progress } => progress,
        }
    }
}

/// A completed task always counts as 100 whatever percentage is stored.
pub fn task_contribution(status: TaskStatus, completion: f64) -> f64 {
    if status == TaskStatus::Completed {
        100.0
    } else {
        completion
    }
}

/// Mean contribution, or 0 when there are no contributions.
pub fn aggregate(items: &[Contribution]) -> f64 {
    mean(items.iter().map(Contribution::value))
}

/// Mean of the values, or 0 for an empty sequence.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(status: TaskStatus, completion: f64) -> Contribution {
        Contribution::Task { status, completion }
    }

    fn activity(progress: f64) -> Contribution {
        Contribution::Activity { progress }
    }

    #[test]
    fn nothing_to_average_is_zero() {
        assert_eq!(aggregate(&[]), 0.0);
        assert_eq!(mean(Vec::new()), 0.0);
    }

    #[test]
    fn mixed_tasks_and_activities_average_evenly() {
        let items = [
            task(TaskStatus::Completed, 30.0),
            activity(50.0),
            task(TaskStatus::Pending, 0.0),
            activity(75.0),
        ];
        assert_eq!(aggregate(&items), 56.25);
    }

    #[test]
    fn completed_task_counts_as_full_regardless_of_stored_value() {
        assert_eq!(aggregate(&[task(TaskStatus::Completed, 30.0)]), 100.0);
        assert_eq!(aggregate(&[task(TaskStatus::OnHold, 30.0)]), 30.0);
    }

    #[test]
    fn stored_values_are_not_clamped() {
        assert_eq!(aggregate(&[activity(150.0), activity(50.0)]), 100.0);
        assert_eq!(aggregate(&[activity(-20.0)]), -20.0);
    }

    #[test]
    fn single_activity_is_its_own_performance() {
        assert_eq!(aggregate(&[activity(42.5)]), 42.5);
    }
}
