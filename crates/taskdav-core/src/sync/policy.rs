//! Decides what the remote calendar should do about a task.
//!
//! Both the event handlers and the full sweep go through [`classify`].

use crate::storage::SyncConfig;
use crate::sync::types::SyncDecision;
use crate::task::Task;

/// Classify a task against the current configuration.
///
/// - Untimed tasks are always `Delete`.
/// - Open timed tasks are `Sync`.
/// - Completed timed tasks are `Delete` when `delete_completed_tasks` is set,
///   otherwise `Ignore` and their existing event stays as it is.
pub fn classify(task: &Task, config: &SyncConfig) -> SyncDecision {
    if !task.has_timing() {
        return SyncDecision::Delete;
    }

    match (task.is_done, config.delete_completed_tasks) {
        (false, _) => SyncDecision::Sync,
        (true, true) => SyncDecision::Delete,
        (true, false) => SyncDecision::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use proptest::prelude::*;

    fn config(delete_completed_tasks: bool) -> SyncConfig {
        SyncConfig {
            delete_completed_tasks,
            ..SyncConfig::default()
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 3).unwrap()
    }

    #[test]
    fn open_timed_task_syncs() {
        let at = Utc.with_ymd_and_hms(2026, 1, 3, 9, 0, 0).unwrap();
        assert_eq!(
            classify(&Task::new("a", "x").scheduled(at), &config(false)),
            SyncDecision::Sync
        );
        assert_eq!(
            classify(&Task::new("a", "x").due(at), &config(true)),
            SyncDecision::Sync
        );
        assert_eq!(
            classify(&Task::new("a", "x").due_on(day()), &config(false)),
            SyncDecision::Sync
        );
    }

    #[test]
    fn untimed_task_deletes() {
        assert_eq!(classify(&Task::new("a", "x"), &config(false)), SyncDecision::Delete);
        assert_eq!(
            classify(&Task::new("a", "x").done(), &config(false)),
            SyncDecision::Delete
        );
    }

    #[test]
    fn completed_task_follows_setting() {
        let task = Task::new("a", "x").due_on(day()).done();
        assert_eq!(classify(&task, &config(true)), SyncDecision::Delete);
        assert_eq!(classify(&task, &config(false)), SyncDecision::Ignore);
    }

    fn arb_task() -> impl Strategy<Value = Task> {
        (
            any::<bool>(),
            proptest::option::of(0i64..4_000_000_000),
            proptest::option::of(0i64..4_000_000_000),
            proptest::option::of(0i32..20_000),
        )
            .prop_map(|(is_done, scheduled, due, day_offset)| {
                let mut task = Task::new("p", "prop");
                task.is_done = is_done;
                task.scheduled_at = scheduled.and_then(|s| Utc.timestamp_opt(s, 0).single());
                task.due_at = due.and_then(|s| Utc.timestamp_opt(s, 0).single());
                task.due_date_only = day_offset.and_then(|d| {
                    NaiveDate::from_ymd_opt(2000, 1, 1)
                        .and_then(|base| base.checked_add_signed(chrono::Duration::days(d as i64)))
                });
                task
            })
    }

    proptest! {
        #[test]
        fn classify_is_total_and_matches_rules(task in arb_task(), delete_completed in any::<bool>()) {
            let cfg = config(delete_completed);
            let decision = classify(&task, &cfg);

            if !task.has_timing() {
                prop_assert_eq!(decision, SyncDecision::Delete);
            } else if !task.is_done {
                prop_assert_eq!(decision, SyncDecision::Sync);
            } else if delete_completed {
                prop_assert_eq!(decision, SyncDecision::Delete);
            } else {
                prop_assert_eq!(decision, SyncDecision::Ignore);
            }

            prop_assert_eq!(decision, classify(&task, &cfg));
        }
    }
}
