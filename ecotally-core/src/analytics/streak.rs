//! Day streaks over logged activities.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::Clock;
use crate::types::ActivityRecord;

/// Distinct local days with at least one activity, newest first.
pub fn active_days(activities: &[ActivityRecord], clock: &Clock) -> Vec<NaiveDate> {
    let days: BTreeSet<NaiveDate> = activities
        .iter()
        .map(|a| clock.local_day(a.occurred_at))
        .collect();
    days.into_iter().rev().collect()
}

/// Current streak: consecutive active days ending at the newest active day.
///
/// The chain only counts if the newest active day is no more than
/// `grace_days` before today; otherwise the streak is broken and 0.
pub fn current_streak(activities: &[ActivityRecord], clock: &Clock, grace_days: i64) -> u32 {
    let days = active_days(activities, clock);
    let Some(&latest) = days.first() else {
        return 0;
    };

    let lag = (clock.today() - latest).num_days();
    if lag > grace_days {
        return 0;
    }

    let mut streak = 1;
    for pair in days.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Longest run of consecutive active days anywhere in the history.
pub fn longest_streak(activities: &[ActivityRecord], clock: &Clock) -> u32 {
    let days = active_days(activities, clock);
    if days.is_empty() {
        return 0;
    }

    let mut longest = 1;
    let mut run = 1;
    for pair in days.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActivityCategory;
    use chrono::{Duration, TimeZone, Utc};

    fn clock() -> Clock {
        Clock::at_noon_utc(NaiveDate::from_ymd_opt(2026, 6, 15).unwrap())
    }

    fn activity_days_ago(days: i64) -> ActivityRecord {
        let noon = Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap();
        ActivityRecord {
            id: format!("a{}", days),
            category: ActivityCategory::Walk,
            title: String::new(),
            impact_kg: 0.0,
            occurred_at: Some(noon - Duration::days(days)),
            owner_id: "u".to_string(),
        }
    }

    #[test]
    fn test_empty_has_no_streak() {
        assert_eq!(current_streak(&[], &clock(), 1), 0);
        assert_eq!(longest_streak(&[], &clock()), 0);
    }

    #[test]
    fn test_today_only() {
        let acts = vec![activity_days_ago(0), activity_days_ago(0)];
        assert_eq!(current_streak(&acts, &clock(), 1), 1);
    }

    #[test]
    fn test_gap_breaks_chain() {
        let acts = vec![
            activity_days_ago(0),
            activity_days_ago(1),
            activity_days_ago(3),
        ];
        assert_eq!(current_streak(&acts, &clock(), 1), 2);
    }

    #[test]
    fn test_yesterday_keeps_streak_alive() {
        let acts = vec![
            activity_days_ago(1),
            activity_days_ago(2),
            activity_days_ago(3),
        ];
        assert_eq!(current_streak(&acts, &clock(), 1), 3);
        // A stricter grace window drops it
        assert_eq!(current_streak(&acts, &clock(), 0), 0);
    }

    #[test]
    fn test_two_days_ago_is_broken() {
        let acts = vec![activity_days_ago(2), activity_days_ago(3)];
        assert_eq!(current_streak(&acts, &clock(), 1), 0);
    }

    #[test]
    fn test_longest_streak() {
        let acts = vec![
            activity_days_ago(0),
            activity_days_ago(5),
            activity_days_ago(6),
            activity_days_ago(7),
            activity_days_ago(9),
        ];
        assert_eq!(longest_streak(&acts, &clock()), 3);
        assert_eq!(current_streak(&acts, &clock(), 1), 1);
    }
}
