//! Derived statistics over one owner's records.

use serde::Serialize;

use super::{streak, Clock};
use crate::config::ScoringConfig;
use crate::types::{ActivityRecord, RecordSet, UsageLogRecord};

/// Number of trailing days (including today) checked for good days.
pub const GOOD_DAY_WINDOW: u64 = 7;

/// Statistics derived from the raw record collections.
///
/// `unlocked_count` and `eco_score` depend on the achievement catalog and
/// are filled in by the engine after achievements are evaluated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedStats {
    /// Consecutive active days ending today or yesterday
    pub streak_days: u32,
    /// Longest run of consecutive active days ever
    pub longest_streak_days: u32,
    /// Sum of all activity impacts (kg CO2e)
    pub total_impact: f64,
    /// Number of activities logged
    pub activity_count: u32,
    /// Number of wallet transactions
    pub transaction_count: u32,
    /// Number of electricity readings
    pub electricity_log_count: u32,
    /// Bus and train trips
    pub transit_activity_count: u32,
    /// Days in the last week with logs and impact under the threshold
    pub good_day_count: u32,
    /// Impact logged this calendar month
    pub current_month_impact: f64,
    /// kWh logged this calendar month
    pub current_month_electricity: f64,
    /// Liters logged this calendar month
    pub current_month_water: f64,
    /// Achievements currently unlocked
    pub unlocked_count: u32,
    /// Bounded engagement score, 0-100
    pub eco_score: u32,
}

impl DerivedStats {
    /// Compute every statistic that depends only on the records.
    pub fn compute(records: &RecordSet, clock: &Clock, scoring: &ScoringConfig) -> Self {
        let activities = &records.activities;

        Self {
            streak_days: streak::current_streak(activities, clock, scoring.streak_grace_days),
            longest_streak_days: streak::longest_streak(activities, clock),
            total_impact: activities.iter().map(|a| a.impact_kg).sum(),
            activity_count: count(activities.len()),
            transaction_count: count(records.transactions.len()),
            electricity_log_count: count(records.electricity_logs.len()),
            transit_activity_count: count(
                activities.iter().filter(|a| a.category.is_transit()).count(),
            ),
            good_day_count: good_day_count(activities, clock, scoring.good_day_threshold_kg),
            current_month_impact: activities
                .iter()
                .filter(|a| clock.in_current_month(a.occurred_at))
                .map(|a| a.impact_kg)
                .sum(),
            current_month_electricity: month_usage(&records.electricity_logs, clock),
            current_month_water: month_usage(&records.water_logs, clock),
            unlocked_count: 0,
            eco_score: 0,
        }
    }
}

/// Days among the last [`GOOD_DAY_WINDOW`] with at least one activity and a
/// same-day total impact strictly below `threshold_kg`.
///
/// A day with nothing logged never counts, so inactive users don't collect
/// good days for free.
pub fn good_day_count(activities: &[ActivityRecord], clock: &Clock, threshold_kg: f64) -> u32 {
    let mut good = 0;
    for offset in 0..GOOD_DAY_WINDOW {
        let day = clock.days_ago(offset);
        let mut logged = false;
        let mut impact = 0.0;
        for activity in activities {
            if clock.local_day(activity.occurred_at) == day {
                logged = true;
                impact += activity.impact_kg;
            }
        }
        if logged && impact < threshold_kg {
            good += 1;
        }
    }
    good
}

fn month_usage(logs: &[UsageLogRecord], clock: &Clock) -> f64 {
    logs.iter()
        .filter(|log| clock.in_current_month(log.occurred_at))
        .map(|log| log.quantity)
        .sum()
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
