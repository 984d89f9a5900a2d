//! Dashboard engine: records in, statistics/goals/achievements out.
//!
//! ## Data flow
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      DASHBOARD ENGINE                          │
//! │                                                                │
//! │  activities ─┐                                                 │
//! │  transactions├──► DerivedStats ──► achievements ──► eco-score  │
//! │  electricity ┤          │                                      │
//! │  water ──────┘          └──────► daily goals                   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Evaluation is a pure function of the records, the owner and the clock.
//! There is no cached state: callers re-run it on every snapshot change and
//! keep only the latest result.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ecotally_core::analytics::{Clock, DashboardEngine};
//!
//! let engine = DashboardEngine::new(config.scoring.clone());
//! let dashboard = engine.evaluate(Some("user-1"), &records, &Clock::system());
//! println!("eco-score: {}", dashboard.stats.eco_score);
//! ```

use serde::Serialize;

use super::achievements::{self, Achievement};
use super::goals::{self, DailyGoal};
use super::{score, Clock, DerivedStats};
use crate::config::ScoringConfig;
use crate::types::RecordSet;

/// Everything the dashboard screens render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub stats: DerivedStats,
    pub goals: Vec<DailyGoal>,
    pub achievements: Vec<Achievement>,
    /// True while any record feed has not delivered its first snapshot
    pub loading: bool,
}

impl Dashboard {
    /// The dashboard shown when nobody is signed in: zeroed and not loading.
    pub fn signed_out() -> Self {
        Self::default()
    }
}

/// Evaluates dashboards under a fixed scoring policy.
#[derive(Debug, Clone, Default)]
pub struct DashboardEngine {
    scoring: ScoringConfig,
}

impl DashboardEngine {
    pub fn new(scoring: ScoringConfig) -> Self {
        Self { scoring }
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Compute the dashboard for `owner_id` from already-filtered records.
    ///
    /// A missing or blank owner yields [`Dashboard::signed_out`]; that is the
    /// unauthenticated state, not an error.
    pub fn evaluate(
        &self,
        owner_id: Option<&str>,
        records: &RecordSet,
        clock: &Clock,
    ) -> Dashboard {
        let Some(owner_id) = owner_id.filter(|id| !id.trim().is_empty()) else {
            tracing::debug!("No owner, returning signed-out dashboard");
            return Dashboard::signed_out();
        };

        let mut stats = DerivedStats::compute(records, clock, &self.scoring);
        let achievements = achievements::evaluate_all(&stats);
        stats.unlocked_count = achievements::unlocked_count(&achievements);
        stats.eco_score = score::eco_score(
            stats.streak_days,
            stats.unlocked_count,
            score::activity_score(&records.activities),
        );
        let goals = goals::evaluate(&records.activities, clock);

        tracing::debug!(
            owner_id,
            activities = records.activities.len(),
            transactions = records.transactions.len(),
            electricity_logs = records.electricity_logs.len(),
            water_logs = records.water_logs.len(),
            streak = stats.streak_days,
            unlocked = stats.unlocked_count,
            eco_score = stats.eco_score,
            "Evaluated dashboard"
        );

        Dashboard {
            stats,
            goals,
            achievements,
            loading: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivityCategory, ActivityRecord, TransactionKind, TransactionRecord};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn clock() -> Clock {
        Clock::at_noon_utc(NaiveDate::from_ymd_opt(2026, 6, 15).unwrap())
    }

    #[test]
    fn test_signed_out() {
        let engine = DashboardEngine::default();
        let records = RecordSet {
            activities: vec![ActivityRecord {
                id: "a".into(),
                category: ActivityCategory::Bus,
                title: String::new(),
                impact_kg: 1.0,
                occurred_at: None,
                owner_id: "u".into(),
            }],
            ..Default::default()
        };

        for owner in [None, Some(""), Some("   ")] {
            let dashboard = engine.evaluate(owner, &records, &clock());
            assert_eq!(dashboard, Dashboard::signed_out());
            assert!(!dashboard.loading);
            assert!(dashboard.goals.is_empty());
            assert!(dashboard.achievements.is_empty());
        }
    }

    #[test]
    fn test_spender_only() {
        let engine = DashboardEngine::default();
        let at = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        let transactions = (0..21)
            .map(|i| TransactionRecord {
                id: format!("t{}", i),
                kind: TransactionKind::Expense,
                amount: 5.0,
                category: None,
                description: None,
                occurred_at: Some(at),
                wallet_id: "w".into(),
                owner_id: "u".into(),
            })
            .collect();
        let records = RecordSet {
            transactions,
            ..Default::default()
        };

        let dashboard = engine.evaluate(Some("u"), &records, &clock());
        assert_eq!(dashboard.stats.unlocked_count, 1);
        assert_eq!(dashboard.stats.eco_score, 10);
        let unlocked: Vec<_> = dashboard
            .achievements
            .iter()
            .filter(|a| a.unlocked)
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(unlocked, vec!["spender"]);
    }
}
