//! Daily goals: planting a tree and volunteering.
//!
//! A goal is complete for today when an activity of its category is dated
//! today. Completing a goal means logging such an activity; [`GoalKind::draft`]
//! builds it and the record store writes it, after which the next evaluation
//! sees the goal as done.

use serde::Serialize;

use super::Clock;
use crate::config::ScoringConfig;
use crate::error::{Error, Result};
use crate::types::{ActivityCategory, ActivityRecord, NewActivity};

/// The two daily goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    PlantTree,
    Volunteer,
}

impl GoalKind {
    /// Every goal, in display order.
    pub const ALL: [GoalKind; 2] = [GoalKind::PlantTree, GoalKind::Volunteer];

    pub fn id(&self) -> &'static str {
        match self {
            GoalKind::PlantTree => "daily_tree",
            GoalKind::Volunteer => "daily_volunteer",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GoalKind::PlantTree => "Plant a Tree",
            GoalKind::Volunteer => "Volunteer Work",
        }
    }

    pub fn category(&self) -> ActivityCategory {
        match self {
            GoalKind::PlantTree => ActivityCategory::PlantTree,
            GoalKind::Volunteer => ActivityCategory::Volunteer,
        }
    }

    /// Impact logged on completion: an offset for trees, neutral for volunteering.
    pub fn impact_kg(&self, scoring: &ScoringConfig) -> f64 {
        match self {
            GoalKind::PlantTree => scoring.plant_tree_impact_kg,
            GoalKind::Volunteer => scoring.volunteer_impact_kg,
        }
    }

    /// The activity that completes this goal for `owner_id` right now.
    pub fn draft(&self, owner_id: &str, clock: &Clock, scoring: &ScoringConfig) -> NewActivity {
        NewActivity {
            category: self.category(),
            title: self.title().to_string(),
            impact_kg: self.impact_kg(scoring),
            occurred_at: clock.now(),
            owner_id: owner_id.to_string(),
        }
    }
}

impl std::str::FromStr for GoalKind {
    type Err = Error;

    /// Accepts the goal id (`daily_tree`) or its category (`plant_tree`).
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily_tree" | "plant_tree" => Ok(GoalKind::PlantTree),
            "daily_volunteer" | "volunteer" => Ok(GoalKind::Volunteer),
            other => Err(Error::UnknownGoal(other.to_string())),
        }
    }
}

/// A goal with today's completion state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyGoal {
    pub id: &'static str,
    pub kind: GoalKind,
    pub title: &'static str,
    pub completed_today: bool,
}

/// Whether an activity of `category` is dated today.
pub fn completed_today(
    activities: &[ActivityRecord],
    category: &ActivityCategory,
    clock: &Clock,
) -> bool {
    let today = clock.today();
    activities
        .iter()
        .any(|a| &a.category == category && clock.local_day(a.occurred_at) == today)
}

/// Both goals with today's completion state.
pub fn evaluate(activities: &[ActivityRecord], clock: &Clock) -> Vec<DailyGoal> {
    GoalKind::ALL
        .iter()
        .map(|&kind| DailyGoal {
            id: kind.id(),
            kind,
            title: kind.title(),
            completed_today: completed_today(activities, &kind.category(), clock),
        })
        .collect()
}
