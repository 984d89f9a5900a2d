//! Eco-score: a bounded engagement score.
//!
//! Not a physical carbon metric. It blends streak length, unlocked badges
//! and how many activities were logged, with goal activities worth double.

use crate::types::ActivityRecord;

/// Upper bound of the score.
pub const MAX_ECO_SCORE: u32 = 100;

const STREAK_WEIGHT: u32 = 5;
const ACHIEVEMENT_WEIGHT: u32 = 10;

/// +2 per goal activity (tree planting, volunteering), +1 for anything else.
pub fn activity_score(activities: &[ActivityRecord]) -> u32 {
    activities.iter().fold(0u32, |sum, activity| {
        let points = if activity.category.is_goal() { 2 } else { 1 };
        sum.saturating_add(points)
    })
}

/// `min(100, streak*5 + unlocked*10 + activity_score)`, saturating.
pub fn eco_score(streak_days: u32, unlocked_count: u32, activity_score: u32) -> u32 {
    streak_days
        .saturating_mul(STREAK_WEIGHT)
        .saturating_add(unlocked_count.saturating_mul(ACHIEVEMENT_WEIGHT))
        .saturating_add(activity_score)
        .min(MAX_ECO_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActivityCategory;

    fn activity(category: ActivityCategory) -> ActivityRecord {
        ActivityRecord {
            id: String::new(),
            category,
            title: String::new(),
            impact_kg: 0.0,
            occurred_at: None,
            owner_id: "u".to_string(),
        }
    }

    #[test]
    fn test_activity_score_weights_goals() {
        let acts = vec![
            activity(ActivityCategory::PlantTree),
            activity(ActivityCategory::Volunteer),
            activity(ActivityCategory::Car),
            activity(ActivityCategory::Other("kayak".to_string())),
        ];
        assert_eq!(activity_score(&acts), 6);
    }

    #[test]
    fn test_eco_score_saturates() {
        assert_eq!(eco_score(0, 0, 0), 0);
        assert_eq!(eco_score(3, 1, 4), 29);
        assert_eq!(eco_score(30, 6, 500), 100);
        assert_eq!(eco_score(u32::MAX, u32::MAX, u32::MAX), 100);
    }
}
