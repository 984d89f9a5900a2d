//! Achievement catalog and unlock evaluation.
//!
//! The catalog is fixed: six badges, each tied to one statistic. Progress and
//! unlock state are recomputed from [`DerivedStats`] on every evaluation;
//! nothing is persisted.

use serde::Serialize;

use super::DerivedStats;

/// Badge tier, used for ordering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Bronze => "bronze",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
        }
    }
}

/// Identifier of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    /// Log activities on consecutive days
    Streak,
    /// Take public transport trips
    Transit,
    /// Track expenses
    Spender,
    /// Low-impact days in the last week
    ImpactLow,
    /// Log activities overall
    Logger,
    /// Log electricity usage
    Energy,
}

impl AchievementId {
    /// Every achievement, in display order.
    pub const ALL: [AchievementId; 6] = [
        AchievementId::Streak,
        AchievementId::Transit,
        AchievementId::Spender,
        AchievementId::ImpactLow,
        AchievementId::Logger,
        AchievementId::Energy,
    ];

    /// Returns the stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementId::Streak => "streak",
            AchievementId::Transit => "transit",
            AchievementId::Spender => "spender",
            AchievementId::ImpactLow => "impact_low",
            AchievementId::Logger => "logger",
            AchievementId::Energy => "energy",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AchievementId::Streak => "Green Streak",
            AchievementId::Transit => "Transit Hero",
            AchievementId::Spender => "Eco Spender",
            AchievementId::ImpactLow => "Low Carbon Week",
            AchievementId::Logger => "Carbon Tracker",
            AchievementId::Energy => "Energy Watcher",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementId::Streak => "Log activities for consecutive days",
            AchievementId::Transit => "Take public transport trips",
            AchievementId::Spender => "Track your expenses",
            AchievementId::ImpactLow => "Days under 15kg CO2 (Last 7 Days)",
            AchievementId::Logger => "Log total activities",
            AchievementId::Energy => "Log electricity usage",
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            AchievementId::Streak | AchievementId::ImpactLow => Tier::Gold,
            AchievementId::Transit | AchievementId::Logger => Tier::Silver,
            AchievementId::Spender | AchievementId::Energy => Tier::Bronze,
        }
    }

    /// Progress shown against [`AchievementId::target`].
    pub fn target(&self) -> u32 {
        match self {
            AchievementId::Streak => 7,
            AchievementId::Transit => 10,
            AchievementId::Spender => 20,
            AchievementId::ImpactLow => 7,
            AchievementId::Logger => 50,
            AchievementId::Energy => 5,
        }
    }

    /// Progress needed to unlock. Equal to the target except for the
    /// low-carbon week, which unlocks at 5 of 7 good days.
    pub fn unlock_threshold(&self) -> u32 {
        match self {
            AchievementId::ImpactLow => 5,
            other => other.target(),
        }
    }

    /// The statistic this achievement tracks.
    pub fn progress(&self, stats: &DerivedStats) -> u32 {
        match self {
            AchievementId::Streak => stats.streak_days,
            AchievementId::Transit => stats.transit_activity_count,
            AchievementId::Spender => stats.transaction_count,
            AchievementId::ImpactLow => stats.good_day_count,
            AchievementId::Logger => stats.activity_count,
            AchievementId::Energy => stats.electricity_log_count,
        }
    }
}

impl std::fmt::Display for AchievementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An evaluated catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub title: &'static str,
    pub description: &'static str,
    pub progress: u32,
    pub target: u32,
    pub unlocked: bool,
    pub tier: Tier,
}

impl Achievement {
    /// Evaluate one entry against the current statistics.
    pub fn evaluate(id: AchievementId, stats: &DerivedStats) -> Self {
        let progress = id.progress(stats);
        Self {
            id,
            title: id.title(),
            description: id.description(),
            progress,
            target: id.target(),
            unlocked: progress >= id.unlock_threshold(),
            tier: id.tier(),
        }
    }

    /// Progress as a fraction of the target, capped at 1.0.
    pub fn completion(&self) -> f64 {
        if self.target == 0 {
            return 1.0;
        }
        (self.progress as f64 / self.target as f64).min(1.0)
    }
}

/// Evaluate the full catalog, in display order.
pub fn evaluate_all(stats: &DerivedStats) -> Vec<Achievement> {
    AchievementId::ALL
        .iter()
        .map(|&id| Achievement::evaluate(id, stats))
        .collect()
}

/// Number of unlocked achievements.
pub fn unlocked_count(achievements: &[Achievement]) -> u32 {
    achievements.iter().filter(|a| a.unlocked).count() as u32
}
