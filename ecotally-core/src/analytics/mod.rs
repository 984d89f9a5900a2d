//! Analytics module for ecotally
//!
//! Turns raw record snapshots into what the dashboard shows:
//! - Derived statistics (totals, month sums, good days)
//! - Day streaks
//! - The achievement catalog and its unlock state
//! - The bounded eco-score
//! - Daily goals
//! - Recency-bucketed chart series
//!
//! Everything here is synchronous and side-effect free. "Today" always comes
//! from an explicit [`Clock`].
//!
//! See [`engine`] for the entry point.

pub mod achievements;
pub mod buckets;
pub mod clock;
pub mod engine;
pub mod goals;
pub mod score;
pub mod stats;
pub mod streak;

pub use achievements::{Achievement, AchievementId, Tier};
pub use buckets::{usage_week, Bucket, Chart, ChartEntry, ChartRange, DayTotal};
pub use clock::{Clock, Zone};
pub use engine::{Dashboard, DashboardEngine};
pub use goals::{DailyGoal, GoalKind};
pub use score::MAX_ECO_SCORE;
pub use stats::DerivedStats;
