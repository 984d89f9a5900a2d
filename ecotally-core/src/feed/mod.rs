//! Live record feeds
//!
//! Records reach the dashboard through real-time subscriptions, one per
//! collection. Each subscription delivers whole snapshots (or an error
//! message); the dashboard keeps the latest snapshot per collection and
//! recomputes from scratch on every delivery.
//!
//! ## Architecture
//!
//! ```text
//! RecordSource::subscribe ──► FeedUpdate ──► LiveDashboard::apply ──► watch<Dashboard>
//!        (per collection)      (mpsc)         (last write wins)
//! ```
//!
//! - A snapshot replaces the collection's data and ends its loading state
//! - An error keeps the last known data, records the message and ends loading
//! - Dropping a [`Subscription`] unsubscribes

mod live;
mod source;

pub use live::LiveDashboard;
pub use source::{subscribe_all, RecordSource, Subscription};

use crate::types::{ActivityRecord, TransactionRecord, UsageLogRecord};

/// The four collections a dashboard subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    CarbonActivities,
    Transactions,
    ElectricityLogs,
    WaterLogs,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::CarbonActivities,
        Collection::Transactions,
        Collection::ElectricityLogs,
        Collection::WaterLogs,
    ];

    /// Name of the collection in the document store
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::CarbonActivities => "carbon_activities",
            Collection::Transactions => "transactions",
            Collection::ElectricityLogs => "electricity_logs",
            Collection::WaterLogs => "water_logs",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One delivery from a subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent<T> {
    /// Full current contents of the collection
    Snapshot(Vec<T>),
    /// The subscription failed; carries the collaborator's message
    Error(String),
}

/// A delivery tagged with its collection, or a change of signed-in owner.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    Activities(FeedEvent<ActivityRecord>),
    Transactions(FeedEvent<TransactionRecord>),
    ElectricityLogs(FeedEvent<UsageLogRecord>),
    WaterLogs(FeedEvent<UsageLogRecord>),
    /// Sign-in or sign-out; resets every feed
    Owner(Option<String>),
}

impl FeedUpdate {
    /// Collection this update belongs to, if any.
    pub fn collection(&self) -> Option<Collection> {
        match self {
            FeedUpdate::Activities(_) => Some(Collection::CarbonActivities),
            FeedUpdate::Transactions(_) => Some(Collection::Transactions),
            FeedUpdate::ElectricityLogs(_) => Some(Collection::ElectricityLogs),
            FeedUpdate::WaterLogs(_) => Some(Collection::WaterLogs),
            FeedUpdate::Owner(_) => None,
        }
    }

    /// Error message carried by this update, if it is a failed delivery.
    pub fn error(&self) -> Option<&str> {
        match self {
            FeedUpdate::Activities(FeedEvent::Error(message))
            | FeedUpdate::Transactions(FeedEvent::Error(message))
            | FeedUpdate::ElectricityLogs(FeedEvent::Error(message))
            | FeedUpdate::WaterLogs(FeedEvent::Error(message)) => Some(message),
            _ => None,
        }
    }
}

/// Latest known state of one subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState<T> {
    data: Vec<T>,
    loading: bool,
    error: Option<String>,
}

impl<T> FeedState<T> {
    /// A feed waiting for its first snapshot.
    pub fn loading() -> Self {
        Self {
            data: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// A feed with nothing subscribed (no owner): empty and settled.
    pub fn idle() -> Self {
        Self {
            data: Vec::new(),
            loading: false,
            error: None,
        }
    }

    /// Fold one delivery into the state.
    pub fn apply(&mut self, event: FeedEvent<T>) {
        match event {
            FeedEvent::Snapshot(data) => {
                self.data = data;
                self.error = None;
            }
            FeedEvent::Error(message) => {
                self.error = Some(message);
            }
        }
        self.loading = false;
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
