//! Dashboard kept current from live record feeds.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::{Collection, FeedState, FeedUpdate};
use crate::analytics::{Clock, Dashboard, DashboardEngine};
use crate::types::{ActivityRecord, RecordSet, TransactionRecord, UsageLogRecord};

/// Latest snapshot of every feed plus the dashboard computed from them.
///
/// Every update triggers a full recomputation; there is no incremental
/// state, so an older result can never leak into a newer one.
#[derive(Debug)]
pub struct LiveDashboard {
    engine: DashboardEngine,
    owner_id: Option<String>,
    activities: FeedState<ActivityRecord>,
    transactions: FeedState<TransactionRecord>,
    electricity_logs: FeedState<UsageLogRecord>,
    water_logs: FeedState<UsageLogRecord>,
    current: Dashboard,
}

impl LiveDashboard {
    /// Start tracking `owner_id`. With an owner every feed begins loading;
    /// without one the dashboard is signed out and nothing is awaited.
    pub fn new(engine: DashboardEngine, owner_id: Option<String>, clock: &Clock) -> Self {
        let owner_id = owner_id.filter(|id| !id.trim().is_empty());
        let mut live = Self {
            engine,
            owner_id: None,
            activities: FeedState::idle(),
            transactions: FeedState::idle(),
            electricity_logs: FeedState::idle(),
            water_logs: FeedState::idle(),
            current: Dashboard::signed_out(),
        };
        live.reset(owner_id);
        live.current = live.compute(clock);
        live
    }

    fn reset(&mut self, owner_id: Option<String>) {
        fn fresh<T>(subscribed: bool) -> FeedState<T> {
            if subscribed {
                FeedState::loading()
            } else {
                FeedState::idle()
            }
        }

        let subscribed = owner_id.is_some();
        self.activities = fresh(subscribed);
        self.transactions = fresh(subscribed);
        self.electricity_logs = fresh(subscribed);
        self.water_logs = fresh(subscribed);
        self.owner_id = owner_id;
    }

    /// Fold one update in and recompute the dashboard.
    pub fn apply(&mut self, update: FeedUpdate, clock: &Clock) -> &Dashboard {
        if let Some(collection) = update.collection() {
            match update.error() {
                Some(message) => {
                    tracing::warn!(collection = %collection, error = message, "Feed error")
                }
                None => tracing::trace!(collection = %collection, "Feed snapshot"),
            }
        }

        match update {
            FeedUpdate::Activities(event) => self.activities.apply(event),
            FeedUpdate::Transactions(event) => self.transactions.apply(event),
            FeedUpdate::ElectricityLogs(event) => self.electricity_logs.apply(event),
            FeedUpdate::WaterLogs(event) => self.water_logs.apply(event),
            FeedUpdate::Owner(owner_id) => {
                let owner_id = owner_id.filter(|id| !id.trim().is_empty());
                tracing::debug!(signed_in = owner_id.is_some(), "Owner changed");
                self.reset(owner_id);
            }
        }

        self.current = self.compute(clock);
        &self.current
    }

    fn compute(&self, clock: &Clock) -> Dashboard {
        let Some(owner_id) = self.owner_id.as_deref() else {
            return Dashboard::signed_out();
        };
        let mut dashboard = self
            .engine
            .evaluate(Some(owner_id), &self.records(), clock);
        dashboard.loading = self.loading();
        dashboard
    }

    /// The most recently computed dashboard.
    pub fn current(&self) -> &Dashboard {
        &self.current
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    /// Latest snapshots, restricted to the owner and ordered newest first.
    pub fn records(&self) -> RecordSet {
        let all = RecordSet {
            activities: self.activities.data().to_vec(),
            transactions: self.transactions.data().to_vec(),
            electricity_logs: self.electricity_logs.data().to_vec(),
            water_logs: self.water_logs.data().to_vec(),
            wallets: Vec::new(),
        };
        match self.owner_id.as_deref() {
            Some(owner_id) => all.for_owner(owner_id),
            None => RecordSet::default(),
        }
    }

    /// True while any feed awaits its first delivery.
    pub fn loading(&self) -> bool {
        self.owner_id.is_some()
            && (self.activities.is_loading()
                || self.transactions.is_loading()
                || self.electricity_logs.is_loading()
                || self.water_logs.is_loading())
    }

    /// Collections whose latest delivery was an error.
    pub fn errors(&self) -> Vec<(Collection, &str)> {
        [
            (Collection::CarbonActivities, self.activities.error()),
            (Collection::Transactions, self.transactions.error()),
            (Collection::ElectricityLogs, self.electricity_logs.error()),
            (Collection::WaterLogs, self.water_logs.error()),
        ]
        .into_iter()
        .filter_map(|(collection, error)| error.map(|message| (collection, message)))
        .collect()
    }

    /// Run the update loop on the tokio runtime.
    ///
    /// Each update is folded in and the new dashboard published on the
    /// returned watch channel. The task ends when every sender is dropped or
    /// every watcher is gone. `clock` is read once per update.
    pub fn spawn<F>(
        mut self,
        mut updates: mpsc::Receiver<FeedUpdate>,
        clock: F,
    ) -> (watch::Receiver<Dashboard>, JoinHandle<()>)
    where
        F: Fn() -> Clock + Send + 'static,
    {
        let (tx, rx) = watch::channel(self.current.clone());
        let handle = tokio::spawn(async move {
            while let Some(update) = updates.recv().await {
                let dashboard = self.apply(update, &clock()).clone();
                if tx.send(dashboard).is_err() {
                    tracing::debug!("No dashboard watchers left, stopping");
                    break;
                }
            }
            tracing::debug!("Live dashboard stopped");
        });
        (rx, handle)
    }
}
