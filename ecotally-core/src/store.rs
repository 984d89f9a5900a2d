//! Record storage
//!
//! The dashboard reads records through [`RecordStore`] and, for live views,
//! [`RecordSource`]. [`JsonFileStore`] backs both with a single JSON snapshot
//! file:
//!
//! ```json
//! {
//!   "activities": [ { "category": "bus", "impact": 1.2, "date": "...", "uid": "..." } ],
//!   "transactions": [ { "type": "expense", "amount": 4.5, "walletId": "...", "uid": "..." } ],
//!   "electricity_logs": [ { "kwh": 3.1, "date": "...", "uid": "..." } ],
//!   "water_logs": [ { "liters": 90.0, "date": "...", "uid": "..." } ],
//!   "wallets": [
//!     { "name": "Cash", "amount": 0.0, "totalIncome": 0.0, "totalExpenses": 0.0, "uid": "..." }
//!   ]
//! }
//! ```
//!
//! A missing file reads as an empty record set. Every write loads the whole
//! file, changes it, and replaces it; a rejected change writes nothing.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::feed::{Collection, FeedEvent, FeedUpdate, RecordSource, Subscription};
use crate::ledger::Wallet;
use crate::types::{
    ActivityRecord, NewActivity, NewTransaction, NewUsageLog, RecordSet, TransactionRecord,
    UsageKind, UsageLogRecord,
};

/// Read and write access to an owner's records.
///
/// Every method that takes an id only touches records owned by the given
/// owner; anything else is [`Error::NotFound`].
pub trait RecordStore {
    /// All records owned by `owner_id`, newest first.
    fn load(&self, owner_id: &str) -> Result<RecordSet>;

    /// Persist a new activity and return it with its assigned id.
    fn create_activity(&mut self, activity: NewActivity) -> Result<ActivityRecord>;

    /// Delete an activity, returning what was removed.
    fn delete_activity(&mut self, owner_id: &str, id: &str) -> Result<ActivityRecord>;

    /// Persist a new electricity or water reading.
    fn create_usage_log(&mut self, log: NewUsageLog) -> Result<UsageLogRecord>;

    /// Delete a usage reading, returning what was removed.
    fn delete_usage_log(
        &mut self,
        kind: UsageKind,
        owner_id: &str,
        id: &str,
    ) -> Result<UsageLogRecord>;

    /// Open an empty wallet.
    fn create_wallet(&mut self, owner_id: &str, name: &str) -> Result<Wallet>;

    /// Delete a wallet together with every transaction booked against it.
    fn delete_wallet(&mut self, owner_id: &str, id: &str) -> Result<Wallet>;

    /// Book a transaction against its wallet.
    ///
    /// Fails with [`Error::InsufficientFunds`] if an expense would overdraw.
    fn add_transaction(&mut self, transaction: NewTransaction) -> Result<TransactionRecord>;

    /// Replace a transaction's values, rebalancing the wallets involved.
    fn update_transaction(
        &mut self,
        id: &str,
        transaction: NewTransaction,
    ) -> Result<TransactionRecord>;

    /// Delete a transaction and take its effect off the wallet.
    fn delete_transaction(&mut self, owner_id: &str, id: &str) -> Result<TransactionRecord>;
}

/// Default interval at which file subscriptions check for changes
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Record store backed by a JSON snapshot file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    poll_interval: Duration,
}

impl JsonFileStore {
    /// Use the snapshot file at `path`. The file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record in the file, regardless of owner.
    pub fn load_all(&self) -> Result<RecordSet> {
        read_records(&self.path)
    }

    /// Replace the file contents with `records`.
    pub fn save(&self, records: &RecordSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write beside the target and rename so readers never see a partial file
        let tmp = self.path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(records)?;
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::info!(path = %self.path.display(), records = records.len(), "Saved records");
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self, owner_id: &str) -> Result<RecordSet> {
        let records = self.load_all()?.for_owner(owner_id);
        tracing::debug!(
            path = %self.path.display(),
            owner_id,
            records = records.len(),
            "Loaded records"
        );
        Ok(records)
    }

    fn create_activity(&mut self, activity: NewActivity) -> Result<ActivityRecord> {
        require_owner(&activity.owner_id, "an activity")?;

        let mut records = self.load_all()?;
        let record = activity.into_record(new_id());
        records.activities.push(record.clone());
        self.save(&records)?;

        tracing::info!(
            id = %record.id,
            category = %record.category,
            impact_kg = record.impact_kg,
            "Created activity"
        );
        Ok(record)
    }

    fn delete_activity(&mut self, owner_id: &str, id: &str) -> Result<ActivityRecord> {
        let mut records = self.load_all()?;
        let index = position(&records.activities, "activity", id, |a| {
            a.id == id && a.owner_id == owner_id
        })?;
        let removed = records.activities.remove(index);
        self.save(&records)?;

        tracing::info!(id, "Deleted activity");
        Ok(removed)
    }

    fn create_usage_log(&mut self, log: NewUsageLog) -> Result<UsageLogRecord> {
        require_owner(&log.owner_id, "a usage log")?;
        if !log.quantity.is_finite() || log.quantity < 0.0 {
            return Err(Error::Store(format!(
                "usage quantity must be a non-negative number, got {}",
                log.quantity
            )));
        }

        let kind = log.kind;
        let mut records = self.load_all()?;
        let record = log.into_record(new_id());
        records.usage_mut(kind).push(record.clone());
        self.save(&records)?;

        tracing::info!(
            id = %record.id,
            collection = kind.collection_name(),
            quantity = record.quantity,
            "Created usage log"
        );
        Ok(record)
    }

    fn delete_usage_log(
        &mut self,
        kind: UsageKind,
        owner_id: &str,
        id: &str,
    ) -> Result<UsageLogRecord> {
        let mut records = self.load_all()?;
        let logs = records.usage_mut(kind);
        let index = position(logs, kind.collection_name(), id, |l| {
            l.id == id && l.owner_id == owner_id
        })?;
        let removed = logs.remove(index);
        self.save(&records)?;

        tracing::info!(id, collection = kind.collection_name(), "Deleted usage log");
        Ok(removed)
    }

    fn create_wallet(&mut self, owner_id: &str, name: &str) -> Result<Wallet> {
        require_owner(owner_id, "a wallet")?;
        if name.trim().is_empty() {
            return Err(Error::Store("a wallet needs a name".to_string()));
        }

        let mut records = self.load_all()?;
        let wallet = Wallet::new(new_id(), name.trim(), owner_id);
        records.wallets.push(wallet.clone());
        self.save(&records)?;

        tracing::info!(id = %wallet.id, name = %wallet.name, "Created wallet");
        Ok(wallet)
    }

    fn delete_wallet(&mut self, owner_id: &str, id: &str) -> Result<Wallet> {
        let mut records = self.load_all()?;
        let index = wallet_index(&records.wallets, owner_id, id)?;
        let removed = records.wallets.remove(index);
        let before = records.transactions.len();
        records.transactions.retain(|t| t.wallet_id != id);
        let dropped = before - records.transactions.len();
        self.save(&records)?;

        tracing::info!(id, transactions = dropped, "Deleted wallet");
        Ok(removed)
    }

    fn add_transaction(&mut self, transaction: NewTransaction) -> Result<TransactionRecord> {
        require_owner(&transaction.owner_id, "a transaction")?;
        check_amount(transaction.amount)?;

        let mut records = self.load_all()?;
        let wallet = wallet_index(
            &records.wallets,
            &transaction.owner_id,
            &transaction.wallet_id,
        )?;
        let record = transaction.into_record(new_id());
        records.wallets[wallet].apply(&record)?;
        records.transactions.push(record.clone());
        self.save(&records)?;

        tracing::info!(
            id = %record.id,
            wallet_id = %record.wallet_id,
            kind = record.kind.as_str(),
            amount = record.amount,
            "Added transaction"
        );
        Ok(record)
    }

    fn update_transaction(
        &mut self,
        id: &str,
        transaction: NewTransaction,
    ) -> Result<TransactionRecord> {
        check_amount(transaction.amount)?;
        let owner_id = transaction.owner_id.clone();

        let mut records = self.load_all()?;
        let index = position(&records.transactions, "transaction", id, |t| {
            t.id == id && t.owner_id == owner_id
        })?;
        let old = records.transactions[index].clone();
        let new = transaction.into_record(id.to_string());

        if old.wallet_id == new.wallet_id {
            let wallet = wallet_index(&records.wallets, &owner_id, &new.wallet_id)?;
            records.wallets[wallet].replace(&old, &new)?;
        } else {
            // Both wallets must accept the move before either is written
            let from = wallet_index(&records.wallets, &owner_id, &old.wallet_id)?;
            let to = wallet_index(&records.wallets, &owner_id, &new.wallet_id)?;
            let mut source = records.wallets[from].clone();
            let mut target = records.wallets[to].clone();
            source.revert(&old)?;
            target.apply(&new)?;
            records.wallets[from] = source;
            records.wallets[to] = target;
        }

        records.transactions[index] = new.clone();
        self.save(&records)?;

        tracing::info!(id, wallet_id = %new.wallet_id, amount = new.amount, "Updated transaction");
        Ok(new)
    }

    fn delete_transaction(&mut self, owner_id: &str, id: &str) -> Result<TransactionRecord> {
        let mut records = self.load_all()?;
        let index = position(&records.transactions, "transaction", id, |t| {
            t.id == id && t.owner_id == owner_id
        })?;
        let wallet = wallet_index(
            &records.wallets,
            owner_id,
            &records.transactions[index].wallet_id,
        )?;
        let removed = records.transactions.remove(index);
        records.wallets[wallet].remove(&removed)?;
        self.save(&records)?;

        tracing::info!(id, wallet_id = %removed.wallet_id, "Deleted transaction");
        Ok(removed)
    }
}

impl RecordSource for JsonFileStore {
    /// Poll the file and push a snapshot whenever its modification time
    /// changes. The first snapshot is sent immediately.
    fn subscribe(
        &self,
        collection: Collection,
        owner_id: &str,
        sink: mpsc::Sender<FeedUpdate>,
    ) -> Subscription {
        let path = self.path.clone();
        let owner_id = owner_id.to_string();
        let poll_interval = self.poll_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            let mut last_seen: Option<Option<SystemTime>> = None;

            loop {
                ticker.tick().await;
                let modified = tokio::fs::metadata(&path)
                    .await
                    .and_then(|m| m.modified())
                    .ok();
                if last_seen == Some(modified) {
                    continue;
                }
                last_seen = Some(modified);

                let update = match read_records_async(&path).await {
                    Ok(records) => snapshot(collection, records.for_owner(&owner_id)),
                    Err(e) => error_update(collection, e.to_string()),
                };
                if sink.send(update).await.is_err() {
                    break;
                }
            }
        });

        tracing::debug!(collection = %collection, path = %self.path.display(), "Subscribed");
        Subscription::new(collection, handle)
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn require_owner(owner_id: &str, what: &str) -> Result<()> {
    if owner_id.trim().is_empty() {
        return Err(Error::Store(format!("cannot create {} without an owner", what)));
    }
    Ok(())
}

fn check_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::Store(format!(
            "transaction amount must be a non-negative number, got {}",
            amount
        )));
    }
    Ok(())
}

fn position<T>(
    items: &[T],
    collection: &'static str,
    id: &str,
    matches: impl Fn(&T) -> bool,
) -> Result<usize> {
    items.iter().position(matches).ok_or_else(|| Error::NotFound {
        collection,
        id: id.to_string(),
    })
}

fn wallet_index(wallets: &[Wallet], owner_id: &str, id: &str) -> Result<usize> {
    position(wallets, "wallet", id, |w| w.id == id && w.owner_id == owner_id)
}

fn parse_records(contents: &str) -> Result<RecordSet> {
    if contents.trim().is_empty() {
        return Ok(RecordSet::default());
    }
    Ok(serde_json::from_str(contents)?)
}

fn read_records(path: &Path) -> Result<RecordSet> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_records(&contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RecordSet::default()),
        Err(e) => Err(e.into()),
    }
}

async fn read_records_async(path: &Path) -> Result<RecordSet> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => parse_records(&contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RecordSet::default()),
        Err(e) => Err(e.into()),
    }
}

fn snapshot(collection: Collection, records: RecordSet) -> FeedUpdate {
    match collection {
        Collection::CarbonActivities => {
            FeedUpdate::Activities(FeedEvent::Snapshot(records.activities))
        }
        Collection::Transactions => {
            FeedUpdate::Transactions(FeedEvent::Snapshot(records.transactions))
        }
        Collection::ElectricityLogs => {
            FeedUpdate::ElectricityLogs(FeedEvent::Snapshot(records.electricity_logs))
        }
        Collection::WaterLogs => FeedUpdate::WaterLogs(FeedEvent::Snapshot(records.water_logs)),
    }
}

fn error_update(collection: Collection, message: String) -> FeedUpdate {
    match collection {
        Collection::CarbonActivities => FeedUpdate::Activities(FeedEvent::Error(message)),
        Collection::Transactions => FeedUpdate::Transactions(FeedEvent::Error(message)),
        Collection::ElectricityLogs => FeedUpdate::ElectricityLogs(FeedEvent::Error(message)),
        Collection::WaterLogs => FeedUpdate::WaterLogs(FeedEvent::Error(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{Clock, DashboardEngine, GoalKind};
    use crate::config::ScoringConfig;
    use crate::feed::{subscribe_all, LiveDashboard};
    use crate::types::TransactionKind;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn clock() -> Clock {
        Clock::at_noon_utc(NaiveDate::from_ymd_opt(2026, 6, 15).unwrap())
    }

    fn temp_store() -> (TempDir, JsonFileStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("records.json"));
        (dir, store)
    }

    fn booking(wallet_id: &str, kind: TransactionKind, amount: f64) -> NewTransaction {
        NewTransaction {
            kind,
            amount,
            category: None,
            description: None,
            occurred_at: clock().now(),
            wallet_id: wallet_id.to_string(),
            owner_id: "u".to_string(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("records.json"));
        assert!(store.load("u").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert!(matches!(store.load("u"), Err(Error::Json(_))));
    }

    #[test]
    fn test_create_activity_assigns_id_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::open(dir.path().join("nested").join("records.json"));
        let draft = GoalKind::PlantTree.draft("u", &clock(), &ScoringConfig::default());

        let created = store.create_activity(draft).unwrap();
        assert_eq!(created.id.len(), 36);
        assert_eq!(created.impact_kg, -10.0);

        let mine = store.load("u").unwrap();
        assert_eq!(mine.activities, vec![created]);
        assert!(store.load("someone-else").unwrap().is_empty());
    }

    #[test]
    fn test_create_activity_requires_owner() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::open(dir.path().join("records.json"));
        let draft = GoalKind::Volunteer.draft("  ", &clock(), &ScoringConfig::default());
        assert!(matches!(store.create_activity(draft), Err(Error::Store(_))));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_one_bad_record_keeps_the_rest() {
        let (_dir, store) = temp_store();
        std::fs::write(
            store.path(),
            r#"{ "activities": [
                { "id": "a", "category": "bus", "impact": 1.0, "uid": "u" },
                { "id": "b", "impact": null, "uid": "u" }
            ] }"#,
        )
        .unwrap();

        let mine = store.load("u").unwrap();
        assert_eq!(mine.activities.len(), 2);
    }

    #[test]
    fn test_rewrite_keeps_usage_field_names() {
        let (_dir, mut store) = temp_store();
        std::fs::write(
            store.path(),
            r#"{
                "electricity_logs": [ { "id": "e", "kwh": 4.5, "uid": "u" } ],
                "water_logs": [ { "id": "w", "liters": 120.0, "uid": "u" } ]
            }"#,
        )
        .unwrap();

        store
            .create_activity(GoalKind::Volunteer.draft("u", &clock(), &ScoringConfig::default()))
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["electricity_logs"][0]["kwh"], serde_json::json!(4.5));
        assert!(raw["electricity_logs"][0].get("quantity").is_none());
        assert_eq!(raw["water_logs"][0]["liters"], serde_json::json!(120.0));
        assert_eq!(store.load("u").unwrap().electricity_logs[0].quantity, 4.5);
    }

    #[test]
    fn test_usage_logs_create_and_delete() {
        let (_dir, mut store) = temp_store();
        let log = store
            .create_usage_log(NewUsageLog {
                kind: UsageKind::Water,
                quantity: 75.0,
                occurred_at: clock().now(),
                owner_id: "u".to_string(),
            })
            .unwrap();
        assert_eq!(store.load("u").unwrap().water_logs, vec![log.clone()]);
        assert!(store.load("u").unwrap().electricity_logs.is_empty());

        let err = store
            .delete_usage_log(UsageKind::Electricity, "u", &log.id)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { collection: "electricity_logs", .. }));

        store.delete_usage_log(UsageKind::Water, "u", &log.id).unwrap();
        assert!(store.load("u").unwrap().is_empty());
    }

    #[test]
    fn test_delete_activity_is_owner_scoped() {
        let (_dir, mut store) = temp_store();
        let created = store
            .create_activity(GoalKind::PlantTree.draft("u", &clock(), &ScoringConfig::default()))
            .unwrap();

        let err = store.delete_activity("intruder", &created.id).unwrap_err();
        assert!(matches!(err, Error::NotFound { collection: "activity", .. }));

        let removed = store.delete_activity("u", &created.id).unwrap();
        assert_eq!(removed, created);
        assert!(store.load("u").unwrap().activities.is_empty());
    }

    #[test]
    fn test_transactions_keep_wallet_in_step() {
        let (_dir, mut store) = temp_store();
        let wallet = store.create_wallet("u", "Cash").unwrap();

        store
            .add_transaction(booking(&wallet.id, TransactionKind::Income, 100.0))
            .unwrap();
        let expense = store
            .add_transaction(booking(&wallet.id, TransactionKind::Expense, 30.0))
            .unwrap();

        let cash = &store.load("u").unwrap().wallets[0];
        assert_eq!(cash.amount, 70.0);
        assert_eq!(cash.total_income, 100.0);
        assert_eq!(cash.total_expenses, 30.0);

        // Raising the expense uses the 30 it already took
        store
            .update_transaction(&expense.id, booking(&wallet.id, TransactionKind::Expense, 100.0))
            .unwrap();
        assert_eq!(store.load("u").unwrap().wallets[0].amount, 0.0);

        store.delete_transaction("u", &expense.id).unwrap();
        let mine = store.load("u").unwrap();
        assert_eq!(mine.transactions.len(), 1);
        assert_eq!(mine.wallets[0].amount, 100.0);
        assert_eq!(mine.wallets[0].total_expenses, 0.0);
    }

    #[test]
    fn test_overdraw_writes_nothing() {
        let (_dir, mut store) = temp_store();
        let wallet = store.create_wallet("u", "Cash").unwrap();
        store
            .add_transaction(booking(&wallet.id, TransactionKind::Income, 20.0))
            .unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        let err = store
            .add_transaction(booking(&wallet.id, TransactionKind::Expense, 25.0))
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds { .. }));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);

        let err = store
            .add_transaction(booking("missing", TransactionKind::Income, 1.0))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { collection: "wallet", .. }));

        let err = store
            .add_transaction(booking(&wallet.id, TransactionKind::Expense, -5.0))
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[test]
    fn test_moving_a_transaction_between_wallets() {
        let (_dir, mut store) = temp_store();
        let cash = store.create_wallet("u", "Cash").unwrap();
        let card = store.create_wallet("u", "Card").unwrap();
        store
            .add_transaction(booking(&card.id, TransactionKind::Income, 10.0))
            .unwrap();
        let salary = store
            .add_transaction(booking(&cash.id, TransactionKind::Income, 50.0))
            .unwrap();

        store
            .update_transaction(&salary.id, booking(&card.id, TransactionKind::Income, 50.0))
            .unwrap();
        let wallets = store.load("u").unwrap().wallets;
        assert_eq!(wallets[0].amount, 0.0);
        assert_eq!(wallets[1].amount, 60.0);

        // Cash is empty, so it cannot take over the card's spending
        let spend = store
            .add_transaction(booking(&card.id, TransactionKind::Expense, 60.0))
            .unwrap();
        assert!(store
            .update_transaction(&spend.id, booking(&cash.id, TransactionKind::Expense, 60.0))
            .is_err());
        let wallets = store.load("u").unwrap().wallets;
        assert_eq!(wallets[0].amount, 0.0);
        assert_eq!(wallets[1].amount, 0.0);
    }

    #[test]
    fn test_delete_wallet_drops_its_transactions() {
        let (_dir, mut store) = temp_store();
        let cash = store.create_wallet("u", "Cash").unwrap();
        let card = store.create_wallet("u", "Card").unwrap();
        store
            .add_transaction(booking(&cash.id, TransactionKind::Income, 5.0))
            .unwrap();
        store
            .add_transaction(booking(&card.id, TransactionKind::Income, 7.0))
            .unwrap();

        assert!(store.delete_wallet("intruder", &cash.id).is_err());
        let removed = store.delete_wallet("u", &cash.id).unwrap();
        assert_eq!(removed.name, "Cash");

        let mine = store.load("u").unwrap();
        assert_eq!(mine.wallets.len(), 1);
        assert_eq!(mine.transactions.len(), 1);
        assert_eq!(mine.transactions[0].wallet_id, card.id);
    }

    #[tokio::test]
    async fn test_subscriptions_feed_live_dashboard() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::open(dir.path().join("records.json"))
            .with_poll_interval(Duration::from_millis(20));
        store
            .create_activity(GoalKind::PlantTree.draft("u", &clock(), &ScoringConfig::default()))
            .unwrap();

        let (tx, rx) = mpsc::channel(16);
        let subscriptions = subscribe_all(&store, "u", &tx);
        let live = LiveDashboard::new(DashboardEngine::default(), Some("u".into()), &clock());
        let (mut dashboards, _handle) = live.spawn(rx, clock);

        let settled = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                dashboards.changed().await.unwrap();
                if !dashboards.borrow().loading {
                    break;
                }
            }
        })
        .await;
        assert!(settled.is_ok());

        let dashboard = dashboards.borrow().clone();
        assert_eq!(dashboard.stats.activity_count, 1);
        assert_eq!(dashboard.stats.total_impact, -10.0);
        assert!(dashboard.goals[0].completed_today);

        drop(subscriptions);
    }
}
