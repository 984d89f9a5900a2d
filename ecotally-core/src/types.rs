//! Core domain types for ecotally
//!
//! These types are immutable snapshots of the records a user logs: carbon
//! activities, wallet transactions, and electricity/water usage readings.
//! They arrive already filtered to a single owner and ordered newest first;
//! nothing in the analytics layer mutates them.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Impact** | Signed kg CO2-equivalent; negative offsets, positive emits |
//! | **Owner** | The signed-in account whose records are being summarized |
//! | **Usage log** | A single electricity (kWh) or water (liters) reading |
//!
//! Wire names follow the document store the records come from (`impact`,
//! `date`, `uid`, `kwh`, `liters`), while the Rust field names say what the
//! values mean.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::Wallet;

// ============================================
// Activities
// ============================================

/// Category of a logged carbon activity.
///
/// Unknown categories are preserved verbatim in [`ActivityCategory::Other`]
/// so a snapshot can be re-serialized without losing data. A record with no
/// readable category gets `Other("")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityCategory {
    Car,
    Bus,
    Train,
    Flight,
    Bike,
    Walk,
    Electricity,
    Gas,
    Meat,
    Vegetarian,
    Shopping,
    Waste,
    Recycling,
    PlantTree,
    Volunteer,
    Other(String),
}

impl ActivityCategory {
    /// Returns the identifier used in record storage
    pub fn as_str(&self) -> &str {
        match self {
            ActivityCategory::Car => "car",
            ActivityCategory::Bus => "bus",
            ActivityCategory::Train => "train",
            ActivityCategory::Flight => "flight",
            ActivityCategory::Bike => "bike",
            ActivityCategory::Walk => "walk",
            ActivityCategory::Electricity => "electricity",
            ActivityCategory::Gas => "gas",
            ActivityCategory::Meat => "meat",
            ActivityCategory::Vegetarian => "vegetarian",
            ActivityCategory::Shopping => "shopping",
            ActivityCategory::Waste => "waste",
            ActivityCategory::Recycling => "recycling",
            ActivityCategory::PlantTree => "plant_tree",
            ActivityCategory::Volunteer => "volunteer",
            ActivityCategory::Other(name) => name,
        }
    }

    /// Public-transport trips, counted toward the transit achievement.
    pub fn is_transit(&self) -> bool {
        matches!(self, ActivityCategory::Bus | ActivityCategory::Train)
    }

    /// Categories that double as daily goals and earn a double activity bonus.
    pub fn is_goal(&self) -> bool {
        matches!(
            self,
            ActivityCategory::PlantTree | ActivityCategory::Volunteer
        )
    }
}

impl Default for ActivityCategory {
    fn default() -> Self {
        ActivityCategory::Other(String::new())
    }
}

impl From<String> for ActivityCategory {
    fn from(value: String) -> Self {
        match value.as_str() {
            "car" => ActivityCategory::Car,
            "bus" => ActivityCategory::Bus,
            "train" => ActivityCategory::Train,
            "flight" => ActivityCategory::Flight,
            "bike" => ActivityCategory::Bike,
            "walk" => ActivityCategory::Walk,
            "electricity" => ActivityCategory::Electricity,
            "gas" => ActivityCategory::Gas,
            "meat" => ActivityCategory::Meat,
            "vegetarian" => ActivityCategory::Vegetarian,
            "shopping" => ActivityCategory::Shopping,
            "waste" => ActivityCategory::Waste,
            "recycling" => ActivityCategory::Recycling,
            "plant_tree" => ActivityCategory::PlantTree,
            "volunteer" => ActivityCategory::Volunteer,
            _ => ActivityCategory::Other(value),
        }
    }
}

impl From<ActivityCategory> for String {
    fn from(value: ActivityCategory) -> Self {
        match value {
            ActivityCategory::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::str::FromStr for ActivityCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ActivityCategory::from(s.to_string()))
    }
}

impl std::fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A logged carbon activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Document id
    #[serde(default)]
    pub id: String,
    /// What kind of activity this was
    #[serde(default, deserialize_with = "lenient::category")]
    pub category: ActivityCategory,
    /// User-facing title
    #[serde(default)]
    pub title: String,
    /// Signed kg CO2e (negative = offset)
    #[serde(rename = "impact", default, deserialize_with = "lenient::number")]
    pub impact_kg: f64,
    /// When it happened; `None` for pending writes or unreadable values
    #[serde(
        rename = "date",
        default,
        deserialize_with = "lenient::timestamp"
    )]
    pub occurred_at: Option<DateTime<Utc>>,
    /// Owning account
    #[serde(rename = "uid", default)]
    pub owner_id: String,
}

/// An activity about to be created through the record store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub category: ActivityCategory,
    pub title: String,
    pub impact_kg: f64,
    pub occurred_at: DateTime<Utc>,
    pub owner_id: String,
}

impl NewActivity {
    /// Materialize the record once the store has assigned an id.
    pub fn into_record(self, id: String) -> ActivityRecord {
        ActivityRecord {
            id,
            category: self.category,
            title: self.title,
            impact_kg: self.impact_kg,
            occurred_at: Some(self.occurred_at),
            owner_id: self.owner_id,
        }
    }
}

// ============================================
// Transactions
// ============================================

/// Direction of a wallet transaction. Anything that is not an income
/// counts as an expense.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

/// A wallet transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::kind")]
    pub kind: TransactionKind,
    /// Non-negative amount in the wallet's currency
    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(
        rename = "date",
        default,
        deserialize_with = "lenient::timestamp"
    )]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(rename = "walletId", default)]
    pub wallet_id: String,
    #[serde(rename = "uid", default)]
    pub owner_id: String,
}

/// A transaction about to be booked through the record store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub wallet_id: String,
    pub owner_id: String,
}

impl NewTransaction {
    pub fn into_record(self, id: String) -> TransactionRecord {
        TransactionRecord {
            id,
            kind: self.kind,
            amount: self.amount,
            category: self.category,
            description: self.description,
            occurred_at: Some(self.occurred_at),
            wallet_id: self.wallet_id,
            owner_id: self.owner_id,
        }
    }
}

impl TransactionRecord {
    /// Draft carrying this transaction's current values, for edits.
    pub fn to_draft(&self, fallback_time: DateTime<Utc>) -> NewTransaction {
        NewTransaction {
            kind: self.kind,
            amount: self.amount,
            category: self.category.clone(),
            description: self.description.clone(),
            occurred_at: self.occurred_at.unwrap_or(fallback_time),
            wallet_id: self.wallet_id.clone(),
            owner_id: self.owner_id.clone(),
        }
    }
}

// ============================================
// Usage logs
// ============================================

/// Which utility a usage log measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    /// Kilowatt-hours
    Electricity,
    /// Liters
    Water,
}

impl UsageKind {
    /// Field the reading is stored under
    pub fn wire_field(&self) -> &'static str {
        match self {
            UsageKind::Electricity => "kwh",
            UsageKind::Water => "liters",
        }
    }

    /// Unit suffix for display
    pub fn unit(&self) -> &'static str {
        match self {
            UsageKind::Electricity => "kWh",
            UsageKind::Water => "L",
        }
    }

    /// Collection the logs are stored in
    pub fn collection_name(&self) -> &'static str {
        match self {
            UsageKind::Electricity => "electricity_logs",
            UsageKind::Water => "water_logs",
        }
    }
}

/// A single electricity or water reading.
///
/// Stored documents name the reading `kwh` or `liters` depending on the
/// collection; [`RecordSet`] writes those names back when saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLogRecord {
    #[serde(default)]
    pub id: String,
    /// kWh for electricity, liters for water
    #[serde(
        default,
        alias = "kwh",
        alias = "liters",
        deserialize_with = "lenient::number"
    )]
    pub quantity: f64,
    #[serde(
        rename = "date",
        default,
        deserialize_with = "lenient::timestamp"
    )]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(rename = "uid", default)]
    pub owner_id: String,
}

/// A usage reading about to be logged through the record store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUsageLog {
    pub kind: UsageKind,
    pub quantity: f64,
    pub occurred_at: DateTime<Utc>,
    pub owner_id: String,
}

impl NewUsageLog {
    pub fn into_record(self, id: String) -> UsageLogRecord {
        UsageLogRecord {
            id,
            quantity: self.quantity,
            occurred_at: Some(self.occurred_at),
            owner_id: self.owner_id,
        }
    }
}

// ============================================
// Record set
// ============================================

/// The record collections the dashboard is computed from, plus the wallets
/// transactions are booked against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(default)]
    pub activities: Vec<ActivityRecord>,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
    #[serde(default, serialize_with = "usage_wire::electricity")]
    pub electricity_logs: Vec<UsageLogRecord>,
    #[serde(default, serialize_with = "usage_wire::water")]
    pub water_logs: Vec<UsageLogRecord>,
    #[serde(default)]
    pub wallets: Vec<Wallet>,
}

impl RecordSet {
    /// Usage logs for the given utility
    pub fn usage(&self, kind: UsageKind) -> &[UsageLogRecord] {
        match kind {
            UsageKind::Electricity => &self.electricity_logs,
            UsageKind::Water => &self.water_logs,
        }
    }

    pub fn usage_mut(&mut self, kind: UsageKind) -> &mut Vec<UsageLogRecord> {
        match kind {
            UsageKind::Electricity => &mut self.electricity_logs,
            UsageKind::Water => &mut self.water_logs,
        }
    }

    /// Keep only records owned by `owner_id`, newest first.
    ///
    /// Records without a timestamp sort first, matching how pending writes
    /// show up at the top of a live query. Wallets keep their stored order.
    pub fn for_owner(&self, owner_id: &str) -> RecordSet {
        fn newest_first<T: Clone>(
            records: &[T],
            owner: impl Fn(&T) -> &str,
            at: impl Fn(&T) -> Option<DateTime<Utc>>,
            owner_id: &str,
        ) -> Vec<T> {
            let mut kept: Vec<T> = records
                .iter()
                .filter(|r| owner(r) == owner_id)
                .cloned()
                .collect();
            kept.sort_by(|a, b| match (at(a), at(b)) {
                (None, None) => std::cmp::Ordering::Equal,
                (None, Some(_)) => std::cmp::Ordering::Less,
                (Some(_), None) => std::cmp::Ordering::Greater,
                (Some(x), Some(y)) => y.cmp(&x),
            });
            kept
        }

        RecordSet {
            activities: newest_first(
                &self.activities,
                |r| r.owner_id.as_str(),
                |r| r.occurred_at,
                owner_id,
            ),
            transactions: newest_first(
                &self.transactions,
                |r| r.owner_id.as_str(),
                |r| r.occurred_at,
                owner_id,
            ),
            electricity_logs: newest_first(
                &self.electricity_logs,
                |r| r.owner_id.as_str(),
                |r| r.occurred_at,
                owner_id,
            ),
            water_logs: newest_first(
                &self.water_logs,
                |r| r.owner_id.as_str(),
                |r| r.occurred_at,
                owner_id,
            ),
            wallets: self
                .wallets
                .iter()
                .filter(|w| w.owner_id == owner_id)
                .cloned()
                .collect(),
        }
    }

    /// Total number of activity, transaction and usage records
    pub fn len(&self) -> usize {
        self.activities.len()
            + self.transactions.len()
            + self.electricity_logs.len()
            + self.water_logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.wallets.is_empty()
    }
}

/// Writes usage logs back under the field name their collection uses.
mod usage_wire {
    use super::{UsageKind, UsageLogRecord};
    use serde::ser::{SerializeMap, Serializer};
    use serde::Serialize;

    pub fn electricity<S: Serializer>(logs: &[UsageLogRecord], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(logs.iter().map(|log| Wire(log, UsageKind::Electricity)))
    }

    pub fn water<S: Serializer>(logs: &[UsageLogRecord], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(logs.iter().map(|log| Wire(log, UsageKind::Water)))
    }

    struct Wire<'a>(&'a UsageLogRecord, UsageKind);

    impl Serialize for Wire<'_> {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            let Wire(log, kind) = self;
            let mut map = s.serialize_map(Some(4))?;
            map.serialize_entry("id", &log.id)?;
            map.serialize_entry(kind.wire_field(), &log.quantity)?;
            map.serialize_entry("date", &log.occurred_at)?;
            map.serialize_entry("uid", &log.owner_id)?;
            map.end()
        }
    }
}

/// Field deserializers that never fail a whole batch.
///
/// One malformed document degrades to a default value instead of taking the
/// rest of the snapshot down with it.
mod lenient {
    use super::{ActivityCategory, TransactionKind};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// RFC 3339 strings, epoch milliseconds, or `{ "seconds": .. }` objects.
    /// Anything else (including `null`) becomes `None`, which the analytics
    /// layer reads as "now".
    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(parse_timestamp))
    }

    /// Numbers and numeric strings; anything else is 0.
    pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        let number = match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(number.filter(|n| n.is_finite()).unwrap_or(0.0))
    }

    pub fn category<'de, D>(deserializer: D) -> Result<ActivityCategory, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => ActivityCategory::from(s),
            _ => ActivityCategory::default(),
        })
    }

    /// `"income"` is an income; everything else books as an expense.
    pub fn kind<'de, D>(deserializer: D) -> Result<TransactionKind, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) if s == "income" => TransactionKind::Income,
            _ => TransactionKind::Expense,
        })
    }

    fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
            Value::Object(map) => map
                .get("seconds")
                .and_then(Value::as_i64)
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_category_round_trips_unknown_names() {
        let category: ActivityCategory = serde_json::from_value(json!("kayak")).unwrap();
        assert_eq!(category, ActivityCategory::Other("kayak".to_string()));
        assert_eq!(serde_json::to_value(&category).unwrap(), json!("kayak"));

        let category: ActivityCategory = serde_json::from_value(json!("plant_tree")).unwrap();
        assert_eq!(category, ActivityCategory::PlantTree);
        assert!(category.is_goal());
        assert!(!category.is_transit());
        assert!(ActivityCategory::Train.is_transit());
    }

    #[test]
    fn test_activity_wire_names() {
        let activity: ActivityRecord = serde_json::from_value(json!({
            "id": "a1",
            "category": "bus",
            "title": "Commute",
            "impact": 1.5,
            "date": "2026-03-04T08:30:00Z",
            "uid": "user-1"
        }))
        .unwrap();

        assert_eq!(activity.category, ActivityCategory::Bus);
        assert_eq!(activity.impact_kg, 1.5);
        assert_eq!(
            activity.occurred_at,
            Some(Utc.with_ymd_and_hms(2026, 3, 4, 8, 30, 0).unwrap())
        );
        assert_eq!(activity.owner_id, "user-1");
    }

    #[test]
    fn test_malformed_timestamp_is_none() {
        let activity: ActivityRecord = serde_json::from_value(json!({
            "category": "car",
            "impact": 3.0,
            "date": "not a date",
            "uid": "user-1"
        }))
        .unwrap();
        assert!(activity.occurred_at.is_none());

        let log: UsageLogRecord = serde_json::from_value(json!({
            "kwh": 4.2,
            "date": null,
            "uid": "user-1"
        }))
        .unwrap();
        assert!(log.occurred_at.is_none());
        assert_eq!(log.quantity, 4.2);
    }

    #[test]
    fn test_epoch_and_seconds_timestamps() {
        let log: UsageLogRecord = serde_json::from_value(json!({
            "liters": 120.0,
            "date": { "seconds": 1_700_000_000, "nanoseconds": 0 },
            "uid": "u"
        }))
        .unwrap();
        assert_eq!(log.occurred_at.map(|t| t.timestamp()), Some(1_700_000_000));

        let log: UsageLogRecord = serde_json::from_value(json!({
            "quantity": 1.0,
            "date": 1_700_000_000_000i64,
            "uid": "u"
        }))
        .unwrap();
        assert_eq!(log.occurred_at.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn test_malformed_fields_do_not_drop_the_batch() {
        let records: RecordSet = serde_json::from_str(
            r#"{
                "activities": [
                    { "id": "ok", "category": "bus", "impact": 1.5, "uid": "u" },
                    { "id": "no-category", "impact": 2.0, "uid": "u" },
                    { "id": "null-impact", "category": "car", "impact": null, "uid": "u" },
                    { "id": "text-impact", "category": 7, "impact": "4.5", "uid": "u" }
                ],
                "transactions": [
                    { "id": "t", "amount": null, "walletId": "w", "uid": "u" }
                ],
                "electricity_logs": [ { "id": "e", "kwh": "lots", "uid": "u" } ]
            }"#,
        )
        .unwrap();

        assert_eq!(records.activities.len(), 4);
        assert_eq!(records.activities[1].category, ActivityCategory::default());
        assert_eq!(records.activities[1].impact_kg, 2.0);
        assert_eq!(records.activities[2].impact_kg, 0.0);
        assert_eq!(records.activities[3].category, ActivityCategory::Other(String::new()));
        assert_eq!(records.activities[3].impact_kg, 4.5);

        assert_eq!(records.transactions[0].kind, TransactionKind::Expense);
        assert_eq!(records.transactions[0].amount, 0.0);
        assert_eq!(records.electricity_logs[0].quantity, 0.0);
    }

    #[test]
    fn test_usage_logs_keep_their_field_names() {
        let records: RecordSet = serde_json::from_value(json!({
            "electricity_logs": [ { "id": "e", "kwh": 4.5, "date": null, "uid": "u" } ],
            "water_logs": [ { "id": "w", "liters": 80.0, "date": null, "uid": "u" } ]
        }))
        .unwrap();

        let written = serde_json::to_value(&records).unwrap();
        let electricity = &written["electricity_logs"][0];
        assert_eq!(electricity["kwh"], json!(4.5));
        assert!(electricity.get("quantity").is_none());
        let water = &written["water_logs"][0];
        assert_eq!(water["liters"], json!(80.0));
        assert!(water.get("kwh").is_none());

        let reread: RecordSet = serde_json::from_value(written).unwrap();
        assert_eq!(reread, records);
    }

    #[test]
    fn test_for_owner_filters_and_orders() {
        let at = |day: u32| Some(Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap());
        let tx = |id: &str, owner: &str, day: u32| TransactionRecord {
            id: id.to_string(),
            kind: TransactionKind::Expense,
            amount: 1.0,
            category: None,
            description: None,
            occurred_at: at(day),
            wallet_id: "w".to_string(),
            owner_id: owner.to_string(),
        };
        let records = RecordSet {
            transactions: vec![tx("old", "me", 1), tx("other", "you", 5), tx("new", "me", 9)],
            ..Default::default()
        };

        let mine = records.for_owner("me");
        let ids: Vec<_> = mine.transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert_eq!(mine.len(), 2);
    }
}
