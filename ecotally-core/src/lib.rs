//! # ecotally-core
//!
//! Core library for ecotally - a household sustainability and spending tracker.
//!
//! This library provides:
//! - Domain types for carbon activities, transactions, and usage logs
//! - The dashboard engine: derived statistics, streaks, achievements,
//!   eco-score, and daily goals
//! - Recency-bucketed chart series
//! - Live feeds that keep a dashboard current as records change
//! - Wallet balance bookkeeping
//! - A JSON file record store
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through three layers:
//! - **Records:** Immutable snapshots from the store or a live feed
//! - **Engine:** Pure, synchronous evaluation against an injected [`analytics::Clock`]
//! - **Dashboard:** Stats, goals and achievements, recomputed on every change
//!
//! ## Example
//!
//! ```rust,no_run
//! use ecotally_core::analytics::{Clock, DashboardEngine};
//! use ecotally_core::store::{JsonFileStore, RecordStore};
//! use ecotally_core::Config;
//!
//! let config = Config::load().expect("failed to load config");
//! let store = JsonFileStore::open(config.records_path());
//! let records = store.load("user-1").expect("failed to load records");
//!
//! let engine = DashboardEngine::new(config.scoring.clone());
//! let dashboard = engine.evaluate(Some("user-1"), &records, &Clock::system());
//! println!("eco-score: {}", dashboard.stats.eco_score);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::Wallet;
pub use store::{JsonFileStore, RecordStore};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod error;
pub mod feed;
pub mod format;
pub mod ledger;
pub mod logging;
pub mod store;
pub mod types;
