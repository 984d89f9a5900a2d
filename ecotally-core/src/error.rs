//! Error types for ecotally-core

use thiserror::Error;

/// Main error type for the ecotally-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Applying a transaction would overdraw the wallet
    #[error("insufficient funds in wallet {wallet_id}: balance {balance:.2}, change {change:.2}")]
    InsufficientFunds {
        wallet_id: String,
        balance: f64,
        change: f64,
    },

    /// Transaction belongs to a different wallet
    #[error("transaction {transaction_id} belongs to wallet {expected}, not {actual}")]
    WalletMismatch {
        transaction_id: String,
        expected: String,
        actual: String,
    },

    /// Goal id or category is not a daily goal
    #[error("unknown daily goal: {0}")]
    UnknownGoal(String),

    /// No record with this id belongs to the owner
    #[error("{collection} {id} not found")]
    NotFound { collection: &'static str, id: String },

    /// Record store error
    #[error("record store error: {0}")]
    Store(String),
}

/// Result type alias for ecotally-core
pub type Result<T> = std::result::Result<T, Error>;
