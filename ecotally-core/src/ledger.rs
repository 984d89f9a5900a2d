//! Wallet balances kept in step with their transactions.
//!
//! A wallet carries its current amount plus running income and expense
//! totals. Creating, editing or deleting a transaction adjusts all three.
//! Every operation works on a copy and only commits when the result is
//! valid, so a rejected change leaves the wallet exactly as it was.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{TransactionKind, TransactionRecord};

/// A wallet document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Current balance
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub total_income: f64,
    #[serde(default)]
    pub total_expenses: f64,
    #[serde(rename = "uid", default)]
    pub owner_id: String,
}

impl Wallet {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner_id: owner_id.into(),
            ..Default::default()
        }
    }

    /// Record a new transaction against this wallet.
    ///
    /// Fails with [`Error::InsufficientFunds`] if an expense would overdraw.
    pub fn apply(&mut self, tx: &TransactionRecord) -> Result<()> {
        self.check_wallet(tx)?;
        let mut next = self.clone();
        next.add(tx);
        self.commit(next, signed(tx))
    }

    /// Undo a transaction previously applied to this wallet.
    ///
    /// Reverting an income that has already been spent fails with
    /// [`Error::InsufficientFunds`].
    pub fn revert(&mut self, tx: &TransactionRecord) -> Result<()> {
        self.check_wallet(tx)?;
        let mut next = self.clone();
        next.subtract(tx);
        self.commit(next, -signed(tx))
    }

    /// Swap an edited transaction for its previous version.
    ///
    /// Only the final balance is checked: an edit that lowers an expense
    /// and raises another in one step is fine as long as the result is
    /// not negative.
    pub fn replace(&mut self, old: &TransactionRecord, new: &TransactionRecord) -> Result<()> {
        self.check_wallet(old)?;
        self.check_wallet(new)?;
        let mut next = self.clone();
        next.subtract(old);
        next.add(new);
        self.commit(next, signed(new) - signed(old))
    }

    /// Drop a deleted transaction's effect.
    ///
    /// Deletion always succeeds for a matching wallet, even if it leaves the
    /// balance negative; the record is already gone.
    pub fn remove(&mut self, tx: &TransactionRecord) -> Result<()> {
        self.check_wallet(tx)?;
        self.subtract(tx);
        if self.amount < 0.0 {
            tracing::warn!(
                wallet_id = %self.id,
                transaction_id = %tx.id,
                amount = self.amount,
                "Removing transaction left wallet negative"
            );
        }
        Ok(())
    }

    fn check_wallet(&self, tx: &TransactionRecord) -> Result<()> {
        if tx.wallet_id != self.id {
            return Err(Error::WalletMismatch {
                transaction_id: tx.id.clone(),
                expected: tx.wallet_id.clone(),
                actual: self.id.clone(),
            });
        }
        Ok(())
    }

    fn commit(&mut self, next: Wallet, change: f64) -> Result<()> {
        if next.amount < 0.0 {
            return Err(Error::InsufficientFunds {
                wallet_id: self.id.clone(),
                balance: self.amount,
                change,
            });
        }
        *self = next;
        Ok(())
    }

    fn add(&mut self, tx: &TransactionRecord) {
        match tx.kind {
            TransactionKind::Income => {
                self.amount += tx.amount;
                self.total_income += tx.amount;
            }
            TransactionKind::Expense => {
                self.amount -= tx.amount;
                self.total_expenses += tx.amount;
            }
        }
    }

    fn subtract(&mut self, tx: &TransactionRecord) {
        match tx.kind {
            TransactionKind::Income => {
                self.amount -= tx.amount;
                self.total_income -= tx.amount;
            }
            TransactionKind::Expense => {
                self.amount += tx.amount;
                self.total_expenses -= tx.amount;
            }
        }
    }
}

/// Effect of a transaction on the balance.
fn signed(tx: &TransactionRecord) -> f64 {
    match tx.kind {
        TransactionKind::Income => tx.amount,
        TransactionKind::Expense => -tx.amount,
    }
}
