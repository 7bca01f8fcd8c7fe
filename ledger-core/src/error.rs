//! Error type shared by the ledger engines and the session.

use chrono::NaiveDate;

use crate::store::{Collection, StoreError};

/// The primary error type for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A referenced seller or purchase no longer exists.
    #[error("{collection} record {id} no longer exists")]
    NotFound { collection: Collection, id: String },

    /// Input rejected before any store call was made.
    #[error("{0}")]
    Validation(String),

    /// The store failed to complete a call.
    #[error(transparent)]
    Store(StoreError),

    /// Billing was requested for a range without unbilled purchases.
    #[error("no unbilled purchases between {from} and {to}")]
    NothingToBill { from: NaiveDate, to: NaiveDate },

    /// Commit requested without a previously generated bill.
    #[error("no generated bill is waiting to be committed")]
    NoPendingBill,
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { collection, id } => LedgerError::NotFound { collection, id },
            other => LedgerError::Store(other),
        }
    }
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    /// A quantity or total no longer fits in a `u64`.
    pub fn amount_too_large() -> Self {
        LedgerError::validation("amount too large")
    }
}

/// A convenience type alias for `Result<T, LedgerError>`.
pub type LedgerResult<T> = Result<T, LedgerError>;
