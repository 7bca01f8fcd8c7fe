use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerResult;
use crate::money;

/// One purchased item, snapshotted at save time.
///
/// Name and price are copied from the catalog so later edits to the seller
/// never change historical purchases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLine {
    pub item_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: u64,
    pub qty: u64,
}

impl PurchaseLine {
    /// Line amount in the smallest currency unit.
    pub fn amount(&self) -> LedgerResult<u64> {
        money::line_amount(self.qty, self.price)
    }
}

/// Purchase model representing one dated save of a seller cart.
///
/// Maps to documents of the `purchases` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    /// Store-assigned identifier
    #[serde(default)]
    pub id: String,

    /// Seller at the time of purchase
    pub seller_id: String,

    /// Seller name snapshot
    #[serde(default)]
    pub seller_name: String,

    /// Purchase date (`YYYY-MM-DD`)
    pub date: NaiveDate,

    /// Purchased lines, every one with `qty > 0`
    #[serde(default)]
    pub items: Vec<PurchaseLine>,

    /// Whether this purchase has been settled by a bill
    #[serde(default)]
    pub billed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billed_at: Option<DateTime<Utc>>,
}

impl Purchase {
    /// Sum of `qty * price` over every line.
    pub fn total(&self) -> LedgerResult<u64> {
        self.items
            .iter()
            .try_fold(0, |total, line| money::add(total, line.amount()?))
    }
}
