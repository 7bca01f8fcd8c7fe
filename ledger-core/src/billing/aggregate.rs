use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::Purchase;
use crate::money;

/// Quantity of one item bought on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateLine {
    pub date: NaiveDate,
    pub qty: u64,
    /// Unit price snapshotted on that purchase
    pub price: u64,
    pub amount: u64,
}

/// Bill section for a single item of a seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBill {
    pub item_id: String,
    pub name: String,
    /// Unit price of the earliest dated line
    pub price: u64,
    /// Date-wise lines, ascending by date
    pub lines: Vec<DateLine>,
    /// Printable form of `lines`, e.g. `2024-01-02: 3, 2024-01-09: 2`
    pub date_wise_lines: String,
    pub amount: u64,
}

/// Bill section for one seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerBill {
    pub seller_id: String,
    pub seller_name: String,
    pub items: Vec<ItemBill>,
    pub total: u64,
}

/// Aggregated view over the unbilled purchases of a date range.
///
/// Not persisted. `purchase_ids` lists the purchases the bill covers so a
/// later commit can mark exactly those as billed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub sellers: Vec<SellerBill>,
    pub grand_total: u64,
    pub purchase_ids: Vec<String>,
}

impl Bill {
    pub fn seller(&self, seller_name: &str) -> Option<&SellerBill> {
        self.sellers.iter().find(|s| s.seller_name == seller_name)
    }
}

impl SellerBill {
    pub fn item(&self, item_name: &str) -> Option<&ItemBill> {
        self.items.iter().find(|i| i.name == item_name)
    }
}

/// Renders date-wise lines as `date: qty` pairs joined by commas.
pub fn format_date_lines(lines: &[DateLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{}: {}", line.date, line.qty))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Purchases a billing run for `[from, to]` would pick up.
pub fn billable<'a>(
    purchases: &'a [Purchase],
    from: NaiveDate,
    to: NaiveDate,
) -> impl Iterator<Item = &'a Purchase> {
    purchases
        .iter()
        .filter(move |p| !p.billed && from <= p.date && p.date <= to)
}

/// Groups the unbilled purchases of `[from, to]` into a bill.
///
/// Sellers and their items appear in the order they are first met in
/// `purchases`. Every (seller, item) pair gets one date line per purchase
/// containing it; lines are then sorted by date. The item's display price is
/// taken from its earliest line, while amounts always use each line's own
/// snapshotted price.
///
/// # Errors
///
/// Returns [`LedgerError::NothingToBill`] when no purchase qualifies, and a
/// validation error when an amount does not fit in a `u64`.
pub fn aggregate(purchases: &[Purchase], from: NaiveDate, to: NaiveDate) -> LedgerResult<Bill> {
    let selected: Vec<&Purchase> = billable(purchases, from, to).collect();
    if selected.is_empty() {
        return Err(LedgerError::NothingToBill { from, to });
    }

    let mut sellers: Vec<SellerBill> = Vec::new();
    let mut seller_index: HashMap<&str, usize> = HashMap::new();
    let mut item_index: HashMap<(usize, &str), usize> = HashMap::new();

    for purchase in &selected {
        let s = *seller_index
            .entry(purchase.seller_id.as_str())
            .or_insert_with(|| {
                sellers.push(SellerBill {
                    seller_id: purchase.seller_id.clone(),
                    seller_name: purchase.seller_name.clone(),
                    items: Vec::new(),
                    total: 0,
                });
                sellers.len() - 1
            });

        for line in &purchase.items {
            let seller = &mut sellers[s];
            let i = *item_index
                .entry((s, line.item_id.as_str()))
                .or_insert_with(|| {
                    seller.items.push(ItemBill {
                        item_id: line.item_id.clone(),
                        name: line.name.clone(),
                        price: 0,
                        lines: Vec::new(),
                        date_wise_lines: String::new(),
                        amount: 0,
                    });
                    seller.items.len() - 1
                });

            seller.items[i].lines.push(DateLine {
                date: purchase.date,
                qty: line.qty,
                price: line.price,
                amount: line.amount()?,
            });
        }
    }

    for seller in &mut sellers {
        for item in &mut seller.items {
            item.lines.sort_by_key(|line| line.date);
            item.price = item.lines.first().map_or(0, |line| line.price);
            item.amount = money::sum(item.lines.iter().map(|line| line.amount))?;
            item.date_wise_lines = format_date_lines(&item.lines);
        }
        seller.total = money::sum(seller.items.iter().map(|item| item.amount))?;
    }

    let grand_total = money::sum(sellers.iter().map(|seller| seller.total))?;
    let purchase_ids = selected.iter().map(|p| p.id.clone()).collect();

    info!(
        "Generated bill for {} to {}: {} purchase(s), {} seller(s), total {}",
        from,
        to,
        selected.len(),
        sellers.len(),
        grand_total
    );

    Ok(Bill {
        from,
        to,
        sellers,
        grand_total,
        purchase_ids,
    })
}
