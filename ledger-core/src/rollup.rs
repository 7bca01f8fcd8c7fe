//! Calendar week/month rollups over purchase totals.
//!
//! Rollups ignore billing status unless a view says otherwise, and they are
//! rebuilt from the full purchase set on every call.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::error::LedgerResult;
use crate::models::Purchase;
use crate::money;

/// Separator between the two dates of a week label.
pub const WEEK_LABEL_SEPARATOR: char = '\u{2014}';

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Sunday closing the week that starts on `week_start(date)`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(6)
}

/// `YYYY-MM` of `date`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Monday and Sunday of the week containing `date`, joined by
/// [`WEEK_LABEL_SEPARATOR`].
pub fn week_label(date: NaiveDate) -> String {
    format!(
        "{}{}{}",
        week_start(date),
        WEEK_LABEL_SEPARATOR,
        week_end(date)
    )
}

fn bucket_by<F>(purchases: &[Purchase], key: F) -> LedgerResult<BTreeMap<String, u64>>
where
    F: Fn(NaiveDate) -> String,
{
    let mut buckets = BTreeMap::new();
    for purchase in purchases {
        let bucket = buckets.entry(key(purchase.date)).or_insert(0);
        *bucket = money::add(*bucket, purchase.total()?)?;
    }
    Ok(buckets)
}

/// Purchase value per week label.
pub fn bucket_by_week(purchases: &[Purchase]) -> LedgerResult<BTreeMap<String, u64>> {
    bucket_by(purchases, week_label)
}

/// Purchase value per month key.
pub fn bucket_by_month(purchases: &[Purchase]) -> LedgerResult<BTreeMap<String, u64>> {
    bucket_by(purchases, month_key)
}

/// The `n` latest buckets, newest first.
///
/// Keys start with an ISO date, so string order is chronological order.
pub fn most_recent(buckets: &BTreeMap<String, u64>, n: usize) -> Vec<PeriodTotal> {
    buckets
        .iter()
        .rev()
        .take(n)
        .map(|(period, total)| PeriodTotal {
            period: period.clone(),
            total: *total,
        })
        .collect()
}

/// Total for one week or month bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodTotal {
    pub period: String,
    pub total: u64,
}

/// Aggregate value bought from one seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerTotal {
    pub seller_id: String,
    pub seller_name: String,
    pub total: u64,
}

/// Per-seller totals in the order sellers first appear.
fn seller_totals<'a, I>(purchases: I) -> LedgerResult<Vec<SellerTotal>>
where
    I: IntoIterator<Item = &'a Purchase>,
{
    let mut totals: Vec<SellerTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for purchase in purchases {
        let i = *index.entry(purchase.seller_id.as_str()).or_insert_with(|| {
            totals.push(SellerTotal {
                seller_id: purchase.seller_id.clone(),
                seller_name: purchase.seller_name.clone(),
                total: 0,
            });
            totals.len() - 1
        });
        totals[i].total = money::add(totals[i].total, purchase.total()?)?;
    }
    Ok(totals)
}

/// The `n` sellers with the highest purchase value.
///
/// The sort is stable: equal totals keep first-seen order.
pub fn top_sellers(purchases: &[Purchase], n: usize) -> LedgerResult<Vec<SellerTotal>> {
    let mut totals = seller_totals(purchases)?;
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals.truncate(n);
    Ok(totals)
}

/// Unbilled purchase value per seller, sellers with nothing pending omitted.
pub fn unbilled_by_seller(purchases: &[Purchase]) -> LedgerResult<Vec<SellerTotal>> {
    seller_totals(purchases.iter().filter(|p| !p.billed))
}

/// Figures shown in the dashboard header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub week: String,
    pub week_total: u64,
    pub month: String,
    pub month_total: u64,
    pub unbilled_total: u64,
    pub unbilled_count: usize,
}

/// Current week and month totals plus everything still unbilled.
pub fn summary(purchases: &[Purchase], today: NaiveDate) -> LedgerResult<Summary> {
    let week = week_label(today);
    let month = month_key(today);
    let week_total = bucket_by_week(purchases)?.get(&week).copied().unwrap_or(0);
    let month_total = bucket_by_month(purchases)?.get(&month).copied().unwrap_or(0);
    let unbilled: Vec<&Purchase> = purchases.iter().filter(|p| !p.billed).collect();

    let mut unbilled_total = 0;
    for purchase in &unbilled {
        unbilled_total = money::add(unbilled_total, purchase.total()?)?;
    }

    Ok(Summary {
        week,
        week_total,
        month,
        month_total,
        unbilled_total,
        unbilled_count: unbilled.len(),
    })
}
