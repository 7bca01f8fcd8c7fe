//! The single session that drives the ledger.
//!
//! Holds what used to be ambient state: the selected seller, the pending
//! cart and the ids of the last generated bill. Every read goes to the store;
//! nothing is cached between calls.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::batch::BatchReport;
use crate::billing::{self, Bill};
use crate::cart::Cart;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{decode_all, Item, Purchase, PurchaseLine, Seller, SellerDraft};
use crate::rollup::{self, PeriodTotal, SellerTotal, Summary};
use crate::store::{to_payload, Collection, RecordStore, StoreError};

/// Result of deleting a seller together with its purchases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    /// Purchase deletions, one step per purchase
    pub purchases: BatchReport,
    /// Whether the seller document itself was removed
    pub seller_deleted: bool,
    pub seller_error: Option<String>,
}

impl CascadeReport {
    pub fn is_complete(&self) -> bool {
        self.purchases.is_complete() && self.seller_deleted
    }
}

/// Snapshot of the cart for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub seller_id: Option<String>,
    pub lines: Vec<PurchaseLine>,
    pub total: u64,
}

/// Seller document body as written to the store.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SellerFields<'a> {
    name: &'a str,
    contact: &'a str,
    items: &'a [Item],
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

/// Owner of the selection, the cart and the pending bill slot.
pub struct Session {
    store: Arc<dyn RecordStore>,
    selected_seller: Option<String>,
    cart: Cart,
    last_bill: Option<Vec<String>>,
}

impl Session {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            selected_seller: None,
            cart: Cart::new(),
            last_bill: None,
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn selected_seller(&self) -> Option<&str> {
        self.selected_seller.as_deref()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Ids covered by the last generated, not yet committed bill.
    pub fn pending_bill(&self) -> Option<&[String]> {
        self.last_bill.as_deref()
    }

    // --- Reads ---

    pub async fn list_sellers(&self) -> LedgerResult<Vec<Seller>> {
        let records = self.store.list(Collection::Sellers).await?;
        Ok(decode_all(Collection::Sellers, records)?)
    }

    pub async fn list_purchases(&self) -> LedgerResult<Vec<Purchase>> {
        let records = self.store.list(Collection::Purchases).await?;
        Ok(decode_all(Collection::Purchases, records)?)
    }

    pub async fn seller(&self, seller_id: &str) -> LedgerResult<Seller> {
        self.list_sellers()
            .await?
            .into_iter()
            .find(|s| s.id == seller_id)
            .ok_or_else(|| LedgerError::NotFound {
                collection: Collection::Sellers,
                id: seller_id.to_string(),
            })
    }

    // --- Sellers ---

    fn validate_draft(draft: &SellerDraft) -> LedgerResult<Vec<Item>> {
        if draft.name.trim().is_empty() {
            return Err(LedgerError::validation("seller name must not be empty"));
        }
        let items = draft.catalog();
        if items.is_empty() {
            return Err(LedgerError::validation("seller needs at least one item"));
        }
        Ok(items)
    }

    async fn write_new_seller(
        &self,
        draft: &SellerDraft,
        items: &[Item],
    ) -> LedgerResult<String> {
        let now = Utc::now();
        let fields = SellerFields {
            name: draft.name.trim(),
            contact: draft.contact.trim(),
            items,
            created_at: Some(now),
            updated_at: now,
        };
        let id = self
            .store
            .create(Collection::Sellers, to_payload(&fields)?)
            .await?;
        Ok(id)
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_seller(&self, draft: &SellerDraft) -> LedgerResult<String> {
        let items = Self::validate_draft(draft)?;
        let id = self.write_new_seller(draft, &items).await?;
        info!("Created seller {} with {} item(s)", id, items.len());
        Ok(id)
    }

    /// Rewrites a seller's name, contact and catalog.
    ///
    /// Item ids sent with the draft are preserved. When the store no longer
    /// has the document the seller is created afresh and the new id returned.
    #[instrument(skip(self, draft))]
    pub async fn update_seller(&self, seller_id: &str, draft: &SellerDraft) -> LedgerResult<String> {
        let items = Self::validate_draft(draft)?;
        let fields = SellerFields {
            name: draft.name.trim(),
            contact: draft.contact.trim(),
            items: &items,
            created_at: None,
            updated_at: Utc::now(),
        };

        match self
            .store
            .update(Collection::Sellers, seller_id, to_payload(&fields)?)
            .await
        {
            Ok(()) => {
                info!("Updated seller {}", seller_id);
                Ok(seller_id.to_string())
            }
            Err(StoreError::NotFound { .. }) => {
                warn!("Seller {} is missing, creating it instead", seller_id);
                self.write_new_seller(draft, &items).await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a seller and every purchase made from it.
    ///
    /// Purchases go first, one call each, then the seller. A failed step does
    /// not stop the sequence and nothing already deleted is restored. An
    /// unknown seller fails with [`LedgerError::NotFound`] before anything is
    /// deleted.
    #[instrument(skip(self))]
    pub async fn delete_seller(&mut self, seller_id: &str) -> LedgerResult<CascadeReport> {
        self.seller(seller_id).await?;
        let purchases = self.list_purchases().await?;
        let mut report = CascadeReport::default();

        for purchase in purchases.iter().filter(|p| p.seller_id == seller_id) {
            match self.store.delete(Collection::Purchases, &purchase.id).await {
                Ok(()) => report.purchases.record_success(purchase.id.as_str()),
                Err(e) => {
                    error!("Failed to delete purchase {}: {}", purchase.id, e);
                    report.purchases.record_failure(purchase.id.as_str(), e);
                }
            }
        }

        match self.store.delete(Collection::Sellers, seller_id).await {
            Ok(()) => report.seller_deleted = true,
            Err(e) => {
                error!("Failed to delete seller {}: {}", seller_id, e);
                report.seller_error = Some(e.to_string());
            }
        }

        if self.selected_seller.as_deref() == Some(seller_id) {
            self.selected_seller = None;
            self.cart.reset();
        }

        info!(
            "Deleted seller {}: {} purchase(s) removed, {} failed",
            seller_id,
            report.purchases.succeeded.len(),
            report.purchases.failed.len()
        );
        Ok(report)
    }

    // --- Cart ---

    /// Makes `seller_id` the active seller.
    ///
    /// The cart empties when the seller changes unless `keep_cart` is set.
    pub async fn select_seller(&mut self, seller_id: &str, keep_cart: bool) -> LedgerResult<Seller> {
        let seller = self.seller(seller_id).await?;
        self.cart.switch_seller(&seller.id, keep_cart);
        self.selected_seller = Some(seller.id.clone());
        Ok(seller)
    }

    fn require_selection(&self) -> LedgerResult<&str> {
        self.selected_seller
            .as_deref()
            .ok_or_else(|| LedgerError::validation("select a seller first"))
    }

    pub fn change_qty(&mut self, item_id: &str, delta: i64) -> LedgerResult<u64> {
        self.require_selection()?;
        Ok(self.cart.change_qty(item_id, delta))
    }

    pub fn set_qty(&mut self, item_id: &str, raw: &str) -> LedgerResult<u64> {
        self.require_selection()?;
        Ok(self.cart.set_qty(item_id, raw))
    }

    /// Re-reads the selected seller, clearing the selection when it is gone.
    async fn fresh_selected_seller(&mut self) -> LedgerResult<Seller> {
        let seller_id = self.require_selection()?.to_string();
        match self.seller(&seller_id).await {
            Ok(seller) => Ok(seller),
            Err(e @ LedgerError::NotFound { .. }) => {
                warn!("Selected seller {} disappeared, clearing cart", seller_id);
                self.selected_seller = None;
                self.cart.reset();
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn cart_view(&mut self) -> LedgerResult<CartView> {
        if self.selected_seller.is_none() {
            return Ok(CartView {
                seller_id: None,
                lines: Vec::new(),
                total: 0,
            });
        }
        let seller = self.fresh_selected_seller().await?;
        Ok(CartView {
            seller_id: Some(seller.id.clone()),
            lines: self.cart.to_purchase_lines(&seller.items),
            total: self.cart.compute_total(&seller.items)?,
        })
    }

    /// Saves the cart as a purchase dated `date`.
    ///
    /// An empty cart, or one whose total overflows, is rejected before the
    /// store is touched. The cart is only cleared once the purchase has been
    /// written.
    #[instrument(skip(self))]
    pub async fn save_purchase(&mut self, date: NaiveDate) -> LedgerResult<String> {
        self.require_selection()?;
        if self.cart.is_empty() {
            return Err(LedgerError::validation("nothing to save"));
        }

        let seller = self.fresh_selected_seller().await?;
        let items = self.cart.to_purchase_lines(&seller.items);
        if items.is_empty() {
            return Err(LedgerError::validation("nothing to save"));
        }

        let purchase = Purchase {
            id: String::new(),
            seller_id: seller.id.clone(),
            seller_name: seller.name.clone(),
            date,
            items,
            billed: false,
            created_at: Some(Utc::now()),
            billed_at: None,
        };
        let total = purchase.total()?;

        let id = self
            .store
            .create(Collection::Purchases, to_payload(&purchase)?)
            .await?;
        self.cart.clear();

        info!(
            "Saved purchase {} from {} on {} totalling {}",
            id, seller.name, date, total
        );
        Ok(id)
    }

    // --- Billing ---

    /// Builds the bill for `[from, to]` and remembers what it covers.
    ///
    /// Any earlier uncommitted bill is forgotten.
    #[instrument(skip(self))]
    pub async fn generate_bill(&mut self, from: NaiveDate, to: NaiveDate) -> LedgerResult<Bill> {
        let purchases = self.list_purchases().await?;
        let bill = billing::aggregate(&purchases, from, to)?;

        if let Some(previous) = self.last_bill.replace(bill.purchase_ids.clone()) {
            warn!(
                "Discarding uncommitted bill covering {} purchase(s)",
                previous.len()
            );
        }
        Ok(bill)
    }

    /// Builds the bill for `[from, to]` without touching the pending slot.
    pub async fn preview_bill(&self, from: NaiveDate, to: NaiveDate) -> LedgerResult<Bill> {
        let purchases = self.list_purchases().await?;
        billing::aggregate(&purchases, from, to)
    }

    /// Marks the purchases of the last generated bill as billed.
    ///
    /// The pending bill is consumed whatever the outcome; the report says
    /// which purchases were updated.
    pub async fn commit_bill(&mut self) -> LedgerResult<BatchReport> {
        let ids = self.last_bill.take().ok_or(LedgerError::NoPendingBill)?;
        Ok(billing::mark_as_billed(self.store.as_ref(), &ids, Utc::now()).await)
    }

    // --- Reports ---

    pub async fn summary(&self, today: NaiveDate) -> LedgerResult<Summary> {
        rollup::summary(&self.list_purchases().await?, today)
    }

    pub async fn weekly(&self, n: usize) -> LedgerResult<Vec<PeriodTotal>> {
        let purchases = self.list_purchases().await?;
        Ok(rollup::most_recent(&rollup::bucket_by_week(&purchases)?, n))
    }

    pub async fn monthly(&self, n: usize) -> LedgerResult<Vec<PeriodTotal>> {
        let purchases = self.list_purchases().await?;
        Ok(rollup::most_recent(&rollup::bucket_by_month(&purchases)?, n))
    }

    pub async fn top_sellers(&self, n: usize) -> LedgerResult<Vec<SellerTotal>> {
        rollup::top_sellers(&self.list_purchases().await?, n)
    }

    pub async fn unbilled_by_seller(&self) -> LedgerResult<Vec<SellerTotal>> {
        rollup::unbilled_by_seller(&self.list_purchases().await?)
    }
}
