use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::api::error::{ApiError, During};
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::AppState;
use crate::batch::BatchReport;
use crate::billing::Bill;
use crate::models::{Purchase, Seller, SellerDraft};
use crate::rollup::{PeriodTotal, SellerTotal, Summary};
use crate::session::{CartView, CascadeReport};

const DEFAULT_REPORT_LIMIT: usize = 6;

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectSeller {
    pub seller_id: String,
    #[serde(default)]
    pub keep_cart: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeQty {
    pub item_id: String,
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetQty {
    pub item_id: String,
    /// Raw input as typed by the user
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QtyChanged {
    pub item_id: String,
    pub qty: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SavePurchase {
    /// Defaults to today's date
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct Limit {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct Today {
    pub today: Option<NaiveDate>,
}

/// Health check endpoint.
pub async fn health_check() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "ledger-core",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Store health check endpoint.
pub async fn store_health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let store = state.session.lock().await.store().clone();
    store.ping().await.map_err(|e| {
        error!("Store health check failed: {}", e);
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "store": "connected"
    })))
}

// --- Sellers ---

pub async fn list_sellers(State(state): State<AppState>) -> Result<Json<Vec<Seller>>, ApiError> {
    let session = state.session.lock().await;
    Ok(Json(session.list_sellers().await.during("load sellers")?))
}

pub async fn get_seller(
    State(state): State<AppState>,
    Path(seller_id): Path<String>,
) -> Result<Json<Seller>, ApiError> {
    let session = state.session.lock().await;
    Ok(Json(session.seller(&seller_id).await.during("load seller")?))
}

pub async fn create_seller(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<SellerDraft>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let session = state.session.lock().await;
    let id = session.create_seller(&draft).await.during("save seller")?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn update_seller(
    State(state): State<AppState>,
    Path(seller_id): Path<String>,
    ApiJson(draft): ApiJson<SellerDraft>,
) -> Result<Json<Created>, ApiError> {
    let session = state.session.lock().await;
    let id = session
        .update_seller(&seller_id, &draft)
        .await
        .during("update seller")?;
    Ok(Json(Created { id }))
}

pub async fn delete_seller(
    State(state): State<AppState>,
    Path(seller_id): Path<String>,
) -> Result<Json<CascadeReport>, ApiError> {
    let mut session = state.session.lock().await;
    let report = session
        .delete_seller(&seller_id)
        .await
        .during("delete seller")?;
    Ok(Json(report))
}

// --- Cart ---

pub async fn select_seller(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SelectSeller>,
) -> Result<Json<Seller>, ApiError> {
    let mut session = state.session.lock().await;
    let seller = session
        .select_seller(&request.seller_id, request.keep_cart)
        .await
        .during("select seller")?;
    Ok(Json(seller))
}

pub async fn change_qty(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChangeQty>,
) -> Result<Json<QtyChanged>, ApiError> {
    let mut session = state.session.lock().await;
    let qty = session
        .change_qty(&request.item_id, request.delta)
        .during("change quantity")?;
    Ok(Json(QtyChanged {
        item_id: request.item_id,
        qty,
    }))
}

pub async fn set_qty(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SetQty>,
) -> Result<Json<QtyChanged>, ApiError> {
    let mut session = state.session.lock().await;
    let qty = session
        .set_qty(&request.item_id, &request.value)
        .during("set quantity")?;
    Ok(Json(QtyChanged {
        item_id: request.item_id,
        qty,
    }))
}

pub async fn get_cart(State(state): State<AppState>) -> Result<Json<CartView>, ApiError> {
    let mut session = state.session.lock().await;
    Ok(Json(session.cart_view().await.during("load cart")?))
}

// --- Purchases ---

pub async fn list_purchases(State(state): State<AppState>) -> Result<Json<Vec<Purchase>>, ApiError> {
    let session = state.session.lock().await;
    Ok(Json(session.list_purchases().await.during("load purchases")?))
}

pub async fn save_purchase(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SavePurchase>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let date = request.date.unwrap_or_else(|| Utc::now().date_naive());
    let mut session = state.session.lock().await;
    let id = session.save_purchase(date).await.during("save purchase")?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

// --- Bills ---

pub async fn generate_bill(
    State(state): State<AppState>,
    ApiJson(range): ApiJson<DateRange>,
) -> Result<Json<Bill>, ApiError> {
    let mut session = state.session.lock().await;
    let bill = session
        .generate_bill(range.from, range.to)
        .await
        .during("generate bill")?;
    info!(
        "Bill ready: {} purchase(s), total {}",
        bill.purchase_ids.len(),
        bill.grand_total
    );
    Ok(Json(bill))
}

pub async fn commit_bill(State(state): State<AppState>) -> Result<Json<BatchReport>, ApiError> {
    let mut session = state.session.lock().await;
    Ok(Json(session.commit_bill().await.during("mark purchases as billed")?))
}

pub async fn print_bill(
    State(state): State<AppState>,
    ApiQuery(range): ApiQuery<DateRange>,
) -> Result<String, ApiError> {
    let session = state.session.lock().await;
    let bill = session
        .preview_bill(range.from, range.to)
        .await
        .during("print bill")?;
    Ok(bill.render_text())
}

// --- Reports ---

pub async fn summary(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Today>,
) -> Result<Json<Summary>, ApiError> {
    let today = query.today.unwrap_or_else(|| Utc::now().date_naive());
    let session = state.session.lock().await;
    Ok(Json(session.summary(today).await.during("load summary")?))
}

pub async fn weeks(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Limit>,
) -> Result<Json<Vec<PeriodTotal>>, ApiError> {
    let session = state.session.lock().await;
    let limit = query.limit.unwrap_or(DEFAULT_REPORT_LIMIT);
    Ok(Json(session.weekly(limit).await.during("load weekly totals")?))
}

pub async fn months(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Limit>,
) -> Result<Json<Vec<PeriodTotal>>, ApiError> {
    let session = state.session.lock().await;
    let limit = query.limit.unwrap_or(DEFAULT_REPORT_LIMIT);
    Ok(Json(session.monthly(limit).await.during("load monthly totals")?))
}

pub async fn top_sellers(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<Limit>,
) -> Result<Json<Vec<SellerTotal>>, ApiError> {
    let session = state.session.lock().await;
    let limit = query.limit.unwrap_or(DEFAULT_REPORT_LIMIT);
    Ok(Json(session.top_sellers(limit).await.during("load top sellers")?))
}

pub async fn unbilled(State(state): State<AppState>) -> Result<Json<Vec<SellerTotal>>, ApiError> {
    let session = state.session.lock().await;
    Ok(Json(
        session
            .unbilled_by_seller()
            .await
            .during("load unbilled totals")?,
    ))
}
