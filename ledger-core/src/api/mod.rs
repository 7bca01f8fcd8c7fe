//! HTTP surface over the ledger session.

pub mod error;
pub mod extract;
pub mod handlers;

#[cfg(test)]
mod tests;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::session::Session;

/// Application state containing shared resources.
///
/// There is exactly one session per process. The mutex makes every request
/// run its store calls one after another.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/health/store", get(handlers::store_health_check))
        .route(
            "/sellers",
            get(handlers::list_sellers).post(handlers::create_seller),
        )
        .route(
            "/sellers/:id",
            get(handlers::get_seller)
                .put(handlers::update_seller)
                .delete(handlers::delete_seller),
        )
        .route("/cart", get(handlers::get_cart))
        .route("/cart/select", post(handlers::select_seller))
        .route("/cart/change", post(handlers::change_qty))
        .route("/cart/set", post(handlers::set_qty))
        .route(
            "/purchases",
            get(handlers::list_purchases).post(handlers::save_purchase),
        )
        .route("/bills", post(handlers::generate_bill))
        .route("/bills/commit", post(handlers::commit_bill))
        .route("/bills/print", get(handlers::print_bill))
        .route("/reports/summary", get(handlers::summary))
        .route("/reports/weeks", get(handlers::weeks))
        .route("/reports/months", get(handlers::months))
        .route("/reports/top-sellers", get(handlers::top_sellers))
        .route("/reports/unbilled", get(handlers::unbilled))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
