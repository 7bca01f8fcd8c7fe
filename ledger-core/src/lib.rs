//! Purchase ledger: sellers, carts, dated purchases, bills and period rollups.

pub mod api;
pub mod batch;
pub mod billing;
pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod money;
pub mod rollup;
pub mod seed;
pub mod session;
pub mod store;

pub use error::{LedgerError, LedgerResult};
pub use session::Session;
