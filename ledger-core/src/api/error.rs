use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use std::borrow::Cow;
use tracing::error;

use crate::error::{LedgerError, LedgerResult};

/// A failed request tagged with the action the user attempted.
#[derive(Debug)]
pub struct ApiError {
    pub action: Cow<'static, str>,
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Request input that could not be read, as reported by an extractor.
    pub fn rejected(action: impl Into<Cow<'static, str>>, status: StatusCode, message: String) -> Self {
        Self {
            action: action.into(),
            status,
            message,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

fn ledger_status(e: &LedgerError) -> StatusCode {
    match e {
        LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
        LedgerError::Validation(_) | LedgerError::NothingToBill { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LedgerError::NoPendingBill => StatusCode::CONFLICT,
        LedgerError::Store(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = format!("Failed to {}: {}", self.action, self.message);
        error!("{}", message);
        (self.status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Attaches the attempted action to a ledger result.
pub trait During<T> {
    fn during(self, action: &'static str) -> Result<T, ApiError>;
}

impl<T> During<T> for LedgerResult<T> {
    fn during(self, action: &'static str) -> Result<T, ApiError> {
        self.map_err(|source| ApiError {
            action: Cow::Borrowed(action),
            status: ledger_status(&source),
            message: source.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_errors_keep_their_status() {
        let err = LedgerResult::<()>::Err(LedgerError::NoPendingBill)
            .during("mark purchases as billed")
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.action, "mark purchases as billed");

        let err = LedgerResult::<()>::Err(LedgerError::amount_too_large())
            .during("save purchase")
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message, "amount too large");
    }
}
