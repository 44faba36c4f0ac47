use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use iml_ledger::LedgerError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("anchor error: {0}")]
    Anchor(#[from] iml_anchor::AnchorError),

    #[error("journal error: {0}")]
    Journal(#[from] iml_chain::JournalError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// HTTP status for this error.
    ///
    /// Caller errors map to 4xx so they are visibly the caller's to fix;
    /// an unreachable store is 503 because retrying the same movement is
    /// the documented recovery. Anchor failures never reach here, they
    /// ride inside a 200 response with a warning.
    fn status(&self) -> StatusCode {
        match self {
            ServerError::Ledger(err) => match err {
                LedgerError::InvalidAmount | LedgerError::QuantityOverflow(_) => {
                    StatusCode::BAD_REQUEST
                }
                LedgerError::ProductNotFound(_) => StatusCode::NOT_FOUND,
                LedgerError::InsufficientStock { .. } => StatusCode::CONFLICT,
                LedgerError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                LedgerError::Chain(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
