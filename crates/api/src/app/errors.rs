use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use ledgerd_engine::LedgerError;

/// Deterministic error-to-status translation; the engine stays
/// transport-agnostic and this function owns the mapping.
pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    let status = match &err {
        LedgerError::AccountNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::InvalidTransactionType
        | LedgerError::InvalidTransactionValue
        | LedgerError::InvalidTransactionDescription
        | LedgerError::InsufficientFunds => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("storage failure surfaced to client: {err}");
    }

    json_error(status, err.code(), err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
