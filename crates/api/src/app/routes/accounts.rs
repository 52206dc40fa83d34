use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use ledgerd_core::AccountId;
use ledgerd_engine::TransactionRequest;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/:id/statement", get(get_statement))
        .route("/:id/transactions", post(create_transaction))
}

pub async fn get_statement(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match services.engine.get_statement(AccountId::new(id)).await {
        Ok(statement) => (StatusCode::OK, Json(statement)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn create_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
    Json(body): Json<dto::CreateTransactionRequest>,
) -> axum::response::Response {
    let request = TransactionRequest {
        kind: body.kind,
        value: body.value,
        description: body.description,
    };

    match services.engine.apply_transaction(AccountId::new(id), request).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "limit": outcome.limit,
                "balance": outcome.balance,
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
