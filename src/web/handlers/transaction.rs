use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use crate::core::SignedTransactionRequest;
use crate::node::coordinator::Origin;
use crate::web::models::TransactionsResponse;
use crate::web::server::AppState;

/// `GET /transactions` (spec §6): literal `{"transactions": [...], "length": N}`.
pub async fn list_transactions(
    State(state): State<AppState>,
) -> Result<Json<TransactionsResponse>, StatusCode> {
    let transactions = state
        .list_transactions()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let length = transactions.len();
    Ok(Json(TransactionsResponse { transactions, length }))
}

/// `POST /transactions` (spec §6): client-originated submit. Re-broadcast to
/// peers on success. 201 on accept, 400 on reject.
pub async fn submit_transaction(
    State(state): State<AppState>,
    Json(request): Json<SignedTransactionRequest>,
) -> StatusCode {
    submit(&state, request, Origin::Local, StatusCode::CREATED).await
}

/// `PUT /transactions` (spec §6): peer-relayed submit, no further broadcast.
/// 200 on accept, 400 on reject.
pub async fn relay_transaction(
    State(state): State<AppState>,
    Json(request): Json<SignedTransactionRequest>,
) -> StatusCode {
    submit(&state, request, Origin::Peer, StatusCode::OK).await
}

async fn submit(
    state: &AppState,
    request: SignedTransactionRequest,
    origin: Origin,
    accepted_status: StatusCode,
) -> StatusCode {
    match state.submit_transaction(request, origin).await {
        Ok(true) => accepted_status,
        Ok(false) => StatusCode::BAD_REQUEST,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
