use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use validator::Validate;

use crate::core::Block;
use crate::web::models::{AmountQuery, AmountResponse, ChainResponse};
use crate::web::server::AppState;

/// `GET /` (spec §6): the node's full chain, returned as the literal
/// `{"chain": [...]}` body spec §6 names — no response envelope.
pub async fn get_chain(State(state): State<AppState>) -> Result<Json<ChainResponse>, StatusCode> {
    let chain = state
        .get_chain()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(ChainResponse { chain }))
}

/// `GET /amount?blockchain_address=A` (spec §6): literal `{"amount": float}`.
pub async fn get_amount(
    State(state): State<AppState>,
    Query(query): Query<AmountQuery>,
) -> Result<Json<AmountResponse>, StatusCode> {
    if query.validate().is_err() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let amount = state
        .get_balance(&query.blockchain_address)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(AmountResponse { amount }))
}

/// `POST /block` (spec §6): peer block gossip. Always 200 — acceptance or
/// rejection is silent at the protocol level.
pub async fn accept_block(State(state): State<AppState>, Json(block): Json<Block>) -> StatusCode {
    let _ = state.accept_foreign_block(block);
    StatusCode::OK
}
