use axum::Router;
use axum::routing::{get, post};

use crate::web::handlers::{blockchain, health, transaction};
use crate::web::server::AppState;

/// The node's HTTP API (spec §6): chain, transactions, balance, block gossip.
///
/// `/chain` is an alias of `/` for the same handler: spec §6's interface
/// table serves the chain at `/`, but spec §4.4's gateway fetches peer
/// chains from `/chain` (matching `original_source/internal/gateway/http_gateway.go`'s
/// `GetChains`, which itself disagrees with that source's own route table in
/// `internal/servers/blockchain.go`). Both routes point at the same handler
/// rather than picking one side of that pre-existing inconsistency to break.
pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(blockchain::get_chain))
        .route("/chain", get(blockchain::get_chain))
        .route("/amount", get(blockchain::get_amount))
        .route("/block", post(blockchain::accept_block))
        .route(
            "/transactions",
            get(transaction::list_transactions)
                .post(transaction::submit_transaction)
                .put(transaction::relay_transaction),
        )
}

/// Ambient health/liveness/readiness endpoints, not part of the peer protocol.
pub fn create_monitor_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
}

pub fn create_all_routes() -> Router<AppState> {
    Router::new().merge(create_api_routes()).merge(create_monitor_routes())
}
