use serde::{Deserialize, Serialize};

use crate::core::{Block, Transaction};

/// Generic response envelope, same shape the teacher wraps every handler's
/// payload in. Used here only by the ambient health/liveness/readiness
/// endpoints; the spec-mandated endpoints return their literal body shapes.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// `GET /` (and `/chain`) response (spec §6). Also the shape peers serve their
/// chain in, so this derives `Deserialize` too: `gateway::fetch_chains` parses
/// a neighbor's response straight into this struct rather than a bare array.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
}

/// `GET /transactions` response (spec §6).
#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
    pub length: usize,
}

/// `GET /amount` response (spec §6).
#[derive(Debug, Serialize)]
pub struct AmountResponse {
    pub amount: f32,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub blockchain_height: usize,
    pub connected_peers: usize,
}
