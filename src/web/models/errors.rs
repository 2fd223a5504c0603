use serde::Serialize;

/// Error response body used by the global error-handling middleware.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
