use tower_http::cors::{Any, CorsLayer};

/// Permissive CORS: peer nodes and wallet tooling hit this API from
/// arbitrary origins, there's no session/cookie state to protect.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
}
