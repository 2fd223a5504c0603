// Web layer: HTTP API for the peer protocol plus ambient health endpoints.
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{AppState, WebServer};
