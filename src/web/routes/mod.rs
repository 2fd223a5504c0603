pub mod api;

pub use api::{create_all_routes, create_api_routes, create_monitor_routes};
