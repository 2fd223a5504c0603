pub mod errors;
pub mod requests;
pub mod responses;

pub use errors::ErrorResponse;
pub use requests::AmountQuery;
pub use responses::{AmountResponse, ApiResponse, ChainResponse, TransactionsResponse};
