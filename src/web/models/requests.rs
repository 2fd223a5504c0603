use serde::Deserialize;
use validator::Validate;

/// `GET /amount?blockchain_address=A` query parameters (spec §6).
#[derive(Debug, Deserialize, Validate)]
pub struct AmountQuery {
    #[validate(length(min = 26, max = 35, message = "invalid blockchain address format"))]
    pub blockchain_address: String,
}
