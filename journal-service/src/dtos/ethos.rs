use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertEthosRequest {
    #[validate(length(min = 1, max = 4096, message = "Statement must be 1-4096 characters"))]
    pub statement: String,
}
