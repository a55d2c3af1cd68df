use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claim one or more tickets for a named owner
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ClaimTicketsRequest {
    #[schema(example = json!([1, 2]))]
    pub numbers: Vec<i32>,
    #[schema(example = "Ola")]
    pub owner_name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClaimResponse {
    pub round_id: i32,
    /// Number of tickets claimed
    pub count: u64,
    /// Claimed numbers, ascending
    pub numbers: Vec<i32>,
    pub owner_name: String,
    pub message: String,
}
