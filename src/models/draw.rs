use serde::Serialize;
use utoipa::ToSchema;

/// Winning ticket of a draw
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawResponse {
    pub round_id: i32,
    pub number: i32,
    pub owner_name: String,
}
