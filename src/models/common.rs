use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error envelope body: `{ "success": false, "error": ApiError }`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}
