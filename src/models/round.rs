use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{round_entity, ticket_entity};

/// Round summary
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoundResponse {
    pub id: i32,
    #[schema(example = "Week 42, 2026")]
    pub name: String,
    /// Tickets in the round, numbered 1..=pool_size
    pub pool_size: i32,
    pub is_active: bool,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<round_entity::Model> for RoundResponse {
    fn from(m: round_entity::Model) -> Self {
        RoundResponse {
            id: m.id,
            name: m.name,
            pool_size: m.pool_size,
            is_active: m.is_active,
            is_locked: m.is_locked,
            created_at: m.created_at,
        }
    }
}

/// Public view of a single ticket
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TicketResponse {
    pub number: i32,
    pub owner_name: Option<String>,
    pub is_taken: bool,
    pub has_won: bool,
}

impl From<ticket_entity::Model> for TicketResponse {
    fn from(m: ticket_entity::Model) -> Self {
        TicketResponse {
            number: m.number,
            owner_name: m.owner_name,
            is_taken: m.is_taken,
            has_won: m.has_won,
        }
    }
}

/// Active round with its full ticket grid (ordered by number)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActiveRoundView {
    /// None when no round is active
    pub round: Option<RoundResponse>,
    pub tickets: Vec<TicketResponse>,
    pub taken_count: i64,
}

impl ActiveRoundView {
    pub fn empty() -> Self {
        ActiveRoundView {
            round: None,
            tickets: Vec::new(),
            taken_count: 0,
        }
    }
}

/// Start a new round; an empty name falls back to the current ISO week
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct StartRoundRequest {
    #[schema(example = "Week 42, 2026")]
    pub name: Option<String>,
}

/// Lock state after a toggle
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LockStateResponse {
    pub round_id: i32,
    pub is_locked: bool,
}

/// Round history query
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RoundListQuery {
    /// Page (default 1)
    pub page: Option<u32>,
    /// Page size (default 20, max 100)
    pub per_page: Option<u32>,
}
