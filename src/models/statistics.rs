use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{RoundResponse, TicketResponse};

/// Hall of fame row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub owner_name: String,
    pub win_count: i64,
}

/// How often a ticket number has won across all rounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NumberFrequencyEntry {
    pub number: i32,
    pub win_count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecentWinner {
    pub round_id: i32,
    pub round_name: String,
    pub number: i32,
    pub owner_name: String,
    pub won_at: Option<DateTime<Utc>>,
}

/// Operator view of the active round
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminSnapshot {
    pub active_round: Option<RoundResponse>,
    /// Taken tickets whose owner has not won yet this round
    pub eligible_pot: Vec<TicketResponse>,
    pub total_taken: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminStats {
    pub hall_of_fame: Vec<LeaderboardEntry>,
    pub winning_numbers: Vec<NumberFrequencyEntry>,
    pub recent_winners: Vec<RecentWinner>,
}
