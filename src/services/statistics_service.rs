use crate::config::LotteryConfig;
use crate::entities::{round_entity as rounds, ticket_entity as tickets};
use crate::error::AppResult;
use crate::models::{
    AdminSnapshot, AdminStats, LeaderboardEntry, NumberFrequencyEntry, RecentWinner,
    TicketResponse,
};
use crate::services::eligibility;
use crate::services::ranking::top_k;
use crate::services::round_service::{RoundLock, load_active_round};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// Read-only aggregations over all rounds (archived ones included)
#[derive(Clone)]
pub struct StatisticsService {
    pool: DatabaseConnection,
    lottery: LotteryConfig,
}

impl StatisticsService {
    pub fn new(pool: DatabaseConnection, lottery: LotteryConfig) -> Self {
        Self { pool, lottery }
    }

    async fn won_tickets(&self) -> AppResult<Vec<tickets::Model>> {
        let list = tickets::Entity::find()
            .filter(tickets::Column::HasWon.eq(true))
            .all(&self.pool)
            .await?;
        Ok(list)
    }

    /// Hall of fame: wins per owner, most first, ties by name
    pub async fn get_leaderboard(&self) -> AppResult<Vec<LeaderboardEntry>> {
        let won = self.won_tickets().await?;
        let ranked = top_k(
            won.into_iter().filter_map(|t| t.owner_name),
            self.lottery.leaderboard_size as usize,
        );
        Ok(ranked
            .into_iter()
            .map(|(owner_name, win_count)| LeaderboardEntry {
                owner_name,
                win_count,
            })
            .collect())
    }

    /// Wins per ticket number, most first, ties by number
    pub async fn get_number_frequency(&self) -> AppResult<Vec<NumberFrequencyEntry>> {
        let won = self.won_tickets().await?;
        let ranked = top_k(
            won.into_iter().map(|t| t.number),
            self.lottery.frequency_size as usize,
        );
        Ok(ranked
            .into_iter()
            .map(|(number, win_count)| NumberFrequencyEntry { number, win_count })
            .collect())
    }

    /// Latest wins across rounds, newest round first
    pub async fn get_recent_winners(&self) -> AppResult<Vec<RecentWinner>> {
        let rows = tickets::Entity::find()
            .find_also_related(rounds::Entity)
            .filter(tickets::Column::HasWon.eq(true))
            .order_by_desc(rounds::Column::CreatedAt)
            .order_by_desc(rounds::Column::Id)
            .order_by_desc(tickets::Column::WonAt)
            .order_by_desc(tickets::Column::Id)
            .limit(self.lottery.recent_winners_size)
            .all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(ticket, round)| {
                let round = round?;
                Some(RecentWinner {
                    round_id: round.id,
                    round_name: round.name,
                    number: ticket.number,
                    owner_name: ticket.owner_name?,
                    won_at: ticket.won_at,
                })
            })
            .collect())
    }

    /// Active round split into eligible pot and total taken
    pub async fn get_admin_snapshot(&self) -> AppResult<AdminSnapshot> {
        let Some(round) = load_active_round(&self.pool, RoundLock::None).await? else {
            return Ok(AdminSnapshot {
                active_round: None,
                eligible_pot: Vec::new(),
                total_taken: 0,
            });
        };

        let taken = tickets::Entity::find()
            .filter(tickets::Column::RoundId.eq(round.id))
            .filter(tickets::Column::IsTaken.eq(true))
            .order_by_asc(tickets::Column::Number)
            .all(&self.pool)
            .await?;

        let pot = eligibility::partition(&taken);
        let total_taken = pot.taken.len() as i64;
        let eligible_pot = pot
            .eligible
            .iter()
            .map(|c| TicketResponse::from(c.ticket.clone()))
            .collect();

        Ok(AdminSnapshot {
            active_round: Some(round.into()),
            eligible_pot,
            total_taken,
        })
    }

    pub async fn get_admin_stats(&self) -> AppResult<AdminStats> {
        Ok(AdminStats {
            hall_of_fame: self.get_leaderboard().await?,
            winning_numbers: self.get_number_frequency().await?,
            recent_winners: self.get_recent_winners().await?,
        })
    }
}
