use crate::entities::ticket_entity as tickets;
use crate::error::{AppError, AppResult};
use crate::models::DrawResponse;
use crate::services::eligibility::{self, Candidate};
use crate::services::round_service::{RoundLock, load_active_round};
use crate::services::{LotteryEvent, RoundEvents};
use chrono::Utc;
use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

/// Uniform pick over the current candidate list
pub fn pick_winner<'a, R: Rng + ?Sized>(
    candidates: &[Candidate<'a>],
    rng: &mut R,
) -> Option<Candidate<'a>> {
    if candidates.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..candidates.len());
    Some(candidates[index])
}

/// The winner update must flip exactly the picked ticket
fn ensure_winner_recorded(rows_affected: u64, round_id: i32, number: i32) -> AppResult<()> {
    if rows_affected == 1 {
        return Ok(());
    }
    log::error!("Winner update in round {round_id} touched {rows_affected} rows for ticket {number}");
    Err(AppError::InternalError(format!(
        "Ticket {number} changed while drawing round {round_id}"
    )))
}

#[derive(Clone)]
pub struct DrawService {
    pool: DatabaseConnection,
    events: RoundEvents,
}

impl DrawService {
    pub fn new(pool: DatabaseConnection, events: RoundEvents) -> Self {
        Self { pool, events }
    }

    /// Draw one winner from the active round
    ///
    /// The active round row is locked FOR UPDATE for the whole
    /// read-filter-select-write sequence, so concurrent draws run one after
    /// the other and each sees the previous winner when excluding owners.
    /// A failed draw is final for this call; nothing is retried.
    pub async fn draw_winner(&self) -> AppResult<DrawResponse> {
        let txn = self.pool.begin().await?;

        let round = load_active_round(&txn, RoundLock::Exclusive)
            .await?
            .ok_or(AppError::NoActiveRound)?;

        let taken = tickets::Entity::find()
            .filter(tickets::Column::RoundId.eq(round.id))
            .filter(tickets::Column::IsTaken.eq(true))
            .order_by_asc(tickets::Column::Number)
            .all(&txn)
            .await?;

        let candidates = eligibility::eligible_candidates(&taken).map_err(|reason| {
            log::warn!("Draw in round {} found no candidates: {reason}", round.id);
            AppError::NoCandidates(reason)
        })?;

        // ThreadRng is not Send; keep it out of scope across awaits
        let winner = {
            let mut rng = rand::thread_rng();
            pick_winner(&candidates, &mut rng)
        }
        .ok_or_else(|| AppError::InternalError("Empty candidate list".into()))?;

        let winning_id = winner.ticket.id;
        let number = winner.ticket.number;
        let owner_name = winner.owner.to_string();

        let result = tickets::Entity::update_many()
            .col_expr(tickets::Column::HasWon, Expr::value(true))
            .col_expr(tickets::Column::WonAt, Expr::value(Utc::now()))
            .filter(tickets::Column::Id.eq(winning_id))
            .filter(tickets::Column::IsTaken.eq(true))
            .filter(tickets::Column::HasWon.eq(false))
            .exec(&txn)
            .await?;

        ensure_winner_recorded(result.rows_affected, round.id, number)?;

        txn.commit().await?;

        log::info!(
            "Round {} winner: ticket {} owned by {} ({} candidates)",
            round.id,
            number,
            owner_name,
            candidates.len()
        );
        self.events.publish(LotteryEvent::WinnerDrawn {
            round_id: round.id,
            number,
        });

        Ok(DrawResponse {
            round_id: round.id,
            number,
            owner_name,
        })
    }
}
