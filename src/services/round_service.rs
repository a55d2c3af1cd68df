use crate::config::LotteryConfig;
use crate::entities::{round_entity as rounds, ticket_entity as tickets};
use crate::error::{AppError, AppResult};
use crate::models::{
    ActiveRoundView, LockStateResponse, PaginatedResponse, PaginationParams, RoundListQuery,
    RoundPage, RoundResponse, TicketResponse,
};
use crate::services::{LotteryEvent, RoundEvents};
use crate::utils::weekly_round_name;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};

const ROUND_NAME_MAX: usize = 100;
const TICKET_INSERT_BATCH: i32 = 100;

/// Row lock taken on the active round row inside a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundLock {
    None,
    /// FOR SHARE: claims, so round start and draws wait for them
    Shared,
    /// FOR UPDATE: round start, lock toggle and draws
    Exclusive,
}

/// Resolve "the active round" by query, never from cached process state
pub async fn load_active_round<C>(conn: &C, lock: RoundLock) -> Result<Option<rounds::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let query = rounds::Entity::find().filter(rounds::Column::IsActive.eq(true));
    let query = match lock {
        RoundLock::None => query,
        RoundLock::Shared => query.lock_shared(),
        RoundLock::Exclusive => query.lock_exclusive(),
    };
    query.one(conn).await
}

/// Trimmed round name, or the ISO-week name when blank
pub fn normalize_round_name(name: Option<&str>, today: NaiveDate) -> AppResult<String> {
    let name = name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Ok(weekly_round_name(today));
    }
    if name.chars().count() > ROUND_NAME_MAX {
        return Err(AppError::ValidationError(format!(
            "Round name must be at most {ROUND_NAME_MAX} characters"
        )));
    }
    Ok(name.to_string())
}

/// Map a failed round insert; a hit on the single-active index means another
/// start committed a new active round first
pub fn round_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            log::warn!("Round start lost to a concurrent start: {detail}");
            AppError::RoundConflict
        }
        _ => AppError::DatabaseError(err),
    }
}

#[derive(Clone)]
pub struct RoundService {
    pool: DatabaseConnection,
    lottery: LotteryConfig,
    events: RoundEvents,
}

impl RoundService {
    pub fn new(pool: DatabaseConnection, lottery: LotteryConfig, events: RoundEvents) -> Self {
        Self {
            pool,
            lottery,
            events,
        }
    }

    /// Start a new round
    ///
    /// One transaction:
    /// 1. lock and deactivate the current active round (if any)
    /// 2. insert the new round, active and unlocked
    /// 3. insert its tickets numbered 1..=pool_size
    ///
    /// Claims and draws against the old round hold locks on its row, so they
    /// either finish before the switch or observe no active round afterwards.
    ///
    /// Two starts racing each other both pass step 1 (the loser's locked read
    /// sees no active row once the winner commits); the loser's insert then
    /// hits the single-active index and fails with `RoundConflict`.
    pub async fn start_new_round(&self, name: Option<&str>) -> AppResult<RoundResponse> {
        let name = normalize_round_name(name, Utc::now().date_naive())?;
        let pool_size = self.lottery.pool_size;

        let txn = self.pool.begin().await?;

        let previous = load_active_round(&txn, RoundLock::Exclusive).await?;
        if let Some(previous) = &previous {
            rounds::Entity::update_many()
                .col_expr(rounds::Column::IsActive, Expr::value(false))
                .filter(rounds::Column::IsActive.eq(true))
                .exec(&txn)
                .await?;
            log::info!("Archived round {} ({})", previous.id, previous.name);
        }

        let round = rounds::ActiveModel {
            name: Set(name),
            pool_size: Set(pool_size),
            is_active: Set(true),
            is_locked: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(round_insert_error)?;

        let mut start = 1;
        while start <= pool_size {
            let end = (start + TICKET_INSERT_BATCH - 1).min(pool_size);
            let batch = (start..=end).map(|number| tickets::ActiveModel {
                round_id: Set(round.id),
                number: Set(number),
                owner_name: Set(None),
                is_taken: Set(false),
                has_won: Set(false),
                claimed_at: Set(None),
                won_at: Set(None),
                ..Default::default()
            });
            tickets::Entity::insert_many(batch)
                .exec_without_returning(&txn)
                .await?;
            start = end + 1;
        }

        txn.commit().await?;

        log::info!(
            "Started round {} ({}) with {} tickets",
            round.id,
            round.name,
            pool_size
        );
        self.events
            .publish(LotteryEvent::RoundStarted { round_id: round.id });

        Ok(round.into())
    }

    /// Flip is_locked on the active round
    pub async fn toggle_lock(&self) -> AppResult<LockStateResponse> {
        let txn = self.pool.begin().await?;

        let round = load_active_round(&txn, RoundLock::Exclusive)
            .await?
            .ok_or(AppError::NoActiveRound)?;

        let is_locked = !round.is_locked;
        let mut am = round.into_active_model();
        am.is_locked = Set(is_locked);
        let updated = am.update(&txn).await?;

        txn.commit().await?;

        log::info!(
            "Round {} is now {}",
            updated.id,
            if is_locked { "locked" } else { "open" }
        );
        self.events.publish(LotteryEvent::LockToggled {
            round_id: updated.id,
            is_locked,
        });

        Ok(LockStateResponse {
            round_id: updated.id,
            is_locked,
        })
    }

    /// Active round with its tickets ordered by number
    pub async fn get_active_round_view(&self) -> AppResult<ActiveRoundView> {
        let Some(round) = load_active_round(&self.pool, RoundLock::None).await? else {
            return Ok(ActiveRoundView::empty());
        };

        let ticket_list = tickets::Entity::find()
            .filter(tickets::Column::RoundId.eq(round.id))
            .order_by_asc(tickets::Column::Number)
            .all(&self.pool)
            .await?;

        let taken_count = ticket_list.iter().filter(|t| t.is_taken).count() as i64;

        Ok(ActiveRoundView {
            round: Some(round.into()),
            tickets: ticket_list.into_iter().map(TicketResponse::from).collect(),
            taken_count,
        })
    }

    /// Round history, newest first
    pub async fn list_rounds(&self, query: &RoundListQuery) -> AppResult<RoundPage> {
        let params = PaginationParams::new(query.page, query.per_page);

        let total = rounds::Entity::find().count(&self.pool).await?;

        let items = rounds::Entity::find()
            .order_by_desc(rounds::Column::CreatedAt)
            .order_by_desc(rounds::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(RoundResponse::from).collect(),
            &params,
            total,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn other_insert_failures_stay_database_errors() {
        let err = round_insert_error(DbErr::Custom("connection reset".into()));
        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[test]
    fn blank_name_falls_back_to_week() {
        assert_eq!(normalize_round_name(None, today()).unwrap(), "Week 43, 2026");
        assert_eq!(
            normalize_round_name(Some("   "), today()).unwrap(),
            "Week 43, 2026"
        );
    }

    #[test]
    fn explicit_name_is_trimmed() {
        assert_eq!(
            normalize_round_name(Some("  Round 2 "), today()).unwrap(),
            "Round 2"
        );
    }

    #[test]
    fn overlong_name_is_rejected() {
        let name = "x".repeat(ROUND_NAME_MAX + 1);
        assert!(matches!(
            normalize_round_name(Some(&name), today()),
            Err(AppError::ValidationError(_))
        ));
    }
}
