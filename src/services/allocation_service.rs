use std::collections::BTreeSet;

use crate::config::LotteryConfig;
use crate::entities::ticket_entity as tickets;
use crate::error::{AppError, AppResult};
use crate::models::ClaimResponse;
use crate::services::round_service::{RoundLock, load_active_round};
use crate::services::{LotteryEvent, RoundEvents};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    TransactionTrait,
};

/// Validated claim input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    /// Distinct ticket numbers, ascending
    pub numbers: Vec<i32>,
    pub owner_name: String,
}

impl ClaimRequest {
    /// Check shape only; range against the round is checked inside the transaction
    pub fn parse(numbers: &[i32], owner_name: &str, lottery: &LotteryConfig) -> AppResult<Self> {
        let owner_name = owner_name.trim();
        let len = owner_name.chars().count();
        if len < lottery.owner_name_min || len > lottery.owner_name_max {
            return Err(AppError::ValidationError(format!(
                "Name must be between {} and {} characters",
                lottery.owner_name_min, lottery.owner_name_max
            )));
        }
        if owner_name.chars().any(char::is_control) {
            return Err(AppError::ValidationError(
                "Name contains invalid characters".to_string(),
            ));
        }

        if numbers.is_empty() {
            return Err(AppError::ValidationError(
                "Select at least one ticket".to_string(),
            ));
        }
        let distinct: BTreeSet<i32> = numbers.iter().copied().collect();
        if let Some(bad) = distinct.iter().find(|n| **n < 1) {
            return Err(AppError::ValidationError(format!(
                "Ticket numbers must be positive, got {bad}"
            )));
        }

        Ok(Self {
            numbers: distinct.into_iter().collect(),
            owner_name: owner_name.to_string(),
        })
    }
}

/// Requested numbers that are not free among `rows`; a missing row counts as
/// unavailable
pub fn unavailable_numbers(requested: &[i32], rows: &[tickets::Model]) -> Vec<i32> {
    let free: BTreeSet<i32> = rows
        .iter()
        .filter(|t| !t.is_taken)
        .map(|t| t.number)
        .collect();
    requested
        .iter()
        .copied()
        .filter(|n| !free.contains(n))
        .collect()
}

/// Numbers to report after the conditional update came up short
///
/// `rows` is a fresh read taken after rolling back. If the competing claim
/// has itself been rolled back by then, nothing looks taken and the whole
/// request is reported.
pub fn contested_numbers(requested: &[i32], rows: &[tickets::Model]) -> Vec<i32> {
    let unavailable = unavailable_numbers(requested, rows);
    if unavailable.is_empty() {
        requested.to_vec()
    } else {
        unavailable
    }
}

fn claim_update_complete(rows_affected: u64, requested: usize) -> bool {
    rows_affected == requested as u64
}

fn requested_tickets(round_id: i32, numbers: &[i32]) -> Select<tickets::Entity> {
    tickets::Entity::find()
        .filter(tickets::Column::RoundId.eq(round_id))
        .filter(tickets::Column::Number.is_in(numbers.to_vec()))
        .order_by_asc(tickets::Column::Number)
}

fn claim_message(count: usize, owner_name: &str) -> String {
    if count == 1 {
        format!("1 ticket registered to {owner_name}!")
    } else {
        format!("{count} tickets registered to {owner_name}!")
    }
}

#[derive(Clone)]
pub struct AllocationService {
    pool: DatabaseConnection,
    lottery: LotteryConfig,
    events: RoundEvents,
}

impl AllocationService {
    pub fn new(pool: DatabaseConnection, lottery: LotteryConfig, events: RoundEvents) -> Self {
        Self {
            pool,
            lottery,
            events,
        }
    }

    /// Claim tickets for an owner, all or nothing
    ///
    /// 1. share-lock the active round row (a concurrent round start or lock
    ///    toggle waits, and an archived round is never claimed into)
    /// 2. reject a locked round and numbers outside 1..=pool_size
    /// 3. row-lock the requested tickets and verify every one is free
    /// 4. conditional update (is_taken = false) and compare the row count
    ///
    /// Any failure drops the transaction, so nothing is written.
    pub async fn claim_tickets(&self, numbers: &[i32], owner_name: &str) -> AppResult<ClaimResponse> {
        let request = ClaimRequest::parse(numbers, owner_name, &self.lottery)?;
        let requested = request.numbers.len();

        let txn = self.pool.begin().await?;

        let round = load_active_round(&txn, RoundLock::Shared)
            .await?
            .ok_or(AppError::NoActiveRound)?;

        if round.is_locked {
            return Err(AppError::RoundLocked);
        }

        let out_of_range: Vec<String> = request
            .numbers
            .iter()
            .filter(|n| !round.contains_number(**n))
            .map(|n| n.to_string())
            .collect();
        if !out_of_range.is_empty() {
            return Err(AppError::ValidationError(format!(
                "Ticket numbers must be between 1 and {}: {}",
                round.pool_size,
                out_of_range.join(", ")
            )));
        }

        let rows = requested_tickets(round.id, &request.numbers)
            .lock_exclusive()
            .all(&txn)
            .await?;

        let unavailable = unavailable_numbers(&request.numbers, &rows);
        if !unavailable.is_empty() {
            log::warn!(
                "Claim by {} rejected in round {}: {:?} unavailable",
                request.owner_name,
                round.id,
                unavailable
            );
            return Err(AppError::AlreadyTaken(unavailable));
        }

        let result = tickets::Entity::update_many()
            .col_expr(
                tickets::Column::OwnerName,
                Expr::value(request.owner_name.clone()),
            )
            .col_expr(tickets::Column::IsTaken, Expr::value(true))
            .col_expr(tickets::Column::ClaimedAt, Expr::value(Utc::now()))
            .filter(tickets::Column::RoundId.eq(round.id))
            .filter(tickets::Column::Number.is_in(request.numbers.clone()))
            .filter(tickets::Column::IsTaken.eq(false))
            .exec(&txn)
            .await?;

        if !claim_update_complete(result.rows_affected, requested) {
            log::warn!(
                "Claim in round {} updated {} of {} tickets, rolling back",
                round.id,
                result.rows_affected,
                requested
            );
            txn.rollback().await?;
            let now = requested_tickets(round.id, &request.numbers)
                .all(&self.pool)
                .await?;
            return Err(AppError::AlreadyTaken(contested_numbers(
                &request.numbers,
                &now,
            )));
        }

        txn.commit().await?;

        log::info!(
            "{} claimed {:?} in round {}",
            request.owner_name,
            request.numbers,
            round.id
        );
        self.events.publish(LotteryEvent::TicketsClaimed {
            round_id: round.id,
            numbers: request.numbers.clone(),
        });

        Ok(ClaimResponse {
            round_id: round.id,
            count: result.rows_affected,
            message: claim_message(requested, &request.owner_name),
            numbers: request.numbers,
            owner_name: request.owner_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn lottery() -> LotteryConfig {
        LotteryConfig::default()
    }

    #[test]
    fn numbers_are_deduplicated_and_sorted() {
        let request = ClaimRequest::parse(&[3, 1, 3, 2], "Ola", &lottery()).unwrap();
        assert_eq!(request.numbers, vec![1, 2, 3]);
    }

    #[test]
    fn owner_name_is_trimmed_before_length_check() {
        let request = ClaimRequest::parse(&[1], "  Ola  ", &lottery()).unwrap();
        assert_eq!(request.owner_name, "Ola");
        assert_matches!(
            ClaimRequest::parse(&[1], " O ", &lottery()),
            Err(AppError::ValidationError(_))
        );
    }

    #[test]
    fn name_length_bounds_are_inclusive() {
        assert!(ClaimRequest::parse(&[1], "Al", &lottery()).is_ok());
        assert!(ClaimRequest::parse(&[1], &"x".repeat(50), &lottery()).is_ok());
        assert_matches!(
            ClaimRequest::parse(&[1], &"x".repeat(51), &lottery()),
            Err(AppError::ValidationError(_))
        );
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        assert!(ClaimRequest::parse(&[1], "Øy", &lottery()).is_ok());
    }

    #[test]
    fn empty_and_non_positive_numbers_are_rejected() {
        assert_matches!(
            ClaimRequest::parse(&[], "Ola", &lottery()),
            Err(AppError::ValidationError(_))
        );
        assert_matches!(
            ClaimRequest::parse(&[0, 1], "Ola", &lottery()),
            Err(AppError::ValidationError(_))
        );
        assert_matches!(
            ClaimRequest::parse(&[-4], "Ola", &lottery()),
            Err(AppError::ValidationError(_))
        );
    }

    fn row(number: i32, owner: Option<&str>) -> tickets::Model {
        tickets::Model {
            id: number,
            round_id: 1,
            number,
            owner_name: owner.map(str::to_string),
            is_taken: owner.is_some(),
            has_won: false,
            claimed_at: None,
            won_at: None,
        }
    }

    #[test]
    fn unavailable_lists_taken_and_missing_numbers() {
        let rows = vec![row(1, None), row(2, Some("Ola")), row(3, None)];
        assert_eq!(unavailable_numbers(&[1, 2, 3], &rows), vec![2]);
        assert_eq!(unavailable_numbers(&[1, 4], &rows), vec![4]);
        assert!(unavailable_numbers(&[1, 3], &rows).is_empty());
    }

    #[test]
    fn short_update_is_detected() {
        assert!(claim_update_complete(3, 3));
        assert!(!claim_update_complete(2, 3));
        assert!(!claim_update_complete(0, 1));
    }

    #[test]
    fn short_update_reports_only_numbers_lost_to_the_other_claim() {
        let after = vec![row(2, None), row(3, Some("Kari")), row(4, None)];
        assert_eq!(contested_numbers(&[2, 3, 4], &after), vec![3]);
    }

    #[test]
    fn short_update_reports_whole_request_when_nothing_looks_taken() {
        let after = vec![row(2, None), row(3, None)];
        assert_eq!(contested_numbers(&[2, 3], &after), vec![2, 3]);
    }

    #[test]
    fn message_pluralizes() {
        assert_eq!(claim_message(1, "Ola"), "1 ticket registered to Ola!");
        assert_eq!(claim_message(2, "Kari"), "2 tickets registered to Kari!");
    }
}
