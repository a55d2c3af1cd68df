//! Winner draws: eligibility, one win per owner per round, round scoping.

mod common;

use assert_matches::assert_matches;
use common::*;
use lottery_backend::AppError;
use lottery_backend::error::NoCandidatesReason;
use std::collections::HashSet;

#[tokio::test]
async fn draw_without_active_round_fails() {
    let lottery = setup(5).await;
    assert_matches!(
        lottery.draw.draw_winner().await,
        Err(AppError::NoActiveRound)
    );
}

#[tokio::test]
async fn draw_from_empty_pot_fails() {
    let lottery = setup(5).await;
    lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();
    assert_matches!(
        lottery.draw.draw_winner().await,
        Err(AppError::NoCandidates(NoCandidatesReason::EmptyPot))
    );
}

#[tokio::test]
async fn draw_records_a_claimed_ticket_as_winner() {
    let lottery = setup(5).await;
    let round = lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();
    lottery.allocation.claim_tickets(&[2, 4], "Ola").await.unwrap();

    let winner = lottery.draw.draw_winner().await.unwrap();
    assert_eq!(winner.round_id, round.id);
    assert_eq!(winner.owner_name, "Ola");
    assert!([2, 4].contains(&winner.number));

    let t = ticket(&lottery.db, round.id, winner.number).await;
    assert!(t.has_won);
    assert!(t.won_at.is_some());
    assert_invariants(&lottery.db).await;
}

#[tokio::test]
async fn sole_owner_who_already_won_leaves_no_unique_winners() {
    let lottery = setup(5).await;
    lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();
    lottery.allocation.claim_tickets(&[1, 2, 3], "Ola").await.unwrap();
    lottery.draw.draw_winner().await.unwrap();

    assert_matches!(
        lottery.draw.draw_winner().await,
        Err(AppError::NoCandidates(NoCandidatesReason::NoUniqueWinnersLeft))
    );
}

#[tokio::test]
async fn each_owner_wins_at_most_once_per_round() {
    let lottery = setup(10).await;
    lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();
    lottery.allocation.claim_tickets(&[1, 2, 3], "Ola").await.unwrap();
    lottery.allocation.claim_tickets(&[4], "Kari").await.unwrap();
    lottery.allocation.claim_tickets(&[5, 6], "Per").await.unwrap();

    let mut owners = HashSet::new();
    for _ in 0..3 {
        let winner = lottery.draw.draw_winner().await.unwrap();
        assert!(owners.insert(winner.owner_name), "owner won twice");
    }
    assert_eq!(owners.len(), 3);

    assert_matches!(
        lottery.draw.draw_winner().await,
        Err(AppError::NoCandidates(NoCandidatesReason::NoUniqueWinnersLeft))
    );
    assert_invariants(&lottery.db).await;
}

#[tokio::test]
async fn new_claims_reopen_the_pot() {
    let lottery = setup(5).await;
    lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();
    lottery.allocation.claim_tickets(&[1], "Ola").await.unwrap();
    lottery.draw.draw_winner().await.unwrap();
    assert!(lottery.draw.draw_winner().await.is_err());

    lottery.allocation.claim_tickets(&[2], "Kari").await.unwrap();
    let winner = lottery.draw.draw_winner().await.unwrap();
    assert_eq!(winner.owner_name, "Kari");
    assert_eq!(winner.number, 2);
}

#[tokio::test]
async fn draws_only_see_the_active_round() {
    let lottery = setup(5).await;
    lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();
    lottery.allocation.claim_tickets(&[1, 2], "Ola").await.unwrap();
    lottery.rounds.start_new_round(Some("Round 2")).await.unwrap();

    assert_matches!(
        lottery.draw.draw_winner().await,
        Err(AppError::NoCandidates(NoCandidatesReason::EmptyPot))
    );
}

#[tokio::test]
async fn previous_round_win_does_not_block_new_round() {
    let lottery = setup(5).await;
    lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();
    lottery.allocation.claim_tickets(&[1], "Ola").await.unwrap();
    lottery.draw.draw_winner().await.unwrap();

    lottery.rounds.start_new_round(Some("Round 2")).await.unwrap();
    lottery.allocation.claim_tickets(&[3], "Ola").await.unwrap();
    let winner = lottery.draw.draw_winner().await.unwrap();
    assert_eq!(winner.owner_name, "Ola");
}

#[tokio::test]
async fn locked_round_can_still_be_drawn() {
    let lottery = setup(5).await;
    lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();
    lottery.allocation.claim_tickets(&[1], "Ola").await.unwrap();
    lottery.rounds.toggle_lock().await.unwrap();

    assert!(lottery.draw.draw_winner().await.is_ok());
}

// The one-connection SQLite pool queues these transactions; interleaved
// contention against real row locks runs in tests/postgres_contention.rs.
#[tokio::test]
async fn queued_draws_never_repeat_an_owner() {
    let lottery = setup(10).await;
    lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();
    lottery.allocation.claim_tickets(&[1, 2, 3, 4], "Ola").await.unwrap();
    lottery.allocation.claim_tickets(&[5], "Kari").await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let draw = lottery.draw.clone();
        handles.push(tokio::spawn(async move { draw.draw_winner().await }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(winner) => winners.push(winner.owner_name),
            Err(e) => assert_matches!(
                e,
                AppError::NoCandidates(NoCandidatesReason::NoUniqueWinnersLeft)
            ),
        }
    }

    winners.sort();
    assert_eq!(winners, vec!["Kari".to_string(), "Ola".to_string()]);
    assert_invariants(&lottery.db).await;
}
