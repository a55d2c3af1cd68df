//! Ticket claiming: validation, all-or-nothing semantics and contention.

mod common;

use assert_matches::assert_matches;
use common::*;
use lottery_backend::AppError;

#[tokio::test]
async fn claim_marks_tickets_taken() {
    let lottery = setup(5).await;
    let round = lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();

    let claim = lottery.allocation.claim_tickets(&[1, 2], "Ola").await.unwrap();
    assert_eq!(claim.count, 2);
    assert_eq!(claim.numbers, vec![1, 2]);
    assert_eq!(claim.message, "2 tickets registered to Ola!");

    for number in [1, 2] {
        let t = ticket(&lottery.db, round.id, number).await;
        assert!(t.is_taken);
        assert_eq!(t.owner_name.as_deref(), Some("Ola"));
        assert!(t.claimed_at.is_some());
    }
    assert!(!ticket(&lottery.db, round.id, 3).await.is_taken);
    assert_invariants(&lottery.db).await;
}

#[tokio::test]
async fn overlapping_claim_is_all_or_nothing() {
    let lottery = setup(5).await;
    let round = lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();
    lottery.allocation.claim_tickets(&[1, 2], "Ola").await.unwrap();

    let err = lottery
        .allocation
        .claim_tickets(&[2, 3], "Kari")
        .await
        .unwrap_err();
    assert_matches!(err, AppError::AlreadyTaken(ref numbers) if numbers == &vec![2]);

    let three = ticket(&lottery.db, round.id, 3).await;
    assert!(!three.is_taken);
    assert!(three.owner_name.is_none());
    assert_eq!(
        ticket(&lottery.db, round.id, 2).await.owner_name.as_deref(),
        Some("Ola")
    );
    assert_invariants(&lottery.db).await;
}

#[tokio::test]
async fn locked_round_rejects_claims_until_reopened() {
    let lottery = setup(5).await;
    lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();
    lottery.rounds.toggle_lock().await.unwrap();

    assert_matches!(
        lottery.allocation.claim_tickets(&[1], "Ola").await,
        Err(AppError::RoundLocked)
    );

    lottery.rounds.toggle_lock().await.unwrap();
    assert!(lottery.allocation.claim_tickets(&[1], "Ola").await.is_ok());
}

#[tokio::test]
async fn claim_without_active_round_fails() {
    let lottery = setup(5).await;
    assert_matches!(
        lottery.allocation.claim_tickets(&[1], "Ola").await,
        Err(AppError::NoActiveRound)
    );
}

#[tokio::test]
async fn out_of_range_numbers_are_validation_errors() {
    let lottery = setup(5).await;
    let round = lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();

    assert_matches!(
        lottery.allocation.claim_tickets(&[5, 6], "Ola").await,
        Err(AppError::ValidationError(_))
    );
    assert!(!ticket(&lottery.db, round.id, 5).await.is_taken);
}

#[tokio::test]
async fn bad_input_never_reaches_the_store() {
    let lottery = setup(5).await;
    // no round exists: shape errors win over round errors
    assert_matches!(
        lottery.allocation.claim_tickets(&[], "Ola").await,
        Err(AppError::ValidationError(_))
    );
    assert_matches!(
        lottery.allocation.claim_tickets(&[1], "O").await,
        Err(AppError::ValidationError(_))
    );
}

#[tokio::test]
async fn duplicate_numbers_claim_once() {
    let lottery = setup(5).await;
    lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();

    let claim = lottery
        .allocation
        .claim_tickets(&[4, 4, 4], "Ola")
        .await
        .unwrap();
    assert_eq!(claim.count, 1);
    assert_eq!(claim.message, "1 ticket registered to Ola!");
}

#[tokio::test]
async fn claims_resolve_against_the_new_round_after_restart() {
    let lottery = setup(5).await;
    let first = lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();
    lottery.allocation.claim_tickets(&[1], "Ola").await.unwrap();

    let second = lottery.rounds.start_new_round(Some("Round 2")).await.unwrap();
    let claim = lottery.allocation.claim_tickets(&[1], "Kari").await.unwrap();
    assert_eq!(claim.round_id, second.id);

    // archived round is untouched
    assert_eq!(
        ticket(&lottery.db, first.id, 1).await.owner_name.as_deref(),
        Some("Ola")
    );
    assert_eq!(
        ticket(&lottery.db, second.id, 1).await.owner_name.as_deref(),
        Some("Kari")
    );
}

#[tokio::test]
async fn past_winner_may_still_claim() {
    let lottery = setup(5).await;
    lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();
    lottery.allocation.claim_tickets(&[1], "Ola").await.unwrap();
    lottery.draw.draw_winner().await.unwrap();

    assert!(lottery.allocation.claim_tickets(&[2], "Ola").await.is_ok());
}

// The one-connection SQLite pool queues these transactions; interleaved
// contention against real row locks runs in tests/postgres_contention.rs.
#[tokio::test]
async fn queued_overlapping_claims_have_one_winner_per_number() {
    let lottery = setup(10).await;
    let round = lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();

    let a = lottery.allocation.clone();
    let b = lottery.allocation.clone();
    let (first, second) = tokio::join!(
        a.claim_tickets(&[1, 2, 3], "Ola"),
        b.claim_tickets(&[3, 4], "Kari"),
    );

    let successes = [first.is_ok(), second.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(successes, 1, "exactly one claimant gets ticket 3");

    let loser = if first.is_ok() { second } else { first };
    assert_matches!(loser, Err(AppError::AlreadyTaken(ref numbers)) if numbers.contains(&3));

    let taken: Vec<_> = round_tickets(&lottery.db, round.id)
        .await
        .into_iter()
        .filter(|t| t.is_taken)
        .collect();
    let owners: std::collections::HashSet<_> =
        taken.iter().filter_map(|t| t.owner_name.clone()).collect();
    assert_eq!(owners.len(), 1, "the losing claim wrote nothing");
    assert!(taken.len() == 3 || taken.len() == 2);
    assert_invariants(&lottery.db).await;
}

#[tokio::test]
async fn many_queued_claims_never_double_book() {
    let lottery = setup(6).await;
    let round = lottery.rounds.start_new_round(Some("Round 1")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..6 {
        let allocation = lottery.allocation.clone();
        let numbers = vec![(i % 6) + 1, ((i + 1) % 6) + 1];
        handles.push(tokio::spawn(async move {
            allocation
                .claim_tickets(&numbers, &format!("Player {i}"))
                .await
                .map(|c| c.count)
        }));
    }

    let mut claimed = 0;
    for handle in handles {
        if let Ok(count) = handle.await.unwrap() {
            claimed += count;
        }
    }

    let taken = round_tickets(&lottery.db, round.id)
        .await
        .into_iter()
        .filter(|t| t.is_taken)
        .count() as u64;
    assert_eq!(claimed, taken);
    assert!(taken <= 6);
    assert_invariants(&lottery.db).await;
}
