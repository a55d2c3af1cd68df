//! Draw eligibility for a single round.
//!
//! A ticket is an eligible candidate when it is taken, has an owner, and that
//! owner has no winning ticket in the same round yet. The draw and the operator
//! snapshot both go through [`partition`] so they can never disagree.

use std::collections::HashSet;

use crate::entities::ticket_entity as tickets;
use crate::error::NoCandidatesReason;

/// A drawable ticket together with its owner
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub ticket: &'a tickets::Model,
    pub owner: &'a str,
}

#[derive(Debug, Default)]
pub struct PotPartition<'a> {
    /// Every taken ticket of the round
    pub taken: Vec<&'a tickets::Model>,
    /// Taken tickets whose owner has not won this round
    pub eligible: Vec<Candidate<'a>>,
}

/// Split one round's tickets into taken and eligible
pub fn partition(round_tickets: &[tickets::Model]) -> PotPartition<'_> {
    let winners: HashSet<&str> = round_tickets
        .iter()
        .filter(|t| t.has_won)
        .filter_map(|t| t.owner_name.as_deref())
        .collect();

    let mut pot = PotPartition::default();
    for ticket in round_tickets.iter().filter(|t| t.is_taken) {
        pot.taken.push(ticket);
        if let Some(owner) = ticket.owner_name.as_deref()
            && !winners.contains(owner)
        {
            pot.eligible.push(Candidate { ticket, owner });
        }
    }
    pot
}

/// Eligible candidates, or the reason there are none
pub fn eligible_candidates(
    round_tickets: &[tickets::Model],
) -> Result<Vec<Candidate<'_>>, NoCandidatesReason> {
    let pot = partition(round_tickets);
    if pot.taken.iter().all(|t| t.owner_name.is_none()) {
        return Err(NoCandidatesReason::EmptyPot);
    }
    if pot.eligible.is_empty() {
        return Err(NoCandidatesReason::NoUniqueWinnersLeft);
    }
    Ok(pot.eligible)
}
