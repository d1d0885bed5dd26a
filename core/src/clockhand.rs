//! Clockhand lock procedure.
//!
//! Votes are locked one seat at a time in seating order, starting with the
//! seat after the nominee and wrapping around. If the nominee is not seated
//! (for example a storyteller), the order is rooted at the nominator instead,
//! and if neither is seated it starts at the top of the seating order.

use townsquare_types::{
    NOT_VOTED_SENTINEL, Nomination, Participant, ParticipantId, TownSquare, Vote, VoteState,
};

use crate::error::{EngineError, IllegalState, LockFailure};

/// Seating order as seen by the clockhand for `nomination`.
#[must_use]
pub fn seating_order<'a>(nomination: &Nomination, players: &'a [Participant]) -> Vec<&'a Participant> {
    if players.is_empty() {
        return Vec::new();
    }
    let anchor = players
        .iter()
        .position(|p| *p == nomination.nominee)
        .or_else(|| players.iter().position(|p| *p == nomination.nominator))
        .unwrap_or(players.len() - 1);
    let (head, tail) = players.split_at(anchor + 1);
    tail.iter().chain(head.iter()).collect()
}

/// Participant currently under the clockhand, if the nomination is still
/// locking votes.
#[must_use]
pub fn clockhand_participant<'a>(
    nomination: &Nomination,
    players: &'a [Participant],
) -> Option<&'a Participant> {
    if nomination.finished {
        return None;
    }
    seating_order(nomination, players)
        .get(nomination.player_index)
        .copied()
}

/// Move the cursor past seats whose vote is already confirmed, and finish the
/// nomination once the cursor reaches the seat count.
///
/// Only a reseat can put a confirmed vote ahead of the cursor.
pub(crate) fn settle_cursor(nomination: &mut Nomination, players: &[Participant]) {
    let order = seating_order(nomination, players);
    while let Some(seat) = order.get(nomination.player_index)
        && nomination.vote_of(seat.id).is_some_and(Vote::is_confirmed)
    {
        nomination.player_index += 1;
    }
    if nomination.player_index >= order.len() {
        nomination.player_index = order.len();
        nomination.finished = true;
    }
}

/// One successful lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locked {
    pub voter: ParticipantId,
    pub alias: String,
    pub yes: bool,
    /// The lock moved the cursor past the last seat.
    pub finished: bool,
}

fn interpret(text: &str) -> Option<bool> {
    match text {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

/// Lock the vote at the cursor, or the `override_text` in its place.
///
/// Either the vote is confirmed and the cursor advances past it and any
/// already-locked seats behind it, or nothing changes.
pub fn lock_next(
    town_square: &mut TownSquare,
    override_text: Option<&str>,
) -> Result<Locked, EngineError> {
    let nomination = town_square
        .open_nomination()
        .ok_or(IllegalState::NoOpenNomination)?;
    let order = seating_order(nomination, &town_square.players);
    let (voter, alias) = order
        .get(nomination.player_index)
        .map(|p| (p.id, p.alias.clone()))
        .ok_or(IllegalState::NoSeatAtClockhand)?;

    let current = nomination
        .vote_of(voter)
        .map(|vote| vote.state.clone())
        .unwrap_or_default();
    if current.is_confirmed() {
        return Err(IllegalState::VoteLocked { alias }.into());
    }

    let text = match (override_text, &current) {
        (Some(text), _) => text.trim().to_lowercase(),
        (None, VoteState::Pending(text)) => text.trim().to_lowercase(),
        (None, _) => NOT_VOTED_SENTINEL.to_string(),
    };
    if text == NOT_VOTED_SENTINEL {
        return Err(LockFailure::NotVoted { voter, alias }.into());
    }
    let Some(yes) = interpret(&text) else {
        return Err(LockFailure::UnrecognizedVote { voter, alias, text }.into());
    };

    let players = &town_square.players;
    let nomination = town_square
        .current_nomination
        .as_mut()
        .filter(|nom| nom.is_open())
        .ok_or(IllegalState::NoOpenNomination)?;
    let entry = nomination.votes.entry(voter).or_default();
    entry.state = if yes {
        VoteState::ConfirmedYes
    } else {
        VoteState::ConfirmedNo
    };
    nomination.player_index += 1;
    settle_cursor(nomination, players);
    tracing::debug!(%voter, yes, cursor = nomination.player_index, "Locked vote");

    Ok(Locked {
        voter,
        alias,
        yes,
        finished: nomination.finished,
    })
}

/// Outcome of advancing the clockhand without operator help.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Advance {
    pub locked: Vec<Locked>,
    /// Why the clockhand stopped before the last seat, if it did.
    pub stalled: Option<LockFailure>,
}

/// Lock every consecutive seat that already holds a recognizable vote.
///
/// Stops at the first seat that has not voted or voted something other than
/// yes/no, or when the cursor runs out of seats. Each iteration either
/// advances the cursor or stops, so the loop is bounded by the seat count.
pub fn advance(town_square: &mut TownSquare) -> Advance {
    let mut outcome = Advance::default();
    for _ in 0..town_square.players.len() {
        if town_square.open_nomination().is_none() {
            break;
        }
        match lock_next(town_square, None) {
            Ok(locked) => outcome.locked.push(locked),
            Err(EngineError::Clockhand(failure)) => {
                outcome.stalled = Some(failure);
                break;
            }
            Err(err) => {
                tracing::debug!("Clockhand stopped: {err}");
                break;
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::{advance, clockhand_participant, lock_next, seating_order};
    use crate::error::{EngineError, IllegalState, LockFailure};
    use townsquare_types::{Nomination, Participant, ParticipantId, TownSquare, Vote, VoteState};

    fn pid(id: u64) -> ParticipantId {
        ParticipantId::new(id)
    }

    fn abc() -> TownSquare {
        TownSquare::new(
            vec![
                Participant::new(pid(1), "Alice"),
                Participant::new(pid(2), "Bob"),
                Participant::new(pid(3), "Carol"),
            ],
            vec![Participant::new(pid(9), "Sam")],
        )
    }

    fn nominate(ts: &mut TownSquare, nominator: u64, nominee: u64) {
        let find = |id| ts.participant(pid(id)).cloned().expect("participant");
        let nom = Nomination::new(find(nominator), find(nominee), &ts.players);
        ts.current_nomination = Some(nom);
    }

    fn set_vote(ts: &mut TownSquare, id: u64, text: &str) {
        let nom = ts.current_nomination.as_mut().expect("nomination");
        nom.votes.insert(pid(id), Vote::pending(text));
    }

    fn order_ids(ts: &TownSquare) -> Vec<u64> {
        let nom = ts.current_nomination.as_ref().expect("nomination");
        seating_order(nom, &ts.players)
            .iter()
            .map(|p| p.id.value())
            .collect()
    }

    #[test]
    fn order_starts_after_the_nominee() {
        let mut ts = abc();
        nominate(&mut ts, 1, 3);
        assert_eq!(order_ids(&ts), vec![1, 2, 3]);
        nominate(&mut ts, 3, 1);
        assert_eq!(order_ids(&ts), vec![2, 3, 1]);
    }

    #[test]
    fn order_falls_back_to_nominator_then_end_of_list() {
        let mut ts = abc();
        nominate(&mut ts, 2, 9);
        assert_eq!(order_ids(&ts), vec![3, 1, 2]);
        nominate(&mut ts, 9, 9);
        assert_eq!(order_ids(&ts), vec![1, 2, 3]);
    }

    #[test]
    fn unvoted_seat_fails_without_moving_the_cursor() {
        let mut ts = abc();
        nominate(&mut ts, 1, 3);
        let err = lock_next(&mut ts, None).expect_err("not voted");
        assert!(matches!(
            err,
            EngineError::Clockhand(LockFailure::NotVoted { .. })
        ));
        assert_eq!(ts.current_nomination.as_ref().map(|n| n.player_index), Some(0));
    }

    #[test]
    fn gibberish_is_unrecognized_but_override_wins() {
        let mut ts = abc();
        nominate(&mut ts, 1, 3);
        set_vote(&mut ts, 1, "only if Bob dies");
        let err = lock_next(&mut ts, None).expect_err("unrecognized");
        assert!(matches!(
            err,
            EngineError::Clockhand(LockFailure::UnrecognizedVote { .. })
        ));

        let locked = lock_next(&mut ts, Some("yes")).expect("override locks");
        assert!(locked.yes);
        let nom = ts.current_nomination.as_ref().expect("nomination");
        assert_eq!(nom.votes[&pid(1)].state, VoteState::ConfirmedYes);
        assert_eq!(nom.player_index, 1);
    }

    #[test]
    fn votes_are_case_folded() {
        let mut ts = abc();
        nominate(&mut ts, 1, 3);
        set_vote(&mut ts, 1, " Y ");
        set_vote(&mut ts, 2, "NO");
        assert!(lock_next(&mut ts, None).expect("lock alice").yes);
        assert!(!lock_next(&mut ts, None).expect("lock bob").yes);
    }

    #[test]
    fn exhausting_the_seats_finishes_the_nomination() {
        let mut ts = abc();
        nominate(&mut ts, 1, 3);
        for id in 1..=3 {
            set_vote(&mut ts, id, "n");
        }
        let outcome = advance(&mut ts);
        assert_eq!(outcome.locked.len(), 3);
        assert!(outcome.stalled.is_none());
        assert!(outcome.locked[2].finished);
        let nom = ts.current_nomination.as_ref().expect("nomination");
        assert!(nom.finished);
        assert_eq!(nom.player_index, 3);
        assert!(clockhand_participant(nom, &ts.players).is_none());
        assert!(matches!(
            lock_next(&mut ts, Some("yes")),
            Err(EngineError::IllegalState(IllegalState::NoOpenNomination))
        ));
    }

    #[test]
    fn advance_stops_at_first_gap() {
        let mut ts = abc();
        nominate(&mut ts, 1, 3);
        set_vote(&mut ts, 1, "no");
        set_vote(&mut ts, 3, "yes");
        let outcome = advance(&mut ts);
        assert_eq!(outcome.locked.len(), 1);
        assert_eq!(
            outcome.stalled.as_ref().map(LockFailure::voter),
            Some(pid(2))
        );
        let nom = ts.current_nomination.as_ref().expect("nomination");
        assert_eq!(
            clockhand_participant(nom, &ts.players).map(|p| p.id),
            Some(pid(2))
        );
        assert_eq!(nom.votes[&pid(3)], Vote::pending("yes"));
    }

    #[test]
    fn empty_roster_has_no_seat() {
        let mut ts = TownSquare::new(Vec::new(), vec![Participant::new(pid(9), "Sam")]);
        nominate(&mut ts, 9, 9);
        assert!(matches!(
            lock_next(&mut ts, Some("yes")),
            Err(EngineError::IllegalState(IllegalState::NoSeatAtClockhand))
        ));
        assert_eq!(advance(&mut ts), super::Advance::default());
    }
}
