//! Render-ready description of a nomination.
//!
//! The view decides *what* the vote state is for a given audience; turning it
//! into chat markup or terminal text is the host's business.

use townsquare_types::{Nomination, ParticipantId, TownSquare, VoteState};

use crate::clockhand::{clockhand_participant, seating_order};

/// Who is going to look at the rendered nomination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Everyone in the game channel.
    Public,
    /// Storytellers see through the Organ Grinder.
    Storytellers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteCell {
    /// Participant has no vote to cast and did not lock a yes.
    Struck,
    /// Content hidden by the Organ Grinder.
    Hidden,
    ConfirmedYes { running_total: i64 },
    ConfirmedNo,
    Pending(String),
    NotVoted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRow {
    pub id: ParticipantId,
    pub alias: String,
    pub is_nominator: bool,
    pub dead: bool,
    /// First seat in order that can still vote and is not locked.
    pub current_voter: bool,
    pub cell: VoteCell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NominationView {
    pub nominator: String,
    pub nominee: String,
    pub accusation: String,
    pub defense: String,
    pub votes_needed: u32,
    /// Weighted total of locked yes votes; `None` while hidden.
    pub tally: Option<i64>,
    pub clockhand: Option<ParticipantId>,
    pub finished: bool,
    pub rows: Vec<VoteRow>,
}

impl NominationView {
    #[must_use]
    pub fn build(town_square: &TownSquare, nomination: &Nomination, audience: Audience) -> Self {
        let hidden = town_square.organ_grinder && audience == Audience::Public;
        let order = seating_order(nomination, &town_square.players);
        let vote_state = |id| {
            nomination
                .vote_of(id)
                .map(|v| v.state.clone())
                .unwrap_or_default()
        };
        let current_voter = order
            .iter()
            .find(|p| p.can_vote && !vote_state(p.id).is_confirmed())
            .map(|p| p.id);

        let mut running_total = 0;
        let mut rows = Vec::with_capacity(order.len());
        for player in &order {
            let vote = nomination.vote_of(player.id).cloned().unwrap_or_default();
            let confirmed_yes = vote.state == VoteState::ConfirmedYes;
            running_total += vote.weight();

            let cell = if !player.can_vote && !confirmed_yes {
                VoteCell::Struck
            } else if hidden {
                VoteCell::Hidden
            } else {
                match vote.state {
                    VoteState::ConfirmedYes => VoteCell::ConfirmedYes { running_total },
                    VoteState::ConfirmedNo => VoteCell::ConfirmedNo,
                    VoteState::Pending(text) => VoteCell::Pending(text),
                    VoteState::NotVoted => VoteCell::NotVoted,
                }
            };

            rows.push(VoteRow {
                id: player.id,
                alias: player.alias.clone(),
                is_nominator: **player == nomination.nominator,
                dead: player.dead,
                current_voter: current_voter == Some(player.id),
                cell,
            });
        }

        Self {
            nominator: nomination.nominator.alias.clone(),
            nominee: nomination.nominee.alias.clone(),
            accusation: nomination.accusation.clone(),
            defense: nomination.defense.clone(),
            votes_needed: town_square.votes_needed(),
            tally: (!hidden).then_some(running_total),
            clockhand: clockhand_participant(nomination, &town_square.players).map(|p| p.id),
            finished: nomination.finished,
            rows,
        }
    }

    /// Whether the weighted tally reaches the threshold.
    #[must_use]
    pub fn on_the_block(&self) -> Option<bool> {
        self.tally.map(|t| t >= i64::from(self.votes_needed))
    }
}
