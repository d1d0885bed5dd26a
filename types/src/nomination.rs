use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{MessageRef, Participant, ParticipantId, Vote};

/// Placeholder shown until the nominator or nominee supplies text.
pub const PLACEHOLDER_TEXT: &str = "TBD";

fn placeholder() -> String {
    PLACEHOLDER_TEXT.to_string()
}

/// One formal accusation, open for accusation, defense and voting until
/// `finished` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nomination {
    pub nominator: Participant,
    pub nominee: Participant,
    /// One entry per seated player at creation time; kept in step with the
    /// roster by update and substitute operations.
    pub votes: BTreeMap<ParticipantId, Vote>,
    #[serde(default = "placeholder")]
    pub accusation: String,
    #[serde(default = "placeholder")]
    pub defense: String,
    /// Clockhand cursor into the seating order rooted at the nominee.
    #[serde(default)]
    pub player_index: usize,
    #[serde(default)]
    pub message: Option<MessageRef>,
    #[serde(default)]
    pub finished: bool,
}

impl Nomination {
    /// Open a nomination with a fresh "not voted" entry for every seated player.
    #[must_use]
    pub fn new(nominator: Participant, nominee: Participant, seated: &[Participant]) -> Self {
        let votes = seated
            .iter()
            .map(|player| (player.id, Vote::not_voted()))
            .collect();
        Self {
            nominator,
            nominee,
            votes,
            accusation: placeholder(),
            defense: placeholder(),
            player_index: 0,
            message: None,
            finished: false,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.finished
    }

    #[must_use]
    pub fn vote_of(&self, id: ParticipantId) -> Option<&Vote> {
        self.votes.get(&id)
    }
}
