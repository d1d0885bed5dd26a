use serde::{Deserialize, Serialize};

use crate::{Nomination, Participant, ParticipantId};

/// Players, storytellers and the single current nomination of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownSquare {
    /// Seating order. Order-significant, no duplicate ids.
    pub players: Vec<Participant>,
    pub sts: Vec<Participant>,
    #[serde(default)]
    pub current_nomination: Option<Nomination>,
    /// Hide vote content from non-storytellers while a nomination is open.
    #[serde(default)]
    pub organ_grinder: bool,
    #[serde(default = "default_true")]
    pub player_noms_allowed: bool,
    /// Zero means "ceiling of half the living players".
    #[serde(default)]
    pub vote_threshold: u32,
    #[serde(default)]
    pub auto_lock_votes: bool,
}

const fn default_true() -> bool {
    true
}

impl TownSquare {
    #[must_use]
    pub fn new(players: Vec<Participant>, sts: Vec<Participant>) -> Self {
        Self {
            players,
            sts,
            current_nomination: None,
            organ_grinder: false,
            player_noms_allowed: true,
            vote_threshold: 0,
            auto_lock_votes: false,
        }
    }

    /// Players first (in seating order), then storytellers. A storyteller who
    /// is also seated appears once.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.players.iter().chain(
            self.sts
                .iter()
                .filter(|st| !self.players.iter().any(|p| p.id == st.id)),
        )
    }

    #[must_use]
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants().find(|p| p.id == id)
    }

    #[must_use]
    pub fn player(&self, id: ParticipantId) -> Option<&Participant> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn st_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.sts.iter_mut().find(|p| p.id == id)
    }

    #[must_use]
    pub fn seat_of(&self, id: ParticipantId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    #[must_use]
    pub fn is_seated(&self, id: ParticipantId) -> bool {
        self.seat_of(id).is_some()
    }

    #[must_use]
    pub fn living_players(&self) -> usize {
        self.players.iter().filter(|p| !p.dead).count()
    }

    /// Votes required to put the nominee on the block.
    #[must_use]
    pub fn votes_needed(&self) -> u32 {
        if self.vote_threshold == 0 {
            let living = u32::try_from(self.living_players()).unwrap_or(u32::MAX);
            living.div_ceil(2)
        } else {
            self.vote_threshold
        }
    }

    /// The current nomination if it has not finished.
    #[must_use]
    pub fn open_nomination(&self) -> Option<&Nomination> {
        self.current_nomination.as_ref().filter(|nom| nom.is_open())
    }

    pub fn open_nomination_mut(&mut self) -> Option<&mut Nomination> {
        self.current_nomination
            .as_mut()
            .filter(|nom| nom.is_open())
    }
}
