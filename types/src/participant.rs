use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::ParticipantId;

/// A seated player or a storyteller.
///
/// Equality is by [`ParticipantId`] only. Two records with the same id but a
/// different alias or status describe the same participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub alias: String,
    #[serde(default = "default_true")]
    pub can_vote: bool,
    #[serde(default)]
    pub dead: bool,
    /// Dead participant granted special voting rights (double weight).
    #[serde(default)]
    pub banshee: bool,
}

const fn default_true() -> bool {
    true
}

impl Participant {
    #[must_use]
    pub fn new(id: ParticipantId, alias: impl Into<String>) -> Self {
        Self {
            id,
            alias: alias.into(),
            can_vote: true,
            dead: false,
            banshee: false,
        }
    }

    #[must_use]
    pub fn is(&self, id: ParticipantId) -> bool {
        self.id == id
    }
}

impl PartialEq for Participant {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Participant {}

impl Hash for Participant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
