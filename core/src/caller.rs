//! Caller identity as vouched for by the host.

use townsquare_types::ParticipantId;

/// Highest role the host recognizes for a caller.
///
/// The owner and moderators carry storyteller privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Owner,
    Moderator,
    Storyteller,
    Player,
    Spectator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: ParticipantId,
    pub role: Role,
}

impl Caller {
    #[must_use]
    pub const fn new(id: ParticipantId, role: Role) -> Self {
        Self { id, role }
    }

    #[must_use]
    pub const fn storyteller(id: ParticipantId) -> Self {
        Self::new(id, Role::Storyteller)
    }

    #[must_use]
    pub const fn player(id: ParticipantId) -> Self {
        Self::new(id, Role::Player)
    }

    #[must_use]
    pub fn is_storyteller(&self) -> bool {
        matches!(self.role, Role::Owner | Role::Moderator | Role::Storyteller)
    }

    #[must_use]
    pub fn is_player(&self) -> bool {
        self.role == Role::Player
    }

    /// Storytellers and players both take part in the game.
    #[must_use]
    pub fn participates(&self) -> bool {
        self.is_storyteller() || self.is_player()
    }
}
