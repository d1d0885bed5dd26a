//! Game events produced by accepted operations.
//!
//! Events are the storyteller-facing audit trail. They carry aliases as they
//! were at the time of the event, not ids, because later alias changes should
//! not rewrite history.

use std::fmt;

use crate::error::LockFailure;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    TownSquareCreated { players: Vec<String> },
    TownSquareUpdated { by: String, players: Vec<String> },
    Substituted { by: String, old: String, new: String },
    Nominated { nominator: String, nominee: String },
    AccusationSet { by: String, nominee: String, text: String },
    DefenseSet { by: String, nominee: String, text: String },
    VoteCast {
        by: String,
        voter: String,
        nominee: String,
        text: String,
    },
    VoteLocked { voter: String, nominee: String, yes: bool },
    NominationFinished { nominee: String },
    NominationClosed { by: String, nominee: String },
    VoteModifierToggled {
        by: String,
        voter: String,
        modifier: &'static str,
        enabled: bool,
    },
    ThresholdSet { by: String, threshold: u32 },
    OrganGrinderToggled { enabled: bool },
    PlayerNominationsToggled { enabled: bool },
    AutoLockToggled { enabled: bool },
    MarkedDead { by: String, player: String, dead: bool },
    CanVoteToggled { by: String, player: String, can_vote: bool },
    BansheeToggled { by: String, player: String, banshee: bool },
    AliasSet { old: String, new: String },
    GameEnded { by: String },
}

fn enabled(flag: bool) -> &'static str {
    if flag { "enabled" } else { "disabled" }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TownSquareCreated { players } => {
                write!(f, "Town square created: {}", players.join(", "))
            }
            Self::TownSquareUpdated { by, players } => {
                write!(f, "{by} has updated the town square: {}", players.join(", "))
            }
            Self::Substituted { by, old, new } => {
                write!(f, "{by} has substituted {old} with {new}")
            }
            Self::Nominated { nominator, nominee } => {
                write!(f, "{nominator} has nominated {nominee}")
            }
            Self::AccusationSet { by, nominee, text } => write!(
                f,
                "{by} has added this accusation to the nomination of {nominee}: {text}"
            ),
            Self::DefenseSet { by, nominee, text } => write!(
                f,
                "{by} has added this defense to the nomination of {nominee}: {text}"
            ),
            Self::VoteCast {
                by,
                voter,
                nominee,
                text,
            } => {
                if by == voter {
                    write!(
                        f,
                        "{voter} has set their vote on the nomination of {nominee} to {text}"
                    )
                } else {
                    write!(
                        f,
                        "{by} has set {voter}'s vote on the nomination of {nominee} to {text}"
                    )
                }
            }
            Self::VoteLocked { voter, nominee, yes } => write!(
                f,
                "The vote of {voter} has been locked as {} on the nomination of {nominee}",
                if *yes { "yes" } else { "no" }
            ),
            Self::NominationFinished { nominee } => {
                write!(f, "All votes on the nomination of {nominee} are locked")
            }
            Self::NominationClosed { by, nominee } => {
                write!(f, "{by} has closed the nomination of {nominee}")
            }
            Self::VoteModifierToggled {
                by,
                voter,
                modifier,
                enabled: on,
            } => write!(f, "{by} has {} {modifier} on {voter}'s vote", enabled(*on)),
            Self::ThresholdSet { by, threshold } => {
                write!(f, "{by} has set the vote threshold to {threshold}")
            }
            Self::OrganGrinderToggled { enabled: on } => {
                write!(f, "Organ Grinder is now {}", enabled(*on))
            }
            Self::PlayerNominationsToggled { enabled: on } => {
                write!(f, "Player nominations are now {}", enabled(*on))
            }
            Self::AutoLockToggled { enabled: on } => {
                write!(f, "Automatic vote locking is now {}", enabled(*on))
            }
            Self::MarkedDead { by, player, dead } => write!(
                f,
                "{by} has marked {player} as {}",
                if *dead { "dead" } else { "living" }
            ),
            Self::CanVoteToggled {
                by,
                player,
                can_vote,
            } => write!(
                f,
                "{by} has set {player} as {}",
                if *can_vote {
                    "able to vote"
                } else {
                    "unable to vote"
                }
            ),
            Self::BansheeToggled {
                by,
                player,
                banshee,
            } => write!(
                f,
                "{by} has {} banshee voting rights for {player}",
                if *banshee { "granted" } else { "revoked" }
            ),
            Self::AliasSet { old, new } => write!(f, "{old} has set their alias to {new}"),
            Self::GameEnded { by } => write!(f, "{by} has ended the game"),
        }
    }
}

/// Result of an accepted operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
    pub events: Vec<GameEvent>,
    /// Informational clockhand guidance, never a failure of the operation.
    pub notice: Option<LockFailure>,
}

impl Applied {
    #[must_use]
    pub fn event(event: GameEvent) -> Self {
        Self {
            events: vec![event],
            notice: None,
        }
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
