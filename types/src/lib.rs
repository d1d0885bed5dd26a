//! Roster model for the town square.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod ids;
mod mention;
mod nomination;
mod participant;
mod proofs;
mod town_square;
mod vote;

pub use ids::{GameId, GameIdError, MessageRef, ParticipantId};
pub use mention::{is_mention, mention, parse_mention};
pub use nomination::{Nomination, PLACEHOLDER_TEXT};
pub use participant::Participant;
pub use proofs::{
    ACCUSATION_LIMIT, ALIAS_LIMIT, Alias, BoundedText, DEFENSE_LIMIT, TextError, TextLimit,
    VOTE_TEXT_LIMIT,
};
pub use town_square::TownSquare;
pub use vote::{
    CONFIRMED_NO_SENTINEL, CONFIRMED_YES_SENTINEL, NOT_VOTED_SENTINEL, Vote, VoteModifier,
    VoteState, is_reserved_vote_text,
};
